use serde::Serialize;
use tally_core::{MatcherConfig, TargetColumn, TargetSpec};
use thiserror::Error;

use crate::scoring::{score, Strategy};

/// One accepted source → target assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedColumn {
    pub source: String,
    pub target: TargetColumn,
    pub score: u8,
    pub strategy: Strategy,
}

/// Source column → canonical column assignments, in the order targets were matched.
/// A source column and a target each appear at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    entries: Vec<MappedColumn>,
}

impl ColumnMapping {
    /// Adds an assignment unless its source or target is already taken.
    pub fn insert(&mut self, entry: MappedColumn) -> bool {
        let taken = self
            .entries
            .iter()
            .any(|e| e.source == entry.source || e.target == entry.target);
        if taken {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[MappedColumn] {
        &self.entries
    }

    pub fn target_for(&self, source: &str) -> Option<TargetColumn> {
        self.entries.iter().find(|e| e.source == source).map(|e| e.target)
    }

    pub fn source_for(&self, target: TargetColumn) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.source.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Column mapping failed: no column matched {}", list_targets(.unmatched))]
    ColumnMappingFailed { unmatched: Vec<TargetColumn> },
}

fn list_targets(targets: &[TargetColumn]) -> String {
    targets
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    index: usize,
    score: u8,
    strategy: Strategy,
}

pub struct ColumnMatcher<'a> {
    config: &'a MatcherConfig,
}

impl<'a> ColumnMatcher<'a> {
    pub fn new(config: &'a MatcherConfig) -> Self {
        Self { config }
    }

    /// Assigns a source column to every configured target, in declared order.
    /// A column taken by an earlier target is not offered to later ones.
    pub fn match_columns(&self, columns: &[String]) -> Result<ColumnMapping, MatchError> {
        let mut remaining: Vec<&str> = columns.iter().map(String::as_str).collect();
        let mut mapping = ColumnMapping::default();
        let mut unmatched = Vec::new();

        for spec in &self.config.targets {
            match self.best_candidate(spec, &remaining) {
                Some(c) if c.score >= self.config.threshold => {
                    let source = remaining.remove(c.index);
                    tracing::info!(
                        source,
                        column = %spec.column,
                        score = c.score,
                        strategy = %c.strategy,
                        "matched column"
                    );
                    mapping.insert(MappedColumn {
                        source: source.to_string(),
                        target: spec.column,
                        score: c.score,
                        strategy: c.strategy,
                    });
                }
                best => {
                    tracing::warn!(
                        column = %spec.column,
                        best_source = best.map(|c| remaining[c.index]),
                        best_score = best.map(|c| c.score),
                        threshold = self.config.threshold,
                        "no source column cleared the threshold"
                    );
                    unmatched.push(spec.column);
                }
            }
        }

        if !unmatched.is_empty() {
            return Err(MatchError::ColumnMappingFailed { unmatched });
        }
        Ok(mapping)
    }

    /// Per strategy, the first column with the highest score; across strategies,
    /// the highest of those winners with `Strategy::PRIORITY` breaking ties.
    fn best_candidate(&self, spec: &TargetSpec, remaining: &[&str]) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for strategy in Strategy::PRIORITY {
            let mut winner: Option<(usize, u8)> = None;
            for (index, column) in remaining.iter().enumerate() {
                let value = name_score(spec, column, strategy);
                if winner.map_or(true, |(_, s)| value > s) {
                    winner = Some((index, value));
                }
            }

            if let Some((index, value)) = winner {
                if best.map_or(true, |b| value > b.score) {
                    best = Some(Candidate {
                        index,
                        score: value,
                        strategy,
                    });
                }
            }
        }

        best
    }
}

/// Best score of `column` against the target's canonical name and aliases.
/// Aliases are compared token-wise only: a short alias such as "cat" would
/// otherwise score 100 inside any header containing it ("Location").
fn name_score(spec: &TargetSpec, column: &str, strategy: Strategy) -> u8 {
    let canonical = score(column, spec.column.canonical_name(), strategy);
    if strategy == Strategy::Partial {
        return canonical;
    }
    spec.aliases
        .iter()
        .map(|alias| score(column, alias, strategy))
        .fold(canonical, u8::max)
}

pub fn match_columns(columns: &[String], config: &MatcherConfig) -> Result<ColumnMapping, MatchError> {
    ColumnMatcher::new(config).match_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn bare_config(threshold: u8) -> MatcherConfig {
        MatcherConfig {
            threshold,
            targets: TargetColumn::ALL
                .iter()
                .map(|c| TargetSpec::new(*c, &[]))
                .collect(),
        }
    }

    #[test]
    fn maps_abbreviated_headers_through_aliases() {
        let config = MatcherConfig::default();
        let mapping = match_columns(&headers(&["Trans Date", "Desc", "Amt", "Cat"]), &config).unwrap();
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.source_for(TargetColumn::Date), Some("Trans Date"));
        assert_eq!(mapping.source_for(TargetColumn::Amount), Some("Amt"));
        assert_eq!(mapping.source_for(TargetColumn::Category), Some("Cat"));
        assert_eq!(mapping.source_for(TargetColumn::Description), Some("Desc"));
        assert!(mapping.entries().iter().all(|e| e.score == 100));
    }

    #[test]
    fn entries_follow_target_order() {
        let config = MatcherConfig::default();
        let mapping = match_columns(
            &headers(&["Description", "Category", "Amount", "Date"]),
            &config,
        )
        .unwrap();
        let order: Vec<TargetColumn> = mapping.entries().iter().map(|e| e.target).collect();
        assert_eq!(order, TargetColumn::ALL.to_vec());
    }

    #[test]
    fn alias_equal_header_scores_100() {
        let config = MatcherConfig::default();
        let matcher = ColumnMatcher::new(&config);
        for spec in &config.targets {
            for alias in &spec.aliases {
                let header = alias.to_uppercase();
                let best = matcher.best_candidate(spec, &[header.as_str()]).unwrap();
                assert_eq!(best.score, 100, "alias {alias} for {}", spec.column);
            }
        }
    }

    #[test]
    fn short_alias_does_not_match_inside_longer_header() {
        let config = MatcherConfig::default();
        let mapping = match_columns(
            &headers(&["Date", "Location", "Description", "Amount", "Category"]),
            &config,
        )
        .unwrap();
        assert_eq!(mapping.source_for(TargetColumn::Category), Some("Category"));
        assert_eq!(mapping.target_for("Location"), None);

        let category = &config.targets[2];
        assert_eq!(category.column, TargetColumn::Category);
        for header in ["Location", "Allocation", "Vacation"] {
            assert!(name_score(category, header, Strategy::Partial) < 75, "{header}");
            assert!(
                ColumnMatcher::new(&config)
                    .best_candidate(category, &[header])
                    .unwrap()
                    .score
                    < 75,
                "{header}"
            );
        }
    }

    #[test]
    fn missing_amount_fails_whole_mapping() {
        let config = MatcherConfig::default();
        let result = match_columns(&headers(&["Date", "Description", "Category"]), &config);
        assert_eq!(
            result,
            Err(MatchError::ColumnMappingFailed {
                unmatched: vec![TargetColumn::Amount]
            })
        );
    }

    #[test]
    fn error_message_lists_unmatched_targets() {
        let err = MatchError::ColumnMappingFailed {
            unmatched: vec![TargetColumn::Amount, TargetColumn::Category],
        };
        assert_eq!(
            err.to_string(),
            "Column mapping failed: no column matched Amount, Category"
        );
    }

    #[test]
    fn source_column_is_consumed_once() {
        let config = MatcherConfig::default();
        let mapping = match_columns(
            &headers(&["Date", "Posted Date", "Amount", "Category", "Description"]),
            &config,
        )
        .unwrap();
        assert_eq!(mapping.source_for(TargetColumn::Date), Some("Date"));
        assert_eq!(mapping.target_for("Posted Date"), None);

        let mut sources: Vec<&str> = mapping.entries().iter().map(|e| e.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();
        assert_eq!(sources.len(), mapping.len());
    }

    #[test]
    fn ties_go_to_first_column() {
        let config = MatcherConfig::default();
        let mapping = match_columns(
            &headers(&["Amount", "amount ", "Date", "Category", "Description"]),
            &config,
        )
        .unwrap();
        assert_eq!(mapping.source_for(TargetColumn::Amount), Some("Amount"));
    }

    #[test]
    fn threshold_is_inclusive() {
        // "Amt" against the bare name "amount" scores 67.
        let columns = headers(&["Date", "Amt", "Category", "Description"]);

        let accepted = match_columns(&columns, &bare_config(67)).unwrap();
        assert_eq!(accepted.source_for(TargetColumn::Amount), Some("Amt"));
        assert_eq!(accepted.entries()[1].score, 67);

        let rejected = match_columns(&columns, &bare_config(68));
        assert_eq!(
            rejected,
            Err(MatchError::ColumnMappingFailed {
                unmatched: vec![TargetColumn::Amount]
            })
        );
    }

    #[test]
    fn empty_header_fails_every_target() {
        let result = match_columns(&[], &MatcherConfig::default());
        assert_eq!(
            result,
            Err(MatchError::ColumnMappingFailed {
                unmatched: TargetColumn::ALL.to_vec()
            })
        );
    }

    #[test]
    fn insert_refuses_reused_source_or_target() {
        let mut mapping = ColumnMapping::default();
        let entry = |source: &str, target| MappedColumn {
            source: source.to_string(),
            target,
            score: 100,
            strategy: Strategy::Partial,
        };
        assert!(mapping.insert(entry("Date", TargetColumn::Date)));
        assert!(!mapping.insert(entry("Date", TargetColumn::Amount)));
        assert!(!mapping.insert(entry("Posted", TargetColumn::Date)));
        assert_eq!(mapping.len(), 1);
    }
}
