use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::util::{preprocess, ratio};

/// String-similarity algorithm used to compare a header against a target name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Best alignment of the shorter string inside the longer one.
    Partial,
    /// Tokens sorted alphabetically before comparing.
    TokenSort,
    /// Shared tokens first, then each side's remainder.
    TokenSet,
}

impl Strategy {
    /// Tie-break order: an earlier strategy wins an equal score.
    pub const PRIORITY: [Strategy; 3] = [Strategy::Partial, Strategy::TokenSort, Strategy::TokenSet];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Partial => write!(f, "partial"),
            Strategy::TokenSort => write!(f, "token-sort"),
            Strategy::TokenSet => write!(f, "token-set"),
        }
    }
}

/// Scores `candidate` against `target` in [0, 100]. Both strings are
/// lowercased and stripped of punctuation first; an empty side scores 0.
pub fn score(candidate: &str, target: &str, strategy: Strategy) -> u8 {
    let a = preprocess(candidate);
    let b = preprocess(target);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let value = match strategy {
        Strategy::Partial => partial_ratio(&a, &b),
        Strategy::TokenSort => token_sort_ratio(&a, &b),
        Strategy::TokenSet => token_set_ratio(&a, &b),
    };
    tracing::trace!(candidate, target, %strategy, score = value, "scored");
    value
}

/// Highest score over all strategies, earlier strategies winning ties.
pub fn best_score(candidate: &str, target: &str) -> (Strategy, u8) {
    let mut best = (Strategy::Partial, 0u8);
    for (idx, strategy) in Strategy::PRIORITY.into_iter().enumerate() {
        let value = score(candidate, target, strategy);
        if idx == 0 || value > best.1 {
            best = (strategy, value);
        }
    }
    best
}

fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (shorter, longer, short_len) = if a_len <= b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };

    let longer: Vec<char> = longer.chars().collect();
    if short_len == longer.len() {
        return ratio(shorter, &longer.iter().collect::<String>());
    }

    let mut best = 0;
    for start in 0..=longer.len() - short_len {
        let window: String = longer[start..start + short_len].iter().collect();
        best = best.max(ratio(shorter, &window));
        if best == 100 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{sect} {only_a}").trim().to_string();
    let combined_b = format!("{sect} {only_b}").trim().to_string();

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}
