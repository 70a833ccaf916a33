use tally_core::{ProjectedRow, RawTable, TargetColumn};
use thiserror::Error;

use crate::matcher::ColumnMapping;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("Mapped column not present in table: {0}")]
    MissingMappedColumn(String),
}

/// A table restricted to mapped columns, renamed to their canonical names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedTable {
    pub columns: Vec<TargetColumn>,
    pub rows: Vec<ProjectedRow>,
}

/// Keeps only the mapped columns of `table`; row order and count are preserved.
pub fn project(table: &RawTable, mapping: &ColumnMapping) -> Result<ProjectedTable, ProjectError> {
    let selected = mapping
        .entries()
        .iter()
        .map(|entry| {
            table
                .column_index(&entry.source)
                .map(|idx| (idx, entry.target))
                .ok_or_else(|| ProjectError::MissingMappedColumn(entry.source.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = table
        .rows()
        .iter()
        .map(|cells| {
            let mut row = ProjectedRow::new();
            for &(idx, target) in &selected {
                row.insert(target, cells[idx].clone());
            }
            row
        })
        .collect();

    Ok(ProjectedTable {
        columns: selected.iter().map(|&(_, target)| target).collect(),
        rows,
    })
}
