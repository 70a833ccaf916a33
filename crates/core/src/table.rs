use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use thiserror::Error;

use super::column::TargetColumn;

/// Cell contents that spreadsheet exports treat as "no value".
pub const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// A single cell as it arrived from an upload or a manual-entry payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(Decimal),
}

impl RawValue {
    /// Interprets a CSV cell. Blank cells and NA tokens become `Empty`.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if NA_TOKENS.contains(&trimmed) {
            RawValue::Empty
        } else {
            RawValue::Text(cell.to_string())
        }
    }

    /// Interprets a loosely-typed JSON field from a manual-entry payload.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Empty,
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            serde_json::Value::Number(n) => {
                let s = n.to_string();
                Decimal::from_str(&s)
                    .or_else(|_| Decimal::from_scientific(&s))
                    .map(RawValue::Number)
                    .unwrap_or(RawValue::Text(s))
            }
            serde_json::Value::Bool(b) => RawValue::Text(b.to_string()),
            other => RawValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }

    /// Text form of the value, `None` when empty.
    pub fn render(&self) -> Option<String> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Number(d) => Some(d.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Uploaded data before any column reconciliation. Rows are stored positionally,
/// aligned with `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawValue>>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RowWidth {
                    row: idx,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(RawTable { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<RawValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&RawValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

/// A row after projection onto the canonical schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedRow {
    fields: BTreeMap<TargetColumn, RawValue>,
}

impl ProjectedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: TargetColumn, value: RawValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: TargetColumn, value: RawValue) {
        self.fields.insert(column, value);
    }

    pub fn get(&self, column: TargetColumn) -> Option<&RawValue> {
        self.fields.get(&column)
    }

    /// Builds a row from a manual-entry payload keyed by canonical names.
    /// Keys that are not canonical column names are ignored.
    pub fn from_fields(fields: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut row = ProjectedRow::new();
        for (key, value) in fields {
            if let Ok(column) = key.parse::<TargetColumn>() {
                row.insert(column, RawValue::from_json(value));
            }
        }
        row
    }
}
