use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the four canonical fields every ledger record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetColumn {
    Date,
    Amount,
    Category,
    Description,
}

impl TargetColumn {
    /// Declared matching order. Earlier targets get first pick of the source columns.
    pub const ALL: [TargetColumn; 4] = [
        TargetColumn::Date,
        TargetColumn::Amount,
        TargetColumn::Category,
        TargetColumn::Description,
    ];

    pub fn canonical_name(self) -> &'static str {
        match self {
            TargetColumn::Date => "date",
            TargetColumn::Amount => "amount",
            TargetColumn::Category => "category",
            TargetColumn::Description => "description",
        }
    }
}

impl fmt::Display for TargetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TargetColumn::Date => "Date",
            TargetColumn::Amount => "Amount",
            TargetColumn::Category => "Category",
            TargetColumn::Description => "Description",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown target column: '{0}'")]
pub struct UnknownTargetColumn(pub String);

impl FromStr for TargetColumn {
    type Err = UnknownTargetColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(TargetColumn::Date),
            "amount" => Ok(TargetColumn::Amount),
            "category" => Ok(TargetColumn::Category),
            "description" => Ok(TargetColumn::Description),
            _ => Err(UnknownTargetColumn(s.to_string())),
        }
    }
}
