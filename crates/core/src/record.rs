use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned when a record arrives without one.
pub const DEFAULT_CATEGORY: &str = "Personal";

/// A validated ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
}

impl CanonicalRecord {
    pub fn new(date: NaiveDate, description: &str, amount: Decimal, category: &str) -> Self {
        CanonicalRecord {
            date,
            description: description.to_string(),
            amount,
            category: category.to_string(),
        }
    }
}

impl fmt::Display for CanonicalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:>12}  {:<16}  {}",
            self.date, self.amount, self.category, self.description
        )
    }
}
