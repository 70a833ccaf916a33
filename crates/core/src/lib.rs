pub mod column;
pub mod config;
pub mod record;
pub mod table;

pub use column::{TargetColumn, UnknownTargetColumn};
pub use config::{ConfigError, MatcherConfig, TargetSpec, DEFAULT_THRESHOLD};
pub use record::{CanonicalRecord, DEFAULT_CATEGORY};
pub use table::{ProjectedRow, RawTable, RawValue, TableError, NA_TOKENS};
