pub mod matcher;
pub mod projector;
pub mod reader;
pub mod scoring;
pub mod upload;
pub(crate) mod util;
pub mod validator;

pub use matcher::{match_columns, ColumnMapping, ColumnMatcher, MappedColumn, MatchError};
pub use projector::{project, ProjectError, ProjectedTable};
pub use reader::{read_table, CsvError};
pub use scoring::{best_score, score, Strategy};
pub use upload::{process_csv, process_upload, ProcessedUpload, UploadError, UploadedFile};
pub use validator::{validate, validate_batch, InvalidRecord};
