pub mod error;
pub mod service;

pub use error::{AppError, ErrorBody, ErrorKind};
pub use service::LedgerService;
