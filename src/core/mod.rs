pub mod engine;
pub mod extract;

pub use crate::domain::model::{Record, Table};
pub use crate::domain::ports::{ExtractionLog, Extractor};
pub use crate::utils::error::Result;
