pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ApiExtractor, CsvExtractor, ParquetExtractor, SqliteExtractor};
pub use config::ExtractConfig;
pub use crate::core::engine::{ExtractEngine, ExtractionReport, SourceOutcome};
pub use crate::core::extract::{extract_or_empty, extract_source};
pub use domain::model::{Record, SourceDescriptor, SourceKind, Table};
pub use domain::ports::{ExtractionLog, Extractor};
pub use utils::error::{EtlError, Result};
