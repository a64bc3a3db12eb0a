// Adapters layer: concrete extractors for each source type.

pub mod api_source;
pub mod csv_source;
pub mod flatten;
pub mod parquet_source;
pub mod sqlite_source;

pub use api_source::ApiExtractor;
pub use csv_source::CsvExtractor;
pub use parquet_source::ParquetExtractor;
pub use sqlite_source::SqliteExtractor;

use crate::utils::error::{EtlError, Result};
use std::path::Path;

/// File and database reads block, so they run off the async workers.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Extraction task did not complete: {}", e),
        })?
}

pub(crate) fn open_source_file(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EtlError::SourceNotFound {
            path: path.display().to_string(),
        },
        _ => EtlError::IoError(e),
    })
}
