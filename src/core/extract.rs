//! The extraction boundary.
//!
//! [`extract_source`] runs one extractor, reports the outcome to the log and
//! hands back the typed result. [`extract_or_empty`] keeps the older contract
//! where a failure is reported and then replaced by an empty table.

use crate::adapters::{ApiExtractor, CsvExtractor, ParquetExtractor, SqliteExtractor};
use crate::core::{ExtractionLog, Extractor, Table};
use crate::domain::model::SourceDescriptor;
use crate::utils::error::Result;

pub async fn extract_source(extractor: &dyn Extractor, log: &dyn ExtractionLog) -> Result<Table> {
    let descriptor = extractor.descriptor();
    match extractor.extract().await {
        Ok(table) => {
            log.extracted(&descriptor, table.len());
            Ok(table)
        }
        Err(e) => {
            log.failed(&descriptor, &e);
            Err(e)
        }
    }
}

pub async fn extract_or_empty(extractor: &dyn Extractor, log: &dyn ExtractionLog) -> Table {
    extract_source(extractor, log).await.unwrap_or_default()
}

pub async fn csv_table(path: &str, log: &dyn ExtractionLog) -> Table {
    extract_or_empty(&CsvExtractor::new(path), log).await
}

pub async fn parquet_table(path: &str, log: &dyn ExtractionLog) -> Table {
    extract_or_empty(&ParquetExtractor::new(path), log).await
}

pub async fn api_table(endpoint: &str, log: &dyn ExtractionLog) -> Table {
    match ApiExtractor::new(endpoint) {
        Ok(extractor) => extract_or_empty(&extractor, log).await,
        Err(e) => {
            let descriptor = SourceDescriptor::Endpoint {
                url: endpoint.to_string(),
            };
            log.failed(&descriptor, &e);
            Table::empty()
        }
    }
}

pub async fn db_table(db_path: &str, table_name: &str, log: &dyn ExtractionLog) -> Table {
    extract_or_empty(&SqliteExtractor::new(db_path, table_name), log).await
}
