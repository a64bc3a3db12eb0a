use crate::adapters::{open_source_file, run_blocking};
use crate::domain::model::{Record, SourceDescriptor, Table};
use crate::domain::ports::Extractor;
use crate::utils::error::Result;
use arrow_array::RecordBatch;
use arrow_json::writer::LineDelimited;
use arrow_json::WriterBuilder;
use async_trait::async_trait;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ParquetExtractor {
    path: PathBuf,
    batch_size: usize,
}

impl ParquetExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: 8192,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[async_trait]
impl Extractor for ParquetExtractor {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor::ParquetFile {
            path: self.path.display().to_string(),
        }
    }

    async fn extract(&self) -> Result<Table> {
        let path = self.path.clone();
        let batch_size = self.batch_size;
        tracing::debug!("Reading Parquet file: {}", path.display());

        run_blocking(move || {
            let file = open_source_file(&path)?;
            let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
            let columns: Vec<String> = builder
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
            let reader = builder.with_batch_size(batch_size).build()?;

            let mut records = Vec::new();
            for batch in reader {
                let rows = batch_to_rows(&batch?)?;
                records.extend(rows.into_iter().map(|row| Record {
                    data: row.into_iter().collect(),
                }));
            }

            Ok(Table::new(columns, records))
        })
        .await
    }
}

/// Converts one Arrow batch into JSON rows, keeping nulls as explicit values.
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<Map<String, Value>>> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, LineDelimited>(Vec::new());
    writer.write(batch)?;
    writer.finish()?;
    let buffer = writer.into_inner();

    let mut rows = Vec::with_capacity(batch.num_rows());
    for line in buffer.split(|b| *b == b'\n') {
        if line.is_empty() {
            continue;
        }
        rows.push(serde_json::from_slice::<Map<String, Value>>(line)?);
    }
    Ok(rows)
}
