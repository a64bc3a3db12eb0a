use crate::adapters::{open_source_file, run_blocking};
use crate::domain::model::{unique_columns, Record, SourceDescriptor, Table};
use crate::domain::ports::Extractor;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvExtractor {
    path: PathBuf,
    delimiter: u8,
}

impl CsvExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl Extractor for CsvExtractor {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor::CsvFile {
            path: self.path.display().to_string(),
        }
    }

    async fn extract(&self) -> Result<Table> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        tracing::debug!("Reading CSV file: {}", path.display());

        run_blocking(move || {
            let file = open_source_file(&path)?;
            read_csv(file, delimiter)
        })
        .await
    }
}

/// Parses delimited text with a header row.
pub fn read_csv<R: Read>(input: R, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(input);

    let columns = unique_columns(reader.headers()?.iter().map(str::trim));
    if columns.is_empty() {
        return Err(EtlError::ProcessingError {
            message: "No columns to parse from file".to_string(),
        });
    }

    let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
    for row in reader.records() {
        raw_rows.push(row?);
    }

    let kinds: Vec<CellKind> = (0..columns.len())
        .map(|i| infer_column(raw_rows.iter().map(|row| row.get(i).unwrap_or(""))))
        .collect();

    let records = raw_rows
        .iter()
        .map(|row| {
            let data: HashMap<String, Value> = columns
                .iter()
                .zip(&kinds)
                .enumerate()
                .map(|(i, (column, kind))| {
                    (column.clone(), kind.convert(row.get(i).unwrap_or("")))
                })
                .collect();
            Record { data }
        })
        .collect();

    Ok(Table::new(columns, records))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl CellKind {
    fn convert(self, raw: &str) -> Value {
        let cell = raw.trim();
        if cell.is_empty() {
            return Value::Null;
        }
        match self {
            CellKind::Integer => cell
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            CellKind::Float => cell
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellKind::Boolean => Value::Bool(cell.eq_ignore_ascii_case("true")),
            CellKind::Text => Value::String(raw.to_string()),
        }
    }
}

/// A column takes the narrowest type every non-empty cell fits.
fn infer_column<'a>(cells: impl Iterator<Item = &'a str>) -> CellKind {
    let mut integer = true;
    let mut float = true;
    let mut boolean = true;
    let mut any = false;

    for raw in cells {
        let cell = raw.trim();
        if cell.is_empty() {
            continue;
        }
        any = true;
        integer &= cell.parse::<i64>().is_ok();
        float &= cell.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false);
        boolean &= cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false");
    }

    if !any {
        CellKind::Text
    } else if integer {
        CellKind::Integer
    } else if float {
        CellKind::Float
    } else if boolean {
        CellKind::Boolean
    } else {
        CellKind::Text
    }
}
