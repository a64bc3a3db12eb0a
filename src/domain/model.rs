use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

/// Ordered rows sharing one column set.
///
/// Every record holds a value (possibly `null`) for every entry in
/// `columns`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from a known header. Cells missing from a record are
    /// filled with `null` and keys outside the header are dropped. Repeated
    /// header names are renamed with [`unique_columns`].
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let columns = unique_columns(columns);
        let records = records
            .into_iter()
            .map(|mut record| {
                let data = columns
                    .iter()
                    .map(|column| {
                        let value = record.data.remove(column).unwrap_or(Value::Null);
                        (column.clone(), value)
                    })
                    .collect();
                Record { data }
            })
            .collect();

        Self { columns, records }
    }

    /// Builds a table from loosely shaped rows. Columns are the union of all
    /// keys in order of first appearance.
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let records = rows
            .into_iter()
            .map(|row| Record {
                data: row.into_iter().collect(),
            })
            .collect();

        Self::new(columns, records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Values of one column, top to bottom. `None` if the column is unknown.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        if !self.columns.iter().any(|c| c == name) {
            return None;
        }
        Some(
            self.records
                .iter()
                .map(|record| record.data.get(name).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.records.get(row)?.data.get(column)
    }

    /// Row as a JSON object with keys in column order.
    pub fn row_json(&self, row: usize) -> Option<Value> {
        let record = self.records.get(row)?;
        let object: Map<String, Value> = self
            .columns
            .iter()
            .map(|c| (c.clone(), record.data.get(c).cloned().unwrap_or(Value::Null)))
            .collect();
        Some(Value::Object(object))
    }
}

/// Renames repeated names to `name.N`, taking the lowest `N` that is not
/// already a name in the input or an earlier rename. The first occurrence
/// keeps its name.
pub fn unique_columns<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());

    for name in &names {
        if seen.insert(name.as_str()) {
            columns.push(name.clone());
            continue;
        }
        let mut n = 1;
        let renamed = loop {
            let candidate = format!("{}.{}", name, n);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(renamed.clone());
        columns.push(renamed);
    }

    columns
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Parquet,
    Api,
    Database,
}

impl SourceKind {
    /// Fixed order in which the engine visits sources.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Csv,
        SourceKind::Parquet,
        SourceKind::Api,
        SourceKind::Database,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Parquet => "parquet",
            SourceKind::Api => "api",
            SourceKind::Database => "database",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where one extractor reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceDescriptor {
    CsvFile { path: String },
    ParquetFile { path: String },
    Endpoint { url: String },
    DatabaseTable { path: String, table: String },
}

impl SourceDescriptor {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::CsvFile { .. } => SourceKind::Csv,
            SourceDescriptor::ParquetFile { .. } => SourceKind::Parquet,
            SourceDescriptor::Endpoint { .. } => SourceKind::Api,
            SourceDescriptor::DatabaseTable { .. } => SourceKind::Database,
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::CsvFile { path } | SourceDescriptor::ParquetFile { path } => {
                f.write_str(path)
            }
            SourceDescriptor::Endpoint { url } => f.write_str(url),
            SourceDescriptor::DatabaseTable { path, table } => write!(f, "{}:{}", path, table),
        }
    }
}
