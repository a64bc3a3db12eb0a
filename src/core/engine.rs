use crate::adapters::api_source::build_client;
use crate::adapters::{ApiExtractor, CsvExtractor, ParquetExtractor, SqliteExtractor};
use crate::config::toml_config::ExtractConfig;
use crate::core::extract::extract_source;
use crate::core::{ExtractionLog, Extractor, Table};
use crate::domain::model::{SourceDescriptor, SourceKind};
use crate::utils::error::Result;
use crate::utils::logger::TracingLog;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What happened to one source during a run.
#[derive(Debug)]
pub struct SourceOutcome {
    pub descriptor: SourceDescriptor,
    pub result: Result<Table>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl SourceOutcome {
    pub fn kind(&self) -> SourceKind {
        self.descriptor.kind()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn record_count(&self) -> usize {
        self.result.as_ref().map(Table::len).unwrap_or(0)
    }

    pub fn into_table(self) -> Table {
        self.result.unwrap_or_default()
    }
}

/// The four outcomes of one engine run, in extraction order.
#[derive(Debug)]
pub struct ExtractionReport {
    pub csv: SourceOutcome,
    pub parquet: SourceOutcome,
    pub api: SourceOutcome,
    pub database: SourceOutcome,
}

impl ExtractionReport {
    pub fn outcomes(&self) -> [&SourceOutcome; 4] {
        [&self.csv, &self.parquet, &self.api, &self.database]
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes().iter().all(|o| o.is_success())
    }

    pub fn failures(&self) -> Vec<&SourceOutcome> {
        self.outcomes()
            .into_iter()
            .filter(|o| !o.is_success())
            .collect()
    }

    /// Collapses failures into empty tables: `(csv, parquet, api, db)`.
    pub fn into_tables(self) -> (Table, Table, Table, Table) {
        (
            self.csv.into_table(),
            self.parquet.into_table(),
            self.api.into_table(),
            self.database.into_table(),
        )
    }
}

/// Runs the CSV, Parquet, API and database extractors one after another.
/// A failing source never stops the ones after it.
pub struct ExtractEngine {
    csv: Box<dyn Extractor>,
    parquet: Box<dyn Extractor>,
    api: Box<dyn Extractor>,
    database: Box<dyn Extractor>,
    log: Arc<dyn ExtractionLog>,
    monitor: SystemMonitor,
}

impl ExtractEngine {
    pub fn new(
        csv: Box<dyn Extractor>,
        parquet: Box<dyn Extractor>,
        api: Box<dyn Extractor>,
        database: Box<dyn Extractor>,
    ) -> Self {
        Self {
            csv,
            parquet,
            api,
            database,
            log: Arc::new(TracingLog),
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self> {
        let csv = CsvExtractor::new(&config.csv.path).with_delimiter(config.csv.delimiter_byte()?);

        let mut parquet = ParquetExtractor::new(&config.parquet.path);
        if let Some(batch_size) = config.parquet.batch_size {
            parquet = parquet.with_batch_size(batch_size);
        }

        let client = build_client(
            config.api.timeout_seconds.map(Duration::from_secs),
            config.api.ca_bundle.as_deref().map(Path::new),
        )?;
        let api = ApiExtractor::with_client(&config.api.endpoint, client);

        let database = SqliteExtractor::new(&config.database.path, &config.database.table);

        Ok(Self::new(
            Box::new(csv),
            Box::new(parquet),
            Box::new(api),
            Box::new(database),
        )
        .with_monitoring(config.monitoring.enabled))
    }

    pub fn with_log(mut self, log: Arc<dyn ExtractionLog>) -> Self {
        self.log = log;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub async fn run(&self) -> ExtractionReport {
        tracing::info!("Starting extraction from 4 sources");
        self.monitor.log_stats("Start");

        let csv = self.run_one(self.csv.as_ref()).await;
        let parquet = self.run_one(self.parquet.as_ref()).await;
        let api = self.run_one(self.api.as_ref()).await;
        let database = self.run_one(self.database.as_ref()).await;

        let report = ExtractionReport {
            csv,
            parquet,
            api,
            database,
        };

        tracing::info!(
            "Extraction finished: {} of 4 sources succeeded",
            report.outcomes().iter().filter(|o| o.is_success()).count()
        );
        self.monitor.log_final_stats();
        report
    }

    /// Same as [`run`](Self::run) with failures collapsed into empty tables.
    pub async fn run_tables(&self) -> (Table, Table, Table, Table) {
        self.run().await.into_tables()
    }

    async fn run_one(&self, extractor: &dyn Extractor) -> SourceOutcome {
        let descriptor = extractor.descriptor();
        let started_at = Utc::now();
        let timer = Instant::now();

        let result = extract_source(extractor, self.log.as_ref()).await;

        self.monitor.log_stats(descriptor.kind().as_str());
        SourceOutcome {
            descriptor,
            result,
            started_at,
            elapsed: timer.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use crate::utils::logger::{CapturedLog, LogLevel};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedExtractor {
        descriptor: SourceDescriptor,
        rows: Option<usize>,
        calls: Arc<Mutex<Vec<SourceKind>>>,
    }

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        fn descriptor(&self) -> SourceDescriptor {
            self.descriptor.clone()
        }

        async fn extract(&self) -> Result<Table> {
            self.calls.lock().unwrap().push(self.descriptor.kind());
            match self.rows {
                Some(n) => {
                    let rows = (0..n)
                        .filter_map(|i| serde_json::json!({ "i": i }).as_object().cloned())
                        .collect();
                    Ok(Table::from_rows(rows))
                }
                None => Err(EtlError::SourceNotFound {
                    path: self.descriptor.to_string(),
                }),
            }
        }
    }

    fn scripted(
        calls: &Arc<Mutex<Vec<SourceKind>>>,
        descriptor: SourceDescriptor,
        rows: Option<usize>,
    ) -> Box<dyn Extractor> {
        Box::new(ScriptedExtractor {
            descriptor,
            rows,
            calls: Arc::clone(calls),
        })
    }

    fn engine(calls: &Arc<Mutex<Vec<SourceKind>>>, rows: [Option<usize>; 4]) -> ExtractEngine {
        ExtractEngine::new(
            scripted(
                calls,
                SourceDescriptor::CsvFile {
                    path: "a.csv".to_string(),
                },
                rows[0],
            ),
            scripted(
                calls,
                SourceDescriptor::ParquetFile {
                    path: "a.parquet".to_string(),
                },
                rows[1],
            ),
            scripted(
                calls,
                SourceDescriptor::Endpoint {
                    url: "https://example.com/a.json".to_string(),
                },
                rows[2],
            ),
            scripted(
                calls,
                SourceDescriptor::DatabaseTable {
                    path: "a.sqlite".to_string(),
                    table: "a".to_string(),
                },
                rows[3],
            ),
        )
    }

    #[tokio::test]
    async fn test_runs_every_source_once_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let report = engine(&calls, [Some(1), Some(2), Some(3), Some(4)])
            .run()
            .await;

        assert_eq!(*calls.lock().unwrap(), SourceKind::ALL.to_vec());
        assert!(report.all_succeeded());
        let counts: Vec<usize> = report.outcomes().iter().map(|o| o.record_count()).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_early_failures_do_not_short_circuit() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::new(CapturedLog::new());
        let report = engine(&calls, [None, None, Some(3), None])
            .with_log(log.clone())
            .run()
            .await;

        assert_eq!(*calls.lock().unwrap(), SourceKind::ALL.to_vec());
        assert_eq!(report.failures().len(), 3);
        assert_eq!(log.count(LogLevel::Error), 3);
        assert_eq!(log.count(LogLevel::Info), 1);

        let (csv, parquet, api, db) = report.into_tables();
        assert!(csv.is_empty());
        assert!(parquet.is_empty());
        assert_eq!(api.len(), 3);
        assert!(db.is_empty());
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_descriptors() {
        let mut config = ExtractConfig::default();
        config.csv.path = "/nonexistent/x.csv".to_string();
        config.database.table = "films".to_string();

        let engine = ExtractEngine::from_config(&config).unwrap();

        assert_eq!(
            engine.csv.descriptor(),
            SourceDescriptor::CsvFile {
                path: "/nonexistent/x.csv".to_string()
            }
        );
        assert_eq!(
            engine.database.descriptor(),
            SourceDescriptor::DatabaseTable {
                path: "movies.sqlite".to_string(),
                table: "films".to_string()
            }
        );
        assert_eq!(engine.api.kind(), SourceKind::Api);
    }
}
