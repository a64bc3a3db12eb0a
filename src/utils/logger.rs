use crate::domain::model::SourceDescriptor;
use crate::domain::ports::ExtractionLog;
use crate::utils::error::EtlError;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tabular_extract=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabular_extract=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
}

/// Writes extraction outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ExtractionLog for TracingLog {
    fn extracted(&self, source: &SourceDescriptor, records: usize) {
        tracing::info!(
            source = source.kind().as_str(),
            records,
            "{}: extracted {} records from the {} source",
            source,
            records,
            source.kind()
        );
    }

    fn failed(&self, source: &SourceDescriptor, error: &EtlError) {
        tracing::error!(
            source = source.kind().as_str(),
            category = ?error.category(),
            "{}: {} encountered while extracting the {} source",
            source,
            error,
            source.kind()
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub source: SourceDescriptor,
    pub message: String,
}

/// Keeps entries in memory so callers can inspect what was reported.
#[derive(Debug, Default)]
pub struct CapturedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl CapturedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }

    fn push(&self, level: LogLevel, source: &SourceDescriptor, message: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                source: source.clone(),
                message,
            });
        }
    }
}

impl ExtractionLog for CapturedLog {
    fn extracted(&self, source: &SourceDescriptor, records: usize) {
        self.push(LogLevel::Info, source, format!("extracted {} records", records));
    }

    fn failed(&self, source: &SourceDescriptor, error: &EtlError) {
        self.push(LogLevel::Error, source, error.to_string());
    }
}
