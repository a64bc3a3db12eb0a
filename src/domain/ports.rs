use crate::domain::model::{SourceDescriptor, SourceKind, Table};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

/// One tabular source.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn descriptor(&self) -> SourceDescriptor;

    async fn extract(&self) -> Result<Table>;

    fn kind(&self) -> SourceKind {
        self.descriptor().kind()
    }
}

/// Side channel receiving exactly one entry per extraction attempt.
pub trait ExtractionLog: Send + Sync {
    fn extracted(&self, source: &SourceDescriptor, records: usize);
    fn failed(&self, source: &SourceDescriptor, error: &EtlError);
}
