use crate::adapters::flatten;
use crate::domain::model::{SourceDescriptor, Table};
use crate::domain::ports::Extractor;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Certificate, Client, StatusCode};
use std::path::Path;
use std::time::Duration;

/// Builds the HTTP client used for API extraction. The bundled web PKI roots
/// are always trusted; `ca_bundle` adds PEM roots on top of them.
pub fn build_client(timeout: Option<Duration>, ca_bundle: Option<&Path>) -> Result<Client> {
    let mut builder = Client::builder().use_rustls_tls();

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(bundle) = ca_bundle {
        let pem = std::fs::read(bundle).map_err(|e| EtlError::ConfigError {
            message: format!("Cannot read CA bundle {}: {}", bundle.display(), e),
        })?;
        for certificate in Certificate::from_pem_bundle(&pem)? {
            builder = builder.add_root_certificate(certificate);
        }
    }

    Ok(builder.build()?)
}

pub struct ApiExtractor {
    endpoint: String,
    client: Client,
}

impl ApiExtractor {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(endpoint, build_client(None, None)?))
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl Extractor for ApiExtractor {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor::Endpoint {
            url: self.endpoint.clone(),
        }
    }

    async fn extract(&self) -> Result<Table> {
        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            return Err(EtlError::HttpStatusError {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }
        tracing::debug!("{} - ok: while invoking the API {}", status.as_u16(), self.endpoint);

        let body = response.bytes().await?;
        let document: serde_json::Value = serde_json::from_slice(&body)?;
        flatten::normalize(document)
    }
}
