use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source not found: {path}")]
    SourceNotFound { path: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Parquet decoding error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow conversion error: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} returned by {endpoint}")]
    HttpStatusError { status: u16, endpoint: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// Failure classes an extraction can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SourceUnavailable,
    MalformedContent,
    Transport,
    HttpStatus,
    Database,
    Configuration,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SourceNotFound { .. } | EtlError::IoError(_) => {
                ErrorCategory::SourceUnavailable
            }
            EtlError::CsvError(e) if e.is_io_error() => ErrorCategory::SourceUnavailable,
            EtlError::CsvError(_)
            | EtlError::ParquetError(_)
            | EtlError::ArrowError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::MalformedContent,
            EtlError::ApiError(_) => ErrorCategory::Transport,
            EtlError::HttpStatusError { .. } => ErrorCategory::HttpStatus,
            EtlError::DatabaseError(_) => ErrorCategory::Database,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::SourceUnavailable => "Check that the source path exists and is readable",
            ErrorCategory::MalformedContent => "Inspect the source file for corrupt or unexpected content",
            ErrorCategory::Transport => "Check network connectivity and TLS certificates for the endpoint",
            ErrorCategory::HttpStatus => "Verify the endpoint URL and query parameters",
            ErrorCategory::Database => "Check the database path and that the table exists",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
