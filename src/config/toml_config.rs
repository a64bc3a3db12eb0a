use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_identifier, validate_path, validate_range, validate_single_byte, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CSV_PATH: &str = "h9gi-nx95.csv";
pub const DEFAULT_PARQUET_PATH: &str = "yellow_tripdata_2022-01.parquet";
pub const DEFAULT_API_ENDPOINT: &str =
    "https://data.cityofnewyork.us/resource/h9gi-nx95.json?$limit=500";
pub const DEFAULT_DB_PATH: &str = "movies.sqlite";
pub const DEFAULT_TABLE: &str = "movies";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Source descriptors for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub csv: CsvSourceConfig,
    pub parquet: ParquetSourceConfig,
    pub api: ApiSourceConfig,
    pub database: DatabaseSourceConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSourceConfig {
    pub path: String,
    pub delimiter: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParquetSourceConfig {
    pub path: String,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSourceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub ca_bundle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSourceConfig {
    pub path: String,
    pub table: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CSV_PATH.to_string(),
            delimiter: ',',
        }
    }
}

impl Default for ParquetSourceConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PARQUET_PATH.to_string(),
            batch_size: None,
        }
    }
}

impl Default for ApiSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            ca_bundle: None,
        }
    }
}

impl Default for DatabaseSourceConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_PATH.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl CsvSourceConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        validate_single_byte("csv.delimiter", self.delimiter)
    }
}

impl ExtractConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigError {
            message: format!("Cannot read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

impl Validate for ExtractConfig {
    fn validate(&self) -> Result<()> {
        validate_path("csv.path", &self.csv.path)?;
        self.csv.delimiter_byte()?;

        validate_path("parquet.path", &self.parquet.path)?;
        if let Some(batch_size) = self.parquet.batch_size {
            validate_range("parquet.batch_size", batch_size, 1, 1_000_000)?;
        }

        validate_url("api.endpoint", &self.api.endpoint)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 3600)?;
        }
        if let Some(bundle) = &self.api.ca_bundle {
            validate_path("api.ca_bundle", bundle)?;
        }

        validate_path("database.path", &self.database.path)?;
        validate_identifier("database.table", &self.database.table)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_sources() {
        let config = ExtractConfig::default();
        assert_eq!(config.csv.path, "h9gi-nx95.csv");
        assert_eq!(config.parquet.path, "yellow_tripdata_2022-01.parquet");
        assert!(config.api.endpoint.ends_with("?$limit=500"));
        assert_eq!(config.database.table, "movies");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ExtractConfig::from_toml_str(
            r#"
            [database]
            path = "films.sqlite"
            table = "films"

            [api]
            timeout_seconds = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, "films.sqlite");
        assert_eq!(config.database.table, "films");
        assert_eq!(config.api.timeout_seconds, Some(5));
        assert_eq!(config.api.endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.csv, CsvSourceConfig::default());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("TABULAR_EXTRACT_TEST_DIR", "/data/in");
        let config = ExtractConfig::from_toml_str(
            r#"
            [csv]
            path = "${TABULAR_EXTRACT_TEST_DIR}/collisions.csv"
            delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.csv.path, "/data/in/collisions.csv");
        assert_eq!(config.csv.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn test_dollar_query_parameter_is_untouched() {
        let config = ExtractConfig::from_toml_str(
            r#"
            [api]
            endpoint = "https://example.com/rows.json?$limit=10"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.endpoint, "https://example.com/rows.json?$limit=10");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = ExtractConfig::from_toml_str("[csv\npath = 1");
        assert!(matches!(result, Err(EtlError::ConfigError { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ExtractConfig::default();
        config.database.table = "movies--".to_string();
        assert!(config.validate().is_err());

        let mut config = ExtractConfig::default();
        config.api.endpoint = "file:///etc/passwd".to_string();
        assert!(config.validate().is_err());

        let mut config = ExtractConfig::default();
        config.api.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }
}
