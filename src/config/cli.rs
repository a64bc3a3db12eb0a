use crate::config::toml_config::ExtractConfig;
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "tabular-extract")]
#[command(about = "Extract tables from CSV, Parquet, an HTTP API and SQLite")]
pub struct CliConfig {
    #[arg(long, help = "TOML file with source descriptors")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub csv_path: Option<String>,

    #[arg(long)]
    pub parquet_path: Option<String>,

    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long)]
    pub db_path: Option<String>,

    #[arg(long)]
    pub table: Option<String>,

    #[arg(long, default_value = "0", help = "Print the first N rows of each table")]
    pub preview: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory after each source")]
    pub monitor: bool,
}

impl CliConfig {
    /// Loads the config file (or defaults) and applies flag overrides.
    pub fn resolve(&self) -> Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractConfig::from_file(path)?,
            None => ExtractConfig::default(),
        };

        if let Some(path) = &self.csv_path {
            config.csv.path = path.clone();
        }
        if let Some(path) = &self.parquet_path {
            config.parquet.path = path.clone();
        }
        if let Some(endpoint) = &self.api_endpoint {
            config.api.endpoint = endpoint.clone();
        }
        if let Some(path) = &self.db_path {
            config.database.path = path.clone();
        }
        if let Some(table) = &self.table {
            config.database.table = table.clone();
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"a.sqlite\"\ntable = \"a\"").unwrap();

        let cli = CliConfig::parse_from([
            "tabular-extract",
            "--config",
            file.path().to_str().unwrap(),
            "--table",
            "b",
            "--monitor",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.database.path, "a.sqlite");
        assert_eq!(config.database.table, "b");
        assert!(config.monitoring.enabled);
    }

    #[test]
    fn test_no_flags_gives_defaults() {
        let cli = CliConfig::parse_from(["tabular-extract"]);
        assert_eq!(cli.resolve().unwrap(), ExtractConfig::default());
        assert_eq!(cli.preview, 0);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig::parse_from(["tabular-extract", "--config", "/nonexistent/x.toml"]);
        assert!(cli.resolve().is_err());
    }
}
