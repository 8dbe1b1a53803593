//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory holding one folder per revision
    #[serde(default = "default_revisions_path")]
    pub revisions: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub driver: Driver,

    /// File path for sqlite3, connection URL for the other engines
    #[serde(default = "default_address")]
    pub address: String,
}

/// Database engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    #[default]
    #[serde(rename = "sqlite3", alias = "sqlite")]
    Sqlite3,
    #[serde(rename = "postgres", alias = "postgresql")]
    Postgres,
    #[serde(rename = "mysql")]
    Mysql,
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite3 => "sqlite3",
            Driver::Postgres => "postgres",
            Driver::Mysql => "mysql",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Default value functions
fn default_revisions_path() -> String {
    "revisions".to_string()
}

fn default_address() -> String {
    "mgrt.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: Driver::default(),
            address: default_address(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            revisions: default_revisions_path(),
        }
    }
}

impl DatabaseConfig {
    /// Address with ~ expanded. URLs pass through unchanged.
    pub fn address(&self) -> String {
        match self.driver {
            Driver::Sqlite3 => shellexpand::tilde(&self.address).to_string(),
            _ => self.address.clone(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./mgrt.yaml (current directory)
    /// 3. ~/.config/mgrt/mgrt.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "mgrt.yaml".to_string(),
            shellexpand::tilde("~/.config/mgrt/mgrt.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the revisions directory, expanding ~ to home directory
    pub fn revisions_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.revisions).to_string())
    }
}
