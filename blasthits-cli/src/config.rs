//! Configuration handling for the blasthits CLI
//!
//! Supports loading configuration from blasthits.toml files with CLI argument overrides.

use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use blasthits_core::types::{DEFAULT_DATABASE, DEFAULT_PROGRAM, DEFAULT_SEQUENCE};
use blasthits_core::QblastOptions;

/// File looked up in the working directory when no --config is given
pub const DEFAULT_CONFIG_FILE: &str = "blasthits.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub qblast: QblastOptions,

    #[serde(default)]
    pub hits: HitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// BLAST program (blastn, blastp, blastx, tblastn, tblastx)
    #[serde(default = "default_program")]
    pub program: String,

    /// Database to search
    #[serde(default = "default_database")]
    pub database: String,

    /// Query sequence used when neither --sequence nor --fasta is given
    #[serde(default = "default_sequence")]
    pub sequence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsConfig {
    /// Report zero hits instead of failing when the report has no hits container
    #[serde(default)]
    pub missing_as_zero: bool,
}

fn default_program() -> String { DEFAULT_PROGRAM.to_string() }
fn default_database() -> String { DEFAULT_DATABASE.to_string() }
fn default_sequence() -> String { DEFAULT_SEQUENCE.to_string() }

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            database: default_database(),
            sequence: default_sequence(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Render the configuration as TOML, e.g. to seed a blasthits.toml
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .context("Failed to serialize configuration")
    }
}
