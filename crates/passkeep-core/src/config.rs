//! Configuration loading for passkeep

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// Environment variable that overrides the configured store path
pub const STORE_ENV: &str = "PASSKEEP_STORE";

/// passkeep configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Password file (defaults to the data dir)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// XOR key applied by encrypt/decrypt
    #[serde(default = "default_transform_key")]
    pub transform_key: u8,

    /// Defaults for `passkeep generate` and `add --generate`
    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_transform_key() -> u8 {
    10
}

/// Password generator defaults
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_length")]
    pub length: usize,

    #[serde(default = "default_true")]
    pub upper: bool,

    #[serde(default = "default_true")]
    pub lower: bool,

    #[serde(default = "default_true")]
    pub special: bool,
}

fn default_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            upper: true,
            lower: true,
            special: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            transform_key: default_transform_key(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the standard location or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Paths::new().config_file())
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))
    }

    /// Resolve the password file: $PASSKEEP_STORE, then config, then default
    pub fn store_file(&self, paths: &Paths) -> PathBuf {
        if let Some(path) = std::env::var_os(STORE_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        self.store_path
            .clone()
            .unwrap_or_else(|| paths.store_file())
    }
}
