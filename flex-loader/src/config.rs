//! Loader configuration, read from `loader.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

const DEFAULT_MAX_ENTRIES: usize = 10_000;
const DEFAULT_MAX_UNPACKED_BYTES: u64 = 256 * 1024 * 1024;

/// Tunables for archive materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Remove a partially extracted working directory when extraction fails.
    pub cleanup_on_failure: bool,
    /// Upper bound on the number of entries in one archive.
    pub max_entries: usize,
    /// Upper bound on the total uncompressed size of one archive.
    pub max_unpacked_bytes: u64,
    /// When a non-forced load finds a working directory whose stamp matches
    /// the source digest, keep it instead of re-extracting.
    pub reuse_verified: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cleanup_on_failure: true,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_unpacked_bytes: DEFAULT_MAX_UNPACKED_BYTES,
            reuse_verified: true,
        }
    }
}

impl LoaderConfig {
    /// Parses a configuration document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads a configuration file, failing on I/O or parse errors.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from `path` if it exists.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No loader config found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded loader config from {:?}", path);
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load loader config {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }
}
