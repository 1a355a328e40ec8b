//! Store configuration via `configx.toml`
//!
//! On first open of a data directory a default `configx.toml` is created.
//! To change settings, edit the file and reopen the store.

use configx_core::{Error, Result, MAX_NESTING_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the store's data directory.
pub const CONFIG_FILE_NAME: &str = "configx.toml";

/// Default snapshot file name inside the data directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "configx.snap";

/// When the snapshot is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityMode {
    /// Only on explicit `save()` / `close()`
    OnClose,
    /// After every successful mutating statement
    Always,
}

/// Store configuration loaded from `configx.toml`.
///
/// # Example
///
/// ```toml
/// durability = "on_close"
/// snapshot_file = "configx.snap"
/// max_nesting_depth = 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Durability mode: `"on_close"` or `"always"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Snapshot file name, relative to the data directory.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
    /// Deepest list nesting accepted by writes and by snapshot loading.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

fn default_durability_str() -> String {
    "on_close".to_string()
}

fn default_snapshot_file() -> String {
    DEFAULT_SNAPSHOT_FILE.to_string()
}

fn default_max_nesting_depth() -> usize {
    MAX_NESTING_DEPTH
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            snapshot_file: default_snapshot_file(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

impl StoreConfig {
    /// Parse the durability string into a `DurabilityMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"on_close"` or `"always"`.
    pub fn durability_mode(&self) -> Result<DurabilityMode> {
        match self.durability.as_str() {
            "on_close" => Ok(DurabilityMode::OnClose),
            "always" => Ok(DurabilityMode::Always),
            other => Err(config_error(format!(
                "Invalid durability mode '{}' in {}. Expected \"on_close\" or \"always\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Check every field, not just durability.
    pub fn validate(&self) -> Result<()> {
        self.durability_mode()?;
        if self.snapshot_file.is_empty()
            || self.snapshot_file.contains(['/', '\\'])
            || self.snapshot_file == "."
            || self.snapshot_file == ".."
        {
            return Err(config_error(format!(
                "snapshot_file must be a plain file name, got '{}'",
                self.snapshot_file
            )));
        }
        if self.max_nesting_depth == 0 || self.max_nesting_depth > MAX_NESTING_DEPTH {
            return Err(config_error(format!(
                "max_nesting_depth must be between 1 and {}, got {}",
                MAX_NESTING_DEPTH, self.max_nesting_depth
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# ConfigX store configuration
#
# Durability mode: "on_close" (default) or "always"
#   "on_close" = snapshot written on save() and close()
#   "always"   = snapshot rewritten after every successful mutation
durability = "on_close"

# Snapshot file name inside this directory
snapshot_file = "configx.snap"

# Deepest list nesting accepted by writes and snapshot loads (1-100)
max_nesting_depth = 100
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            config_error(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Io {
                reason: format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| config_error(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| Error::Io {
            reason: format!("Failed to write config file '{}': {}", path.display(), e),
        })
    }
}

fn config_error(reason: String) -> Error {
    Error::Config { reason }
}
