//! Optional on-disk configuration for the mccomp driver.
//!
//! Per §10.3, configuration covers only ambient concerns — the output
//! path, whether diagnostics are colorized, and the log filter. None of
//! it can change lexing, parsing, type-checking, or emission behavior;
//! those are fixed by the language, not user-configurable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DriverError, Result};

/// Default configuration file name, searched for in the current
/// directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "mccomp.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Where the emitted IR is written when `--output` is not given.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Whether diagnostics are colorized.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default `tracing` filter, overridden by the `MCCOMP_LOG` env var.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_output_path() -> String {
    "output.ll".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            color: true,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Loads from `explicit_path` if given, else from `./mccomp.toml` if
    /// present, else falls back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match explicit_path {
            Some(path) => Self::load_from_path(path),
            None => {
                let default_path = PathBuf::from(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load_from_path(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DriverError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DriverError::Config(format!("failed to parse configuration: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_writes_to_output_ll() {
        let config = Config::default();
        assert_eq!(config.output_path, "output.ll");
        assert!(config.color);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn load_from_path_parses_a_custom_output_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("mccomp.toml");
        std::fs::write(&config_path, "output_path = \"build/out.ll\"\ncolor = false\n").unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.output_path, "build/out.ll");
        assert!(!config.color);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn load_from_nonexistent_path_is_an_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/mccomp.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_with_explicit_path_overrides_the_default_search() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        std::fs::write(&config_path, "log_filter = \"debug\"\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.log_filter, "debug");
    }
}
