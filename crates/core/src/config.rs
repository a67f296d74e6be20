//! Grid-size configuration, loadable from a TOML file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sheetcalc_engine::{MAX_COLS, MAX_ROWS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("could not parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Configurable bounds on sheet geometry. The engine's own [`MAX_ROWS`]/
/// [`MAX_COLS`] constants are the hard ceiling; this only lets a deployment
/// tighten them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub max_rows: i32,
    pub max_cols: i32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig { max_rows: MAX_ROWS, max_cols: MAX_COLS }
    }
}

impl SheetConfig {
    /// Reads and parses a config file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Loads from the platform config directory (`sheetcalc/config.toml`
    /// under the user's config dir), falling back to defaults when no such
    /// file exists.
    pub fn load_or_default() -> Self {
        let Some(dirs) = ProjectDirs::from("", "", "sheetcalc") else {
            return SheetConfig::default();
        };
        let path = dirs.config_dir().join("config.toml");
        if !path.exists() {
            return SheetConfig::default();
        }
        match SheetConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed config at {}: {err}", path.display());
                SheetConfig::default()
            }
        }
    }
}
