//! Configuration loading
//!
//! Settings come from, in increasing priority: built-in defaults, a JSON
//! config file, environment variables and command-line flags. The last two
//! are resolved by clap and applied through [`Overrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientConfig;

pub const DEFAULT_WIDTH: usize = 80;
const LOCAL_CONFIG_FILES: [&str; 2] = [".advisor.json", "advisor.json"];

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },

  #[error("invalid config file {path}: {source}")]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("display width must be at least 20, got {0}")]
  Width(usize),

  #[error("request timeout must be at least 1 second")]
  ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
  /// Column at which list and advice text wraps
  #[serde(default = "default_width")]
  pub width: usize,
}

fn default_width() -> usize {
  DEFAULT_WIDTH
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self { width: default_width() }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ClientConfig,
  #[serde(default)]
  pub display: DisplayConfig,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub base_url: Option<String>,
  pub timeout_secs: Option<u64>,
  pub width: Option<usize>,
}

impl Config {
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
      .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  /// Load the explicit file if given, otherwise the first config file found
  /// in `dir`, then the user config directory, falling back to defaults.
  pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::load_from_file(path);
    }

    let user_config = dirs::config_dir().map(|d| d.join("advisor").join("config.json"));
    let candidates = LOCAL_CONFIG_FILES.iter().map(|name| dir.join(name)).chain(user_config);

    for path in candidates {
      if path.is_file() {
        tracing::debug!(path = %path.display(), "loading config");
        return Self::load_from_file(&path);
      }
    }

    Ok(Self::default())
  }

  pub fn apply(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
    if let Some(base_url) = overrides.base_url {
      self.api.base_url = base_url;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
      self.api.timeout_secs = Some(timeout_secs);
    }
    if let Some(width) = overrides.width {
      self.display.width = width;
    }

    if self.display.width < 20 {
      return Err(ConfigError::Width(self.display.width));
    }
    if self.api.timeout_secs == Some(0) {
      return Err(ConfigError::ZeroTimeout);
    }
    Ok(self)
  }
}
