//! Configuration file support for wpcheck
//!
//! Supports `.wpcheckrc.toml` and `wpcheck.toml` configuration files.
//!
//! Example configuration:
//! ```toml
//! # Release endpoint to compare against
//! url = "https://api.github.com/repos/winpython/winpython/releases/latest"
//!
//! # Pin files, relative to the working directory
//! python_file = "ci/python_version.txt"
//! winpython_file = "ci/winpython_version.txt"
//!
//! # Installer architecture: "32" or "64"
//! arch = "32"
//! ```

use crate::asset::Arch;
use crate::registry::DEFAULT_RELEASE_URL;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Maximum size for config files (1 MB) to prevent DoS
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

pub const DEFAULT_PYTHON_FILE: &str = "python_version.txt";
pub const DEFAULT_WINPYTHON_FILE: &str = "winpython_version.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file {} is too large ({size} bytes, max {MAX_CONFIG_FILE_SIZE})", path.display())]
    TooLarge { path: PathBuf, size: u64 },

    #[error("invalid TOML in config file {}:\n  {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration loaded from .wpcheckrc.toml or wpcheck.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WpcheckConfig {
    /// Release endpoint
    pub url: Option<String>,

    /// File holding the pinned Python version
    pub python_file: Option<PathBuf>,

    /// File holding the pinned WinPython version
    pub winpython_file: Option<PathBuf>,

    /// Installer architecture
    pub arch: Option<Arch>,
}

impl WpcheckConfig {
    /// Load configuration by searching for config files in the given directory and parents,
    /// then in the per-user config directory
    pub fn discover(start_dir: &Path) -> Option<(Self, PathBuf)> {
        let config_names = [".wpcheckrc.toml", "wpcheck.toml", ".wpcheckrc"];

        let mut current = Some(start_dir);
        while let Some(dir) = current {
            for name in &config_names {
                let config_path = dir.join(name);
                if config_path.exists()
                    && let Some(config) = Self::load_from_path(&config_path)
                {
                    return Some((config, config_path));
                }
            }
            current = dir.parent();
        }

        let user_config = Self::user_config_path()?;
        if user_config.exists() {
            return Self::load_from_path(&user_config).map(|config| (config, user_config));
        }

        None
    }

    fn user_config_path() -> Option<PathBuf> {
        // Check for override via environment variable
        if let Ok(dir) = std::env::var("WPCHECK_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.toml"));
        }

        ProjectDirs::from("", "", "wpcheck").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from a specific file path (silent failure for auto-discovery)
    pub fn load_from_path(path: &Path) -> Option<Self> {
        match Self::load_from_path_with_error(path) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("Ignoring config file: {}", e);
                None
            }
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from_path_with_error(path: &Path) -> Result<Self, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge another configuration into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.python_file.is_some() {
            self.python_file = other.python_file;
        }
        if other.winpython_file.is_some() {
            self.winpython_file = other.winpython_file;
        }
        if other.arch.is_some() {
            self.arch = other.arch;
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    pub python_file: PathBuf,
    pub winpython_file: PathBuf,
    pub arch: Arch,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_RELEASE_URL.to_string(),
            python_file: PathBuf::from(DEFAULT_PYTHON_FILE),
            winpython_file: PathBuf::from(DEFAULT_WINPYTHON_FILE),
            arch: Arch::default(),
        }
    }
}

impl Settings {
    /// Apply a config layer over the built-in defaults
    pub fn from_config(config: WpcheckConfig) -> Self {
        let defaults = Self::default();
        Self {
            url: config.url.unwrap_or(defaults.url),
            python_file: config.python_file.unwrap_or(defaults.python_file),
            winpython_file: config.winpython_file.unwrap_or(defaults.winpython_file),
            arch: config.arch.unwrap_or(defaults.arch),
        }
    }
}
