//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! There are two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$LOGICAL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/logical/config.toml`
//! 3. `~/.logical/config.toml`
//!
//! # Repo Config Location
//!
//! `<common_dir>/logical/config.toml`

pub mod schema;

pub use schema::{ConfigFile, EngineConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::LogicalPaths;
use crate::core::signal::Die;

/// Model file extensions used when no configuration names any.
pub const DEFAULT_MODEL_EXTENSIONS: &[&str] = &["ecore", "uml", "notation", "di", "xmi"];

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for Die {
    fn from(err: ConfigError) -> Self {
        Die::fatal(err.to_string())
    }
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: ConfigFile,
    pub repo: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// Missing files are not an error; files that exist but do not parse are.
    pub fn load(paths: Option<&LogicalPaths>) -> Result<Self, ConfigError> {
        Self::load_from(Self::global_location(), paths)
    }

    /// Load configuration from an explicit global file location.
    pub fn load_from(
        global_path: Option<PathBuf>,
        paths: Option<&LogicalPaths>,
    ) -> Result<Self, ConfigError> {
        let global_path = global_path.filter(|p| p.exists());
        let global = match &global_path {
            Some(path) => Self::read_file(path)?,
            None => ConfigFile::default(),
        };
        global.validate()?;

        let repo_path = paths.map(LogicalPaths::config_path).filter(|p| p.exists());
        let repo = match &repo_path {
            Some(path) => {
                let repo = Self::read_file(path)?;
                repo.validate()?;
                Some(repo)
            }
            None => None,
        };

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// First existing global config location, if any.
    fn global_location() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LOGICAL_CONFIG") {
            return Some(PathBuf::from(path));
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("logical/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir().map(|home| home.join(".logical/config.toml"))
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Model file extensions, repo overriding global overriding defaults.
    pub fn model_extensions(&self) -> Vec<String> {
        self.repo
            .as_ref()
            .and_then(|r| r.model_extensions.clone())
            .or_else(|| self.global.model_extensions.clone())
            .unwrap_or_else(|| {
                DEFAULT_MODEL_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect()
            })
    }

    /// External engine settings, if one is configured.
    pub fn engine(&self) -> Option<&EngineConfig> {
        self.repo
            .as_ref()
            .and_then(|r| r.engine.as_ref())
            .or(self.global.engine.as_ref())
    }

    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
