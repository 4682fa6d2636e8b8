//! core::config::schema
//!
//! Configuration file schema, shared by the global and repository scopes.
//!
//! # Example
//!
//! ```toml
//! model_extensions = ["ecore", "uml", "notation"]
//!
//! [engine]
//! command = "/opt/compare/bin/compare-engine"
//! args = ["--headless"]
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Contents of one configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// File extensions (without the dot) treated as model files.
    pub model_extensions: Option<Vec<String>>,

    /// External comparison engine. Absent means the built-in engine.
    pub engine: Option<EngineConfig>,
}

/// How to launch an external comparison engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Program to run.
    pub command: String,
    /// Arguments placed before the mode argument.
    pub args: Vec<String>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(extensions) = &self.model_extensions {
            if extensions.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "model_extensions cannot be empty".into(),
                ));
            }
            for ext in extensions {
                if ext.is_empty()
                    || ext.starts_with('.')
                    || ext.contains('/')
                    || ext.contains('\\')
                {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid model extension '{}'",
                        ext
                    )));
                }
            }
        }

        if let Some(engine) = &self.engine {
            if engine.command.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "engine.command cannot be empty".into(),
                ));
            }
        }

        Ok(())
    }
}
