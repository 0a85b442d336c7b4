//! Project configuration file support (`mdvet.toml`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{CollectionConfig, ValidationMode};
use crate::transform::TransformRule;

/// Name of the config file looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "mdvet.toml";

/// Errors while loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Run-wide validation defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Schema applied to every resource.
    pub schema: Option<String>,
    pub mode: Option<ValidationMode>,
    #[serde(alias = "checkUrlLinks")]
    pub check_url_links: bool,
}

/// Transform settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    #[serde(alias = "defaultTemplate")]
    pub default_template: Option<String>,
    pub rules: Vec<TransformRule>,
    /// Extra variables available to every template.
    pub context: serde_json::Map<String, serde_json::Value>,
}

/// Project configuration loaded from `mdvet.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub collections: BTreeMap<String, CollectionConfig>,
    pub validate: ValidateConfig,
    pub transform: TransformConfig,
}

impl ProjectConfig {
    /// Loads the configuration for a project.
    ///
    /// With an explicit `path` the file must exist. Otherwise
    /// `<root>/mdvet.toml` is used when present and the default (empty)
    /// configuration when not.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigError::NotFound {
                        path: explicit.to_path_buf(),
                    });
                }
                explicit.to_path_buf()
            }
            None => {
                let default = Self::config_path(root);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: config_path,
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Returns the path of the config file for a project root.
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Resolves the validation mode, with the CLI flag taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--mode` argument
    /// 2. Config file `validate.mode` setting
    /// 3. None (each collection's own mode, then permissive)
    pub fn mode(&self, cli_mode: Option<ValidationMode>) -> Option<ValidationMode> {
        cli_mode.or(self.validate.mode)
    }

    /// Resolves the run-wide schema, with the CLI flag taking precedence.
    pub fn schema<'a>(&'a self, cli_schema: Option<&'a str>) -> Option<&'a str> {
        cli_schema.or(self.validate.schema.as_deref())
    }
}
