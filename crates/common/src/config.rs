//! Configuration model for the `nsdk` binary.
//!
//! A configuration file is either JSON (`*.json`) or TOML (`*.toml`). Every
//! relative path inside it is resolved against the directory holding the file,
//! so the tool behaves the same whatever the current directory is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::is_identifier;

/// Errors raised while loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The JSON document is invalid.
    #[error("Failed to parse configuration file {path}: {source}")]
    Json {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// The TOML document is invalid.
    #[error("Failed to parse configuration file {path}: {source}")]
    Toml {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },
    /// The file extension is neither `.json` nor `.toml`.
    #[error("Unsupported configuration format for {0} (expected a .json or .toml file)")]
    UnsupportedFormat(PathBuf),
    /// A field holds an unusable value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// A substitute declaration for a type that has no portable standalone form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicType {
    /// Suffix of the declaring file path, compared without extension.
    pub source_file_suffix: String,
    /// Name of the substituted type.
    pub type_name: String,
    /// Declaration emitted instead of the real one.
    pub placeholder_content: String,
}

/// Configuration of one analyze/generate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Root directory of the API project to analyze.
    pub api_input_path: PathBuf,
    /// Directory the SDK is generated into.
    pub sdk_output: PathBuf,
    /// Script providing the central request handler of the SDK.
    pub config_script_path: PathBuf,
    /// Named export of the central script; the default export when unset.
    #[serde(default)]
    pub config_name_to_import: Option<String>,
    /// User-provided magic types, consulted before the builtin ones.
    #[serde(default)]
    pub magic_types: Vec<MagicType>,
    /// Where to write the SDK content as JSON after analysis.
    #[serde(default)]
    pub json_output: Option<PathBuf>,
    /// Pretty-print the JSON output.
    #[serde(default)]
    pub json_pretty_output: bool,
    /// Show debug logs.
    #[serde(default)]
    pub verbose: bool,
    /// Replace a previously generated SDK directory.
    #[serde(default)]
    pub remove_old_output_dir: bool,
}

impl Config {
    /// Load a configuration file and resolve its relative paths.
    ///
    /// The result is not validated yet, see [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let mut config: Self = match extension.as_deref() {
            Some("json") => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Some("toml") => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Make every relative path absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };

        self.api_input_path = resolve(&self.api_input_path);
        self.sdk_output = resolve(&self.sdk_output);
        self.config_script_path = resolve(&self.config_script_path);
        self.json_output = self.json_output.as_deref().map(resolve);
    }

    /// Check the values that the core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_input_path.is_dir() {
            return Err(ConfigError::Invalid {
                field: "apiInputPath",
                reason: format!("{} is not a directory", self.api_input_path.display()),
            });
        }

        if self.sdk_output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "sdkOutput",
                reason: "must not be empty".to_string(),
            });
        }

        if self.config_script_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "configScriptPath",
                reason: "must not be empty".to_string(),
            });
        }

        if let Some(name) = &self.config_name_to_import
            && !is_identifier(name)
        {
            return Err(ConfigError::Invalid {
                field: "configNameToImport",
                reason: format!("{name:?} is not a valid identifier"),
            });
        }

        if let Some(json_output) = &self.json_output {
            let parent_ok = json_output
                .parent()
                .is_none_or(|parent| parent.as_os_str().is_empty() || parent.is_dir());
            if !parent_ok {
                return Err(ConfigError::Invalid {
                    field: "jsonOutput",
                    reason: format!(
                        "parent directory of {} does not exist",
                        json_output.display()
                    ),
                });
            }
        }

        for (i, magic) in self.magic_types.iter().enumerate() {
            if magic.source_file_suffix.trim().is_empty() || magic.type_name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "magicTypes",
                    reason: format!("entry #{i} needs both a sourceFileSuffix and a typeName"),
                });
            }
        }

        Ok(())
    }
}
