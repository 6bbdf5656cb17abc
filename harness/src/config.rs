//! Planner configuration files.
//!
//! A configuration has three optional sections:
//!
//! ```toml
//! [search]      # SearchPolicy: budgets, branching, filters
//! expansion_time = 60
//! max_branching = 20
//!
//! [terminal]    # TerminalCriteria: what counts as a starting material
//! max_ppg = 100
//!
//! [paths]       # PathOptions: route extraction and ranking
//! sorting_metric = "number_of_reactions"
//! ```
//!
//! Files ending in `.toml` are read as TOML, `.json` as JSON. Every field
//! has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use retro_search::error::SearchError;
use retro_search::paths::PathOptions;
use retro_search::policy::SearchPolicy;
use retro_search::terminal::TerminalCriteria;

/// Failure loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {detail}")]
    Io { path: PathBuf, detail: String },
    /// The file is not valid for its format.
    #[error("cannot parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },
    /// Neither `.toml` nor `.json`.
    #[error("unsupported configuration format: {path}")]
    UnsupportedFormat { path: PathBuf },
    /// A value parsed but cannot be searched with.
    #[error(transparent)]
    Invalid(#[from] SearchError),
}

/// File format, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format implied by `path`'s extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read and deserialize `path` in the format its extension names.
///
/// # Errors
///
/// Returns [`ConfigError::Io`], [`ConfigError::Parse`], or
/// [`ConfigError::UnsupportedFormat`].
pub fn load_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    parse_document(&text, format).map_err(|detail| ConfigError::Parse {
        path: path.to_path_buf(),
        detail,
    })
}

fn parse_document<T: serde::de::DeserializeOwned>(
    text: &str,
    format: ConfigFormat,
) -> Result<T, String> {
    match format {
        ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    }
}

/// Everything the planner needs besides the target and the collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub search: SearchPolicy,
    pub terminal: TerminalCriteria,
    pub paths: PathOptions,
}

impl PlannerConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// See [`load_document`]; also [`ConfigError::Invalid`] for values the
    /// search rejects.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_document(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::from_str_as(text, ConfigFormat::Toml)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Self::from_str_as(text, ConfigFormat::Json)
    }

    fn from_str_as(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = parse_document(text, format).map_err(|detail| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            detail,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject search values the tree cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        Ok(())
    }
}
