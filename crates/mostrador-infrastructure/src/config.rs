//! Application configuration loaded from `~/.config/mostrador/config.toml`.
//!
//! Values are layered: defaults, then the file, then environment variables.
//! Command-line flags are applied last by the binary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mostrador_core::session::DEFAULT_MAX_MESSAGES;
use mostrador_core::store_info::StoreInfo;
use mostrador_core::{MostradorError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::paths::MostradorPaths;

pub const DEFAULT_MODEL: &str = "prueba";
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_CATALOG_PATH: &str = "data/products_asos.csv";

pub const ENV_MODEL: &str = "MODELO";
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_CATALOG: &str = "MOSTRADOR_CATALOG";

/// How tool calls are detected on each turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// The model decides, through native tool calls or raw-text calls
    #[default]
    Model,
    /// Deterministic keyword rules; the model only phrases answers
    Rules,
}

impl FromStr for DetectionMode {
    type Err = MostradorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" | "modelo" => Ok(Self::Model),
            "rules" | "reglas" => Ok(Self::Rules),
            other => Err(MostradorError::config(format!(
                "unknown detection mode '{}' (expected 'model' or 'rules')",
                other
            ))),
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Rules => write!(f, "rules"),
        }
    }
}

/// Root of `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model name passed to the chat backend
    pub model: String,
    pub ollama_host: String,
    pub catalog_path: PathBuf,
    pub detection: DetectionMode,
    /// Start with an empty catalog instead of exiting when it cannot be loaded
    pub allow_empty_catalog: bool,
    /// Non-system messages kept in the conversation history
    pub max_history_messages: usize,
    /// Per-request timeout for the model backend; no timeout when unset
    pub request_timeout_secs: Option<u64>,
    /// Print a trace line for every executed tool call
    pub show_tool_calls: bool,
    pub store: StoreInfo,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            detection: DetectionMode::default(),
            allow_empty_catalog: false,
            max_history_messages: DEFAULT_MAX_MESSAGES,
            request_timeout_secs: None,
            show_tool_calls: true,
            store: StoreInfo::default(),
        }
    }
}

impl AppConfig {
    /// Parses a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, "config.toml")
    }

    /// Blank text means defaults; `origin` names the source in error messages.
    fn parse(content: &str, origin: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(content).map_err(|e| MostradorError::config(format!("invalid {}: {}", origin, e)))
    }

    /// Loads the config file at `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content, &path.display().to_string())?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads `path` when given, otherwise the default config file, then
    /// applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match MostradorPaths::config_file() {
                Ok(default_path) => Self::load_from(&default_path)?,
                Err(e) => {
                    debug!(error = %e, "Config directory unavailable, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `MODELO`, `OLLAMA_HOST` and `MOSTRADOR_CATALOG`.
    ///
    /// `lookup` is injected so tests do not depend on the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_blank(ENV_MODEL) {
            self.model = model;
        }
        if let Some(host) = non_blank(ENV_OLLAMA_HOST) {
            self.ollama_host = normalize_host(&host);
        }
        if let Some(catalog) = non_blank(ENV_CATALOG) {
            self.catalog_path = PathBuf::from(catalog);
        }
    }
}

/// `OLLAMA_HOST` is often set without a scheme (`0.0.0.0:11434`).
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
