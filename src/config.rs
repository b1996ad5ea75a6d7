//! Configuration loading.
//!
//! Sources are layered with `figment`, later layers winning:
//! built-in defaults < TOML file < environment < command-line flags.
//!
//! The environment is read both unprefixed for the conventional names
//! (`HUGGINGFACE_API_KEY`, `HUGGINGFACE_MODEL_ID`, `GITHUB_TOKEN`) and with
//! the `ISSUE_ASSISTANT_` prefix for every key.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cli_args::ServerArgs;
use crate::environment;
use crate::github::GITHUB_API_URL;
use crate::llm::{DEFAULT_LLM_BASE_URL, DEFAULT_MODEL_ID};

/// Prefix for namespaced environment variables.
pub const ENV_PREFIX: &str = "ISSUE_ASSISTANT_";

/// Variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "ISSUE_ASSISTANT_CONFIG_PATH";

/// File read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "issue-assistant.toml";

const UNPREFIXED_KEYS: &[&str] = &["huggingface_api_key", "huggingface_model_id", "github_token"];

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("HUGGINGFACE_API_KEY not set")]
    MissingApiKey,
    #[error("failed to read configuration: {0}")]
    Load(Box<figment::Error>),
    #[error("invalid bind address '{value}': {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

/// Raw, unvalidated view of every configuration source.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    huggingface_api_key: Option<String>,
    huggingface_model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    github_token: Option<String>,
    llm_base_url: String,
    github_api_url: String,
    bind: String,
    http_timeout: u64,
    llm_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            huggingface_api_key: None,
            huggingface_model_id: DEFAULT_MODEL_ID.to_owned(),
            github_token: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            github_api_url: GITHUB_API_URL.to_owned(),
            bind: DEFAULT_BIND.to_owned(),
            http_timeout: DEFAULT_HTTP_TIMEOUT_SECS,
            llm_timeout: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key for the completion endpoint.
    pub api_key: String,
    /// Model identifier sent with each completion request.
    pub model: String,
    /// Optional GitHub token; never empty when present.
    pub github_token: Option<String>,
    pub llm_base_url: String,
    pub github_api_url: String,
    pub bind: SocketAddr,
    /// Timeout applied to each GitHub request.
    pub http_timeout: Duration,
    /// Timeout applied to the completion request.
    pub llm_timeout: Duration,
}

impl Config {
    /// Configuration with every optional value at its default.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let defaults = Settings::default();
        Self {
            api_key: api_key.into(),
            model: defaults.huggingface_model_id,
            github_token: None,
            llm_base_url: defaults.llm_base_url,
            github_api_url: defaults.github_api_url,
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            http_timeout: Duration::from_secs(defaults.http_timeout),
            llm_timeout: Duration::from_secs(defaults.llm_timeout),
        }
    }

    /// Load configuration from every source, applying `args` last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when no source supplies a
    /// non-empty API key, [`ConfigError::Load`] when a source cannot be read
    /// or holds values of the wrong type, and [`ConfigError::InvalidBind`]
    /// when the bind address does not parse.
    pub fn load(args: &ServerArgs) -> Result<Self, ConfigError> {
        let path = config_path(args);
        let settings: Settings = environment::with_lock(|| {
            Figment::from(Serialized::defaults(Settings::default()))
                .merge(Toml::file(&path))
                .merge(Env::raw().only(UNPREFIXED_KEYS))
                .merge(Env::prefixed(ENV_PREFIX))
                .merge(Serialized::defaults(args))
                .extract()
        })
        .map_err(|e| ConfigError::Load(Box::new(e)))?;
        Self::try_from(settings)
    }
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let api_key = settings
            .huggingface_api_key
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let bind = settings
            .bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBind {
                value: settings.bind.clone(),
                source,
            })?;
        Ok(Self {
            api_key,
            model: settings.huggingface_model_id,
            github_token: settings.github_token.filter(|token| !token.is_empty()),
            llm_base_url: settings.llm_base_url,
            github_api_url: settings.github_api_url,
            bind,
            http_timeout: Duration::from_secs(settings.http_timeout),
            llm_timeout: Duration::from_secs(settings.llm_timeout),
        })
    }
}

fn config_path(args: &ServerArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(|| environment::non_empty_var(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
