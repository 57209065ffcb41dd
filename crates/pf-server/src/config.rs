//! Server and generator configuration.
//!
//! Everything is read through a lookup function so the binary can pass the
//! process environment and tests can pass a fixed map.

use crate::prompts::DESCRIBE_PORTRAIT_PROMPT;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const API_URL_VAR: &str = "PF_API_URL";
pub const MODEL_VAR: &str = "PF_MODEL";
pub const MAX_TOKENS_VAR: &str = "PF_MAX_TOKENS";
pub const UPSTREAM_TIMEOUT_VAR: &str = "PF_UPSTREAM_TIMEOUT_SECS";
pub const BIND_VAR: &str = "PF_BIND";

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything the description generator needs, injected at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Bearer credential for the upstream API. Blank means unset.
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    /// Upper bound for one upstream call.
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DESCRIBE_PORTRAIT_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Read generator settings. A missing key is not an error here; it
    /// fails each description request instead.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup(API_KEY_VAR).unwrap_or_default());
        if let Some(url) = lookup(API_URL_VAR) {
            config.api_url = url;
        }
        if let Some(model) = lookup(MODEL_VAR) {
            config.model = model;
        }
        if let Some(value) = lookup(MAX_TOKENS_VAR) {
            config.max_tokens = parse_var(MAX_TOKENS_VAR, &value)?;
        }
        if let Some(value) = lookup(UPSTREAM_TIMEOUT_VAR) {
            config.timeout = Duration::from_secs(parse_var(UPSTREAM_TIMEOUT_VAR, &value)?);
        }
        Ok(config)
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<unset>" })
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub generator: GeneratorConfig,
}

impl ServerConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        Ok(Self {
            bind: parse_var(BIND_VAR, &bind)?,
            generator: GeneratorConfig::from_lookup(lookup)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}
