// Client configuration: built-in defaults, overridable from the environment
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::ClientError;
use crate::session::{FileTokenStore, MemoryTokenStore, SessionError, TokenStore};

pub const BASE_URL_VAR: &str = "TRAVEL_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "TRAVEL_API_TIMEOUT_MS";
pub const DEBOUNCE_VAR: &str = "TRAVEL_SUGGEST_DEBOUNCE_MS";
pub const SUGGEST_TTL_VAR: &str = "TRAVEL_SUGGEST_TTL_SECONDS";
pub const TOKEN_PATH_VAR: &str = "TRAVEL_TOKEN_PATH";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub suggestion: SuggestionConfig,
    // None keeps tokens in memory only
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    pub debounce_ms: u64,
    pub ttl_seconds: u64,
    pub max_entries: usize,
    pub min_query_len: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            ttl_seconds: 60,
            max_entries: 256,
            min_query_len: 2,
        }
    }
}

impl SuggestionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 10_000,
            suggestion: SuggestionConfig::default(),
            token_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Split out so tests don't have to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup(BASE_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                info!("{BASE_URL_VAR} not set, using default: {}", defaults.base_url);
                defaults.base_url.clone()
            });
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            warn!("Rejecting base url {base_url}");
            return Err(ClientError::ConfigError(format!(
                "{BASE_URL_VAR} must be an http(s) url, got '{base_url}'"
            )));
        }

        let config = Self {
            base_url,
            timeout_ms: parse_or(&lookup, TIMEOUT_VAR, defaults.timeout_ms)?,
            suggestion: SuggestionConfig {
                debounce_ms: parse_or(&lookup, DEBOUNCE_VAR, defaults.suggestion.debounce_ms)?,
                ttl_seconds: parse_or(&lookup, SUGGEST_TTL_VAR, defaults.suggestion.ttl_seconds)?,
                ..defaults.suggestion
            },
            token_path: lookup(TOKEN_PATH_VAR)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        if config.timeout_ms == 0 {
            return Err(ClientError::ConfigError(format!(
                "{TIMEOUT_VAR} must be greater than zero"
            )));
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    // File-backed when a token path is configured, in-memory otherwise
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>, SessionError> {
        match &self.token_path {
            Some(path) => {
                info!("Persisting session tokens to {}", path.display());
                Ok(Arc::new(FileTokenStore::open(path.clone())?))
            }
            None => Ok(Arc::new(MemoryTokenStore::new())),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ClientError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            ClientError::ConfigError(format!("invalid {key} '{raw}': {e}"))
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
