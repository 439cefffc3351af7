// Bearer token storage. Mirrors the two browser local-storage keys the web client used.
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt token file: {0}")]
    CorruptStore(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub trait TokenStore: Send + Sync + 'static {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    fn store(&self, tokens: &AuthTokens) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;

    fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<AuthTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().as_ref().map(|t| t.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().as_ref().map(|t| t.refresh_token.clone())
    }

    fn store(&self, tokens: &AuthTokens) -> Result<(), SessionError> {
        *self.tokens.write() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.tokens.write() = None;
        Ok(())
    }
}

// JSON object of key -> string on disk, cached in memory after the first read
pub struct FileTokenStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileTokenStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)
                    .map_err(|e| SessionError::CorruptStore(format!("{}: {e}", path.display())))?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened token store at {}", path.display());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| SessionError::CorruptStore(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn store(&self, tokens: &AuthTokens) -> Result<(), SessionError> {
        let mut entries = self.entries.write();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), tokens.access_token.clone());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), tokens.refresh_token.clone());
        self.persist(&entries)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.entries.write();
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        if let Err(e) = self.persist(&entries) {
            warn!("Failed to clear token file {}: {e}", self.path.display());
            return Err(e);
        }
        Ok(())
    }
}
