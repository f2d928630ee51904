//! Session management for authentication

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Session data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token issued at login
    pub access_token: String,
}

/// Claims read from the token payload. The signature is not checked;
/// the backend is the only party that trusts these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Decodes the JWT payload, if the token is a JWT.
    pub fn claims(&self) -> Option<Claims> {
        let payload = self.access_token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Check if the session has expired. Opaque tokens never expire
    /// client-side.
    pub fn is_expired(&self) -> bool {
        match self.claims().and_then(|c| c.exp) {
            Some(exp) => chrono::Utc::now().timestamp() >= exp,
            None => false,
        }
    }

    pub fn subject(&self) -> Option<String> {
        self.claims().and_then(|c| c.sub)
    }

    /// Storage form of the token: a JSON string.
    pub(crate) fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.access_token)?)
    }

    pub(crate) fn decode(raw: &str) -> Result<Self> {
        let token: String = serde_json::from_str(raw)?;
        Ok(Self::new(token))
    }
}

/// String key/value persistence for the session, shaped like browser
/// local storage.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Process-local storage; lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}

/// Keeps all items in one JSON object file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, items: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(Error::storage)?;
            }
        }
        let json = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            Error::storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        if items.remove(key).is_some() {
            self.save(&items).await?;
        }
        Ok(())
    }
}
