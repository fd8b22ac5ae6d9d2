//! Durable client storage for the REPL session
//!
//! History and display preferences survive reloads. `FileStore` keeps them
//! as one JSON document; `MemoryStore` is for tests and ephemeral sessions.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commands::{ColorMode, ParticleLevel};

/// Display preferences set by `theme`, `mode` and `particles`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub mode: Option<ColorMode>,
    #[serde(default)]
    pub particles: Option<ParticleLevel>,
}

/// Everything persisted between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store format: {0}")]
    Format(#[from] serde_json::Error),
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<StoredSession, StoreError>;
    fn save(&self, session: &StoredSession) -> Result<(), StoreError>;
}

/// JSON file on disk
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<StoredSession, StoreError> {
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoredSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn snapshot(&self) -> StoredSession {
        self.inner.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<StoredSession, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = session.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("nested/session.json"));
        assert_eq!(store.load().unwrap(), StoredSession::default());

        let session = StoredSession {
            history: vec!["ls".to_string(), "help".to_string()],
            preferences: Preferences {
                theme: Some("nord".to_string()),
                mode: Some(ColorMode::Light),
                particles: Some(ParticleLevel::Off),
            },
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::new(path).load(), Err(StoreError::Format(_))));
    }

    #[test]
    fn test_partial_document_defaults() {
        let session: StoredSession = serde_json::from_str(r#"{"history": ["pwd"]}"#).unwrap();
        assert_eq!(session.history, vec!["pwd"]);
        assert_eq!(session.preferences, Preferences::default());
    }
}
