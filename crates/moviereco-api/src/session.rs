//! Session credential storage.
//!
//! The backend session lives in a string-only key/value store under the
//! fixed keys [`TOKEN_KEY`], [`REFRESH_TOKEN_KEY`] and [`USER_KEY`]. Front
//! ends read the same keys to decide whether the user is signed in.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use serde_json::Value;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key holding the signed-in user record as JSON.
pub const USER_KEY: &str = "user";

/// String-only key/value storage for session credentials.
#[allow(clippy::module_name_repetitions)]
pub trait SessionStore: Debug + Send + Sync {
    /// Returns the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-process session store.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct MemorySessionStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(String::from(key), String::from(value));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Session store persisted as a flat TOML table.
///
/// Every mutation rewrites the file, so a crash never loses a stored token.
/// A mutation whose write fails leaves the in-memory table unchanged.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FileSessionStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Opens the store at `path`. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current table to disk, creating parent directories.
    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string(items).context("failed to serialize session to TOML")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl SessionStore for FileSessionStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = items.clone();
        next.insert(String::from(key), String::from(value));
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }
}

/// Typed view over a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session backed by a fresh [`MemorySessionStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Stored bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.get_item(TOKEN_KEY)
    }

    /// Stored refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get_item(REFRESH_TOKEN_KEY)
    }

    /// Stored user record. A value that is not valid JSON reads as absent.
    #[must_use]
    pub fn user(&self) -> Option<Value> {
        self.store
            .get_item(USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Whether a bearer token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Stores a new bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set_item(TOKEN_KEY, token)
    }

    /// Stores a new refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.store.set_item(REFRESH_TOKEN_KEY, token)
    }

    /// Stores the user record as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_user(&self, user: &Value) -> Result<()> {
        self.store.set_item(USER_KEY, &user.to_string())
    }

    /// Removes both tokens, keeping the user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_tokens(&self) -> Result<()> {
        self.store.remove_item(TOKEN_KEY)?;
        self.store.remove_item(REFRESH_TOKEN_KEY)
    }

    /// Removes every session key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<()> {
        self.clear_tokens()?;
        self.store.remove_item(USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        // Arrange
        let store = MemorySessionStore::new();

        // Act
        store.set_item(TOKEN_KEY, "abc").unwrap();
        let before = store.get_item(TOKEN_KEY);
        store.remove_item(TOKEN_KEY).unwrap();
        let after = store.get_item(TOKEN_KEY);

        // Assert
        assert_eq!(before.as_deref(), Some("abc"));
        assert!(after.is_none());
    }

    #[test]
    fn test_session_user_roundtrip_through_json() {
        // Arrange
        let session = Session::in_memory();
        let user = serde_json::json!({"id": 7, "username": "neo"});

        // Act
        session.set_user(&user).unwrap();

        // Assert
        assert_eq!(session.user(), Some(user));
    }

    #[test]
    fn test_clear_tokens_keeps_user() {
        // Arrange
        let session = Session::in_memory();
        session.set_token("t").unwrap();
        session.set_refresh_token("r").unwrap();
        session.set_user(&serde_json::json!({"id": 1})).unwrap();

        // Act
        session.clear_tokens().unwrap();

        // Assert
        assert!(!session.is_authenticated());
        assert!(session.refresh_token().is_none());
        assert!(session.user().is_some());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();

        // Act
        let store = FileSessionStore::open(dir.path().join("session.toml")).unwrap();

        // Assert
        assert!(store.get_item(TOKEN_KEY).is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");
        let store = FileSessionStore::open(&path).unwrap();

        // Act
        store.set_item(TOKEN_KEY, "persisted").unwrap();
        store.set_item(REFRESH_TOKEN_KEY, "refresh").unwrap();
        store.remove_item(REFRESH_TOKEN_KEY).unwrap();
        let reopened = FileSessionStore::open(&path).unwrap();

        // Assert
        assert_eq!(reopened.get_item(TOKEN_KEY).as_deref(), Some("persisted"));
        assert!(reopened.get_item(REFRESH_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_file_store_failed_write_keeps_memory_unchanged() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = FileSessionStore::open(blocker.join("session.toml")).unwrap();

        // Act
        let result = store.set_item(TOKEN_KEY, "never-written");

        // Assert
        assert!(result.is_err());
        assert!(store.get_item(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_file_store_failed_remove_keeps_value() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let store = FileSessionStore::open(&path).unwrap();
        store.set_item(TOKEN_KEY, "kept").unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        // Act
        let result = store.remove_item(TOKEN_KEY);

        // Assert
        assert!(result.is_err());
        assert_eq!(store.get_item(TOKEN_KEY).as_deref(), Some("kept"));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        // Act
        let result = FileSessionStore::open(&path);

        // Assert
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("failed to parse"));
    }
}
