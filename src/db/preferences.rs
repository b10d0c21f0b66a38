//! Storage backends for the user's dashboard preferences.
//!
//! The whole preference document is read and written as one JSON value.
use redis::AsyncCommands;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::UserPreferences,
};

/// Redis key holding the preference document
pub const PREFERENCES_KEY: &str = "prefs:dashboard";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Stored preferences, `None` when nothing has been saved yet.
    /// A malformed document is an error.
    async fn load(&self) -> AppResult<Option<UserPreferences>>;

    async fn save(&self, prefs: &UserPreferences) -> AppResult<()>;

    fn name(&self) -> &'static str;
}

/// Preferences kept in a JSON file
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl PreferencesStore for FileStore {
    async fn load(&self) -> AppResult<Option<UserPreferences>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let prefs = serde_json::from_str(&content)?;
        Ok(Some(prefs))
    }

    async fn save(&self, prefs: &UserPreferences) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(prefs)?;

        // Write then rename so a crash never leaves a truncated document
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Preferences kept under a single Redis key
pub struct RedisStore {
    client: redis::Client,
    key: String,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            key: PREFERENCES_KEY.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PreferencesStore for RedisStore {
    async fn load(&self) -> AppResult<Option<UserPreferences>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(&self.key).await?;

        match stored {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, prefs: &UserPreferences) -> AppResult<()> {
        let json = serde_json::to_string(prefs)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(&self.key, json).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Process-local store, used when nothing should touch disk
#[derive(Default)]
pub struct MemoryStore {
    prefs: RwLock<Option<UserPreferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(prefs: UserPreferences) -> Self {
        Self {
            prefs: RwLock::new(Some(prefs)),
        }
    }

    /// Last saved document
    pub async fn snapshot(&self) -> Option<UserPreferences> {
        self.prefs.read().await.clone()
    }
}

#[async_trait::async_trait]
impl PreferencesStore for MemoryStore {
    async fn load(&self) -> AppResult<Option<UserPreferences>> {
        Ok(self.prefs.read().await.clone())
    }

    async fn save(&self, prefs: &UserPreferences) -> AppResult<()> {
        *self.prefs.write().await = Some(prefs.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentId, Layout};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("prefs.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("prefs.json"));

        let mut prefs = UserPreferences::new();
        prefs.layout = Layout::List;
        prefs.content_order = vec![ContentId::from("3"), ContentId::from("1")];
        store.save(&prefs).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(prefs));
        assert!(!dir.path().join("nested").join("prefs.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_malformed_document_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.load().await, Err(AppError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        let prefs = UserPreferences::new();
        store.save(&prefs).await.unwrap();
        assert_eq!(store.snapshot().await, Some(prefs));
    }
}
