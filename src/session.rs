// src/session.rs

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{config::SESSION_KEY, error::AppError, models::session::Session};

/// Local key-value secure storage.
///
/// On device this is backed by the platform keystore; the crate ships a file-backed
/// and an in-memory implementation.
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn delete_item(&self, key: &str) -> Result<(), AppError>;
}

/// One file per key inside a private directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(AppError::Storage(format!("invalid storage key {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl SecureStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write-then-rename so a crash never leaves a half-written record
        let tmp = self.dir.join(format!(".{}.tmp", key));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.items().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<(), AppError> {
        self.items().remove(key);
        Ok(())
    }
}

/// Reads and writes the serialized session record; gates every authenticated screen.
#[derive(Clone)]
pub struct SessionAccessor {
    store: Arc<dyn SecureStore>,
}

impl SessionAccessor {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    /// The stored session, if any. A record that no longer parses is discarded.
    pub async fn load(&self) -> Result<Option<Session>, AppError> {
        let Some(raw) = self.store.get_item(SESSION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session record: {}", e);
                self.store.delete_item(SESSION_KEY).await?;
                Ok(None)
            }
        }
    }

    /// Like [`SessionAccessor::load`], but a missing session is `Unauthenticated`.
    pub async fn require(&self) -> Result<Session, AppError> {
        self.load().await?.ok_or(AppError::Unauthenticated)
    }

    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        let raw = serde_json::to_string(session)?;
        self.store.set_item(SESSION_KEY, &raw).await
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.store.delete_item(SESSION_KEY).await
    }
}

impl std::fmt::Debug for SessionAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAccessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            email: "rina@kampus.ac.id".into(),
            name: "Rina".into(),
            token: Some("tok".into()),
            avatar: None,
            tahun_ajaran: Some("2024/2025".into()),
        }
    }

    #[tokio::test]
    async fn missing_session_is_unauthenticated() {
        let accessor = SessionAccessor::new(Arc::new(MemoryStore::new()));
        assert_eq!(accessor.load().await.unwrap(), None);
        assert_eq!(accessor.require().await.unwrap_err(), AppError::Unauthenticated);
    }

    #[tokio::test]
    async fn save_load_clear() {
        let accessor = SessionAccessor::new(Arc::new(MemoryStore::new()));
        accessor.save(&session()).await.unwrap();
        assert_eq!(accessor.require().await.unwrap(), session());

        accessor.clear().await.unwrap();
        assert_eq!(accessor.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_record_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(SESSION_KEY, "{not json").await.unwrap();

        let accessor = SessionAccessor::new(store.clone());
        assert_eq!(accessor.load().await.unwrap(), None);
        assert_eq!(store.get_item(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = std::env::temp_dir().join(format!("lms-store-{}", &uuid::Uuid::new_v4().to_string()[..8]));

        FileStore::new(&dir).set_item(SESSION_KEY, "{}").await.unwrap();
        let reopened = FileStore::new(&dir);
        assert_eq!(reopened.get_item(SESSION_KEY).await.unwrap().as_deref(), Some("{}"));

        reopened.delete_item(SESSION_KEY).await.unwrap();
        reopened.delete_item(SESSION_KEY).await.unwrap();
        assert_eq!(reopened.get_item(SESSION_KEY).await.unwrap(), None);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn file_store_rejects_path_keys() {
        let store = FileStore::new(std::env::temp_dir());
        assert!(matches!(
            store.get_item("../etc/passwd").await,
            Err(AppError::Storage(_))
        ));
    }
}
