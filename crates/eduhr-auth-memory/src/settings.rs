//! Settings record stores.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use eduhr_auth::settings::SettingsRecord;
use eduhr_auth::storage::{SettingsStore, StoreError, StoreResult};

/// Settings record kept in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    record: RwLock<SettingsRecord>,
}

impl MemorySettingsStore {
    /// Creates a store holding `record`.
    pub fn new(record: SettingsRecord) -> Self {
        Self {
            record: RwLock::new(record),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> StoreResult<SettingsRecord> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &SettingsRecord) -> StoreResult<()> {
        *self.record.write().await = record.clone();
        Ok(())
    }
}

/// Settings record persisted as a JSON file.
///
/// A missing file reads as the default record. Saves write a sibling
/// temporary file and rename it over the target.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Creates a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `record` only when no file exists yet.
    ///
    /// Returns `true` if the file was written.
    pub async fn seed(&self, record: &SettingsRecord) -> StoreResult<bool> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::backend(format!("{}: {e}", self.path.display())))?
        {
            return Ok(false);
        }
        self.save(record).await?;
        Ok(true)
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> StoreResult<SettingsRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SettingsRecord::default()),
            Err(e) => {
                return Err(StoreError::backend(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::backend(format!("Invalid settings file {}: {e}", self.path.display()))
        })
    }

    async fn save(&self, record: &SettingsRecord) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::backend(format!("Failed to serialize settings: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::backend(format!("{}: {e}", parent.display())))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            StoreError::backend(format!("Failed to replace {}: {e}", self.path.display()))
        })?;

        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SettingsRecord {
        SettingsRecord {
            identity_provider_library_path: Some("/opt/ssp/_autoload.php".to_string()),
            service_identifier: Some("fedlab-sp".to_string()),
            auto_create_users: true,
            allowed_realms: "srce.hr".to_string(),
            bypass_secret: None,
        }
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySettingsStore::default();
        assert_eq!(store.load().await.unwrap(), SettingsRecord::default());

        store.save(&record()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), record());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join("settings.json"));

        assert_eq!(store.load().await.unwrap(), SettingsRecord::default());

        store.save(&record()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), record());
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_seed_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"));

        assert!(store.seed(&record()).await.unwrap());
        assert!(!store.seed(&SettingsRecord::default()).await.unwrap());
        assert_eq!(store.load().await.unwrap(), record());
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSettingsStore::new(path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
