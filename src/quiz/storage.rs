use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::quiz::{QuizError, Result};

/// Durable key-value store holding serialized records.
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

fn persistence_error(context: &str, err: std::io::Error) -> QuizError {
    QuizError::PersistenceFailure(format!("{}: {}", context, err))
}

/// One `<key>.json` file per record inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(persistence_error(&format!("reading {}", path.display()), err)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| persistence_error("creating storage dir", err))?;

        // Write next to the target and rename over it so readers only ever
        // see a complete record
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|err| persistence_error(&format!("writing {}", tmp.display()), err))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| persistence_error(&format!("replacing {}", path.display()), err))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(persistence_error(&format!("removing {}", path.display()), err)),
        }
    }
}

/// In-process store. `set_failing(true)` makes every call error out.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QuizError::PersistenceFailure(
                "memory storage is failing".to_string(),
            ));
        }
        Ok(())
    }

    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a usable map
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.records().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check()?;
        self.records().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.records().remove(key);
        Ok(())
    }
}

impl<S: Storage> Storage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_storage_round_trips_and_treats_absence_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("record").await.unwrap(), None);

        storage.set("record", "{\"a\":1}".to_string()).await.unwrap();
        storage.set("record", "{\"a\":2}".to_string()).await.unwrap();
        assert_eq!(
            storage.get("record").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(!dir.path().join("nested/record.json.tmp").exists());

        storage.remove("record").await.unwrap();
        storage.remove("record").await.unwrap();
        assert_eq!(storage.get("record").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_storage_can_be_made_to_fail() {
        let storage = MemoryStorage::new();
        storage.set("k", "v".to_string()).await.unwrap();

        storage.set_failing(true);
        assert!(matches!(
            storage.get("k").await,
            Err(QuizError::PersistenceFailure(_))
        ));
        assert!(storage.set("k", "w".to_string()).await.is_err());

        storage.set_failing(false);
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
