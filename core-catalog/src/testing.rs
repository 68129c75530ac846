//! Test doubles for the storage collaborator

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::FileSystemAccess;
use bytes::Bytes;

/// `FileSystemAccess` backed by a map from path to bytes
#[derive(Debug)]
pub struct InMemoryFileSystem {
    root: PathBuf,
    files: Mutex<BTreeMap<PathBuf, Bytes>>,
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/station-data"),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every stored path, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().map(|files| files.keys().cloned().collect()).unwrap_or_default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().map(|files| files.contains_key(path)).unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<PathBuf, Bytes>>> {
        self.files
            .lock()
            .map_err(|_| BridgeError::OperationFailed("file map poisoned".to_string()))
    }
}

#[async_trait]
impl FileSystemAccess for InMemoryFileSystem {
    async fn get_data_directory(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    async fn save_file(&self, path: &Path, data: Bytes) -> Result<()> {
        self.lock()?.insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn load_file(&self, path: &Path) -> Result<Option<Bytes>> {
        Ok(self.lock()?.get(path).cloned())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        self.lock()?.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.lock()?.contains_key(path))
    }

    async fn list_names(&self, folder: &Path) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|path| path.parent() == Some(folder))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect())
    }
}
