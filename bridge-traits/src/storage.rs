//! Storage Abstraction
//!
//! Byte-oriented local storage used to persist station metadata, catalog
//! snapshots, the pending-delete ledger and staged media payloads.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File system access trait
///
/// Abstracts the handful of file operations the core needs so that hosts can
/// back them with a real directory tree, a sandboxed app container or an
/// in-memory map in tests.
///
/// All paths handed to an implementation are produced by the core from the
/// directory returned by [`FileSystemAccess::get_data_directory`].
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn persist(fs: &dyn FileSystemAccess, data: &[u8]) -> Result<()> {
///     let path = fs.get_data_directory().await?.join("index.json");
///     fs.save_file(&path, Bytes::copy_from_slice(data)).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Get the application's data directory
    ///
    /// This directory is suitable for persistent application data.
    async fn get_data_directory(&self) -> Result<PathBuf>;

    /// Write data to a file, creating it and its parent directories if needed
    async fn save_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Read an entire file
    ///
    /// Returns `Ok(None)` if the file does not exist.
    async fn load_file(&self, path: &Path) -> Result<Option<Bytes>>;

    /// Delete a file
    ///
    /// Deleting a file that does not exist is not an error.
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Check if a file exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// List the names (not full paths) of the files inside a folder
    ///
    /// Returns an empty list if the folder does not exist.
    async fn list_names(&self, folder: &Path) -> Result<Vec<String>>;
}
