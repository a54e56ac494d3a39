/// File system abstraction used by the resource loader threads.
///
/// Disk I/O itself is outside the resource subsystem: loader threads only
/// need "give me the bytes of this path". Two implementations are provided:
///
/// - **DiskFileSystem**: reads files below a root directory
/// - **MemoryFileSystem**: an in-memory table, used for embedded data and tests

use std::path::PathBuf;
use std::sync::RwLock;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::resource::ResourcePath;

// ===== TRAIT =====

/// Byte source for resource loading.
///
/// Called from loader threads, hence `Send + Sync`.
pub trait FileSystem: Send + Sync {
    /// Read the whole content of `path`
    fn read(&self, path: &ResourcePath) -> Result<Vec<u8>>;

    /// Whether `path` exists
    fn exists(&self, path: &ResourcePath) -> bool;
}

// ===== DISK =====

/// File system reading from a root directory on disk
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Create a disk file system rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn full_path(&self, path: &ResourcePath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

impl FileSystem for DiskFileSystem {
    fn read(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        std::fs::read(self.full_path(path)).map_err(|e| Error::io(path.as_str(), &e))
    }

    fn exists(&self, path: &ResourcePath) -> bool {
        self.full_path(path).is_file()
    }
}

// ===== MEMORY =====

/// In-memory file system
///
/// Files can be added or replaced at any time, also while loader threads
/// are reading.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: RwLock<FxHashMap<ResourcePath, Vec<u8>>>,
}

impl MemoryFileSystem {
    /// Create an empty in-memory file system
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&self, path: &str, data: impl Into<Vec<u8>>) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(ResourcePath::new(path), data.into());
    }

    /// Remove a file, returning its content
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.remove(&ResourcePath::new(path))
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no file is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::FileNotFound(path.as_str().to_string()))
    }

    fn exists(&self, path: &ResourcePath) -> bool {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(path)
    }
}

#[cfg(test)]
#[path = "file_system_tests.rs"]
mod tests;
