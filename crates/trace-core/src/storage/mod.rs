//! Key-value storage backends for session state.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value store, the shape of browser `localStorage`.
///
/// Reads of a missing key return `Ok(None)`; removing a missing key is not an
/// error.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Read a value that must exist.
    fn require(&self, key: &str) -> StorageResult<String> {
        self.get(key)?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Store used by default on the current platform.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = FileStore;

/// Store used by default on the current platform.
#[cfg(target_arch = "wasm32")]
pub type PlatformStore = LocalStore;

/// Open the default store for this platform.
pub fn default_store() -> StorageResult<PlatformStore> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        FileStore::default_location()
    }
    #[cfg(target_arch = "wasm32")]
    {
        LocalStore::new()
    }
}
