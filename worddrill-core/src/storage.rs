use crate::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage keys. One key per independent writer so they never clobber
/// each other; no transaction spans keys.
pub mod keys {
    pub const WORD_DATA: &str = "word_data";
    pub const PLAYER_STATS: &str = "player_stats";
    pub const ATTEMPT_LOG: &str = "attempt_log";
    pub const ACTIVE_SESSION: &str = "active_session";
}

/// Key-value persistence seam. Values are serialized JSON documents;
/// `read` of a missing key is `Ok(None)`, `remove` of a missing key is
/// `Ok(())`.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend for tests and for degraded operation when the
/// real store cannot be opened.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
