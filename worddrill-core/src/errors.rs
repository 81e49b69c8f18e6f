use thiserror::Error;

/// Persistence failures. Callers above the storage layer treat these as
/// degradation signals, not fatal errors: a failed read falls back to
/// defaults, a failed write leaves the engine running in memory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(&'static str),
}
