use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;
use worddrill_core::{keys, PracticeSession, SessionSnapshot, StorageBackend, StorageError};

/// Single-slot store for the in-progress session. Saving stamps the
/// capture time and overwrites whatever was there; loading applies the
/// 24-hour staleness rule lazily and clears expired or malformed slots.
pub struct SnapshotStore {
    backend: Arc<dyn StorageBackend>,
}

impl SnapshotStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn save(&self, session: &PracticeSession, now: DateTime<Utc>) -> Result<(), StorageError> {
        let snapshot = session.snapshot(now);
        let raw = serde_json::to_string_pretty(&snapshot)?;
        self.backend.write(keys::ACTIVE_SESSION, &raw)
    }

    /// Returns the resumable snapshot, or `None` when the slot is
    /// empty, unreadable, malformed, or stale. Anything unusable is
    /// cleared so the next load starts clean.
    pub fn load(&self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        let raw = match self.backend.read(keys::ACTIVE_SESSION) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read session snapshot");
                return None;
            }
        };
        let snapshot: SessionSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "malformed session snapshot, discarding");
                self.clear();
                return None;
            }
        };
        if snapshot.is_stale(now) {
            self.clear();
            return None;
        }
        Some(snapshot)
    }

    pub fn clear(&self) {
        if let Err(err) = self.backend.remove(keys::ACTIVE_SESSION) {
            warn!(error = %err, "failed to clear session snapshot");
        }
    }

    pub fn has_active(&self, now: DateTime<Utc>) -> bool {
        match self.backend.read(keys::ACTIVE_SESSION) {
            Ok(Some(raw)) => serde_json::from_str::<SessionSnapshot>(&raw)
                .map(|snapshot| !snapshot.is_stale(now))
                .unwrap_or(false),
            _ => false,
        }
    }
}
