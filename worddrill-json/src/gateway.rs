use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use worddrill_core::{
    keys, AttemptRecord, PlayerStats, StorageBackend, StorageError, WordState, WordStateStore,
    ATTEMPT_LOG_CAP,
};

use crate::debounce::{SaveScheduler, TimerScheduler};

/// Quiet period before a scheduled profile write lands.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

const WORD_FILE_VERSION: u32 = 1;
const ATTEMPT_LOG_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct WordFileImage {
    version: u32,
    updated_at: DateTime<Utc>,
    words: BTreeMap<String, WordState>,
}

#[derive(Serialize, Deserialize)]
struct AttemptLogImage {
    version: u32,
    records: Vec<AttemptRecord>,
}

/// Serialized profile captured at save time. Capturing up front makes
/// rapid saves coalesce last-writer-wins without borrowing the live
/// stores from the timer thread.
#[derive(Clone)]
struct ProfileImage {
    words: String,
    stats: String,
}

pub struct LoadedProfile {
    pub words: WordStateStore,
    pub stats: PlayerStats,
}

/// Durable read/write of word state and player progress.
///
/// `save` debounces and coalesces; `save_sync` cancels any pending
/// write and flushes immediately (the exit path). `load` is
/// best-effort: missing or malformed data comes back as defaults, with
/// a warning, never an error. The attempt log rides along on its own
/// key as a bounded ring.
pub struct ProfileStore {
    backend: Arc<dyn StorageBackend>,
    scheduler: Mutex<Box<dyn SaveScheduler>>,
    pending: Arc<Mutex<Option<ProfileImage>>>,
    debounce: Duration,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_scheduler(backend, Box::new(TimerScheduler::new()), SAVE_DEBOUNCE)
    }

    pub fn with_scheduler(
        backend: Arc<dyn StorageBackend>,
        scheduler: Box<dyn SaveScheduler>,
        debounce: Duration,
    ) -> Self {
        Self {
            backend,
            scheduler: Mutex::new(scheduler),
            pending: Arc::new(Mutex::new(None)),
            debounce,
        }
    }

    pub fn load(&self) -> LoadedProfile {
        let words = match self.read_words() {
            Ok(Some(words)) => words,
            Ok(None) => WordStateStore::new(),
            Err(err) => {
                warn!(error = %err, "failed to load word data, starting empty");
                WordStateStore::new()
            }
        };
        let stats = match self.read_stats() {
            Ok(Some(stats)) => stats,
            Ok(None) => PlayerStats::default(),
            Err(err) => {
                warn!(error = %err, "failed to load player stats, using defaults");
                PlayerStats::default()
            }
        };
        LoadedProfile { words, stats }
    }

    /// Schedules a coalesced write of the given profile after the quiet
    /// period. Fire-and-forget: failures surface as warnings from the
    /// flush, and the engine keeps running on its in-memory state.
    pub fn save(&self, words: &WordStateStore, stats: &PlayerStats) {
        let image = match capture(words, stats) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "failed to serialize profile, skipping save");
                return;
            }
        };
        *self.pending.lock() = Some(image);
        let backend = Arc::clone(&self.backend);
        let pending = Arc::clone(&self.pending);
        self.scheduler.lock().schedule(
            self.debounce,
            Box::new(move || flush_pending(&*backend, &pending)),
        );
    }

    /// Cancels any pending debounced write and flushes immediately.
    pub fn save_sync(
        &self,
        words: &WordStateStore,
        stats: &PlayerStats,
    ) -> Result<(), StorageError> {
        self.scheduler.lock().cancel();
        self.pending.lock().take();
        let image = capture(words, stats)?;
        write_image(&*self.backend, &image)
    }

    /// Appends one attempt summary, trimming the log to the most recent
    /// entries. A corrupt log is replaced rather than recovered.
    pub fn push_attempt(&self, record: AttemptRecord) -> Result<(), StorageError> {
        let mut records = self.read_attempts().unwrap_or_else(|err| {
            warn!(error = %err, "failed to load attempt log, starting fresh");
            Vec::new()
        });
        records.push(record);
        if records.len() > ATTEMPT_LOG_CAP {
            let excess = records.len() - ATTEMPT_LOG_CAP;
            records.drain(0..excess);
        }
        let image = AttemptLogImage {
            version: ATTEMPT_LOG_VERSION,
            records,
        };
        let raw = serde_json::to_string_pretty(&image)?;
        self.backend.write(keys::ATTEMPT_LOG, &raw)
    }

    pub fn recent_attempts(&self) -> Vec<AttemptRecord> {
        self.read_attempts().unwrap_or_else(|err| {
            warn!(error = %err, "failed to load attempt log");
            Vec::new()
        })
    }

    fn read_words(&self) -> Result<Option<WordStateStore>, StorageError> {
        let Some(raw) = self.backend.read(keys::WORD_DATA)? else {
            return Ok(None);
        };
        let image: WordFileImage = serde_json::from_str(&raw)?;
        Ok(Some(WordStateStore::from_words(
            image.words.into_iter().collect(),
        )))
    }

    fn read_stats(&self) -> Result<Option<PlayerStats>, StorageError> {
        let Some(raw) = self.backend.read(keys::PLAYER_STATS)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn read_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let Some(raw) = self.backend.read(keys::ATTEMPT_LOG)? else {
            return Ok(Vec::new());
        };
        let image: AttemptLogImage = serde_json::from_str(&raw)?;
        Ok(image.records)
    }
}

fn capture(words: &WordStateStore, stats: &PlayerStats) -> Result<ProfileImage, StorageError> {
    let image = WordFileImage {
        version: WORD_FILE_VERSION,
        updated_at: Utc::now(),
        words: words
            .iter()
            .map(|(term, state)| (term.clone(), state.clone()))
            .collect(),
    };
    Ok(ProfileImage {
        words: serde_json::to_string_pretty(&image)?,
        stats: serde_json::to_string_pretty(stats)?,
    })
}

fn write_image(backend: &dyn StorageBackend, image: &ProfileImage) -> Result<(), StorageError> {
    backend.write(keys::WORD_DATA, &image.words)?;
    backend.write(keys::PLAYER_STATS, &image.stats)
}

fn flush_pending(backend: &dyn StorageBackend, pending: &Mutex<Option<ProfileImage>>) {
    let Some(image) = pending.lock().take() else {
        return;
    };
    if let Err(err) = write_image(backend, &image) {
        warn!(error = %err, "debounced profile save failed, keeping in-memory state");
    }
}
