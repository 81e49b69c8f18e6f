use chrono::NaiveDate;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use worddrill_core::{
    keys, AttemptRecord, MemoryBackend, PhraseOutcome, PlayerStats, Quality, SessionMode,
    StorageBackend, StorageError, WordStateStore, ATTEMPT_LOG_CAP,
};
use worddrill_json::{ManualScheduler, ProfileStore};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

struct CountingBackend {
    inner: MemoryBackend,
    writes: AtomicU32,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            writes: AtomicU32::new(0),
        }
    }

    fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageBackend for CountingBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

struct FailingBackend;

impl StorageBackend for FailingBackend {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("backend down"))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend down"))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend down"))
    }
}

fn manual_profile(backend: Arc<dyn StorageBackend>) -> (ProfileStore, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let handle = scheduler.clone();
    let profile =
        ProfileStore::with_scheduler(backend, Box::new(scheduler), Duration::from_millis(500));
    (profile, handle)
}

#[test]
fn rapid_saves_coalesce_into_one_write() {
    let backend = Arc::new(CountingBackend::new());
    let (profile, scheduler) = manual_profile(Arc::clone(&backend) as Arc<dyn StorageBackend>);

    let mut words = WordStateStore::new();
    let mut stats = PlayerStats::default();
    for term in ["a", "b", "c"] {
        words.get_or_create(term, day());
        words.update(term, Quality::Good, day());
        stats.add_xp(10);
        profile.save(&words, &stats);
    }

    assert_eq!(scheduler.scheduled_count(), 3);
    assert_eq!(backend.writes(), 0);

    scheduler.fire();
    // one flush writes word_data and player_stats once each
    assert_eq!(backend.writes(), 2);

    // the flushed image is the latest one
    let loaded = profile.load();
    assert_eq!(loaded.words.len(), 3);
    assert_eq!(loaded.stats.total_xp, 30);

    // firing again does nothing, the pending image was consumed
    scheduler.fire();
    assert_eq!(backend.writes(), 2);
}

#[test]
fn save_sync_cancels_the_pending_write() {
    let backend = Arc::new(CountingBackend::new());
    let (profile, scheduler) = manual_profile(Arc::clone(&backend) as Arc<dyn StorageBackend>);

    let mut words = WordStateStore::new();
    let stats = PlayerStats::default();
    words.get_or_create("a", day());
    profile.save(&words, &stats);
    assert!(scheduler.has_pending());

    profile.save_sync(&words, &stats).unwrap();
    assert_eq!(scheduler.cancelled_count(), 1);
    assert_eq!(backend.writes(), 2);

    // the debounce timer firing later must not double-write
    scheduler.fire();
    assert_eq!(backend.writes(), 2);
}

#[test]
fn load_from_failing_backend_degrades_to_defaults() {
    let backend: Arc<dyn StorageBackend> = Arc::new(FailingBackend);
    let profile = ProfileStore::new(backend);

    let loaded = profile.load();
    assert!(loaded.words.is_empty());
    assert_eq!(loaded.stats, PlayerStats::default());
}

#[test]
fn debounced_flush_failure_is_swallowed() {
    let backend: Arc<dyn StorageBackend> = Arc::new(FailingBackend);
    let (profile, scheduler) = manual_profile(backend);

    let words = WordStateStore::new();
    let stats = PlayerStats::default();
    profile.save(&words, &stats);
    // flushing against a dead backend must not panic
    scheduler.fire();
}

#[test]
fn save_sync_surfaces_the_error() {
    let backend: Arc<dyn StorageBackend> = Arc::new(FailingBackend);
    let profile = ProfileStore::new(backend);

    let words = WordStateStore::new();
    let stats = PlayerStats::default();
    assert!(profile.save_sync(&words, &stats).is_err());
}

#[test]
fn attempt_log_keeps_the_most_recent_hundred() {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let profile = ProfileStore::new(Arc::clone(&backend));

    for i in 0..(ATTEMPT_LOG_CAP + 10) {
        let record = AttemptRecord::new(
            Some(format!("lesson-{i}")),
            SessionMode::Lesson,
            vec![PhraseOutcome {
                term: "a".to_string(),
                correct: true,
            }],
            30,
        );
        profile.push_attempt(record).unwrap();
    }

    let records = profile.recent_attempts();
    assert_eq!(records.len(), ATTEMPT_LOG_CAP);
    // the oldest ten were dropped
    assert_eq!(records[0].lesson.as_deref(), Some("lesson-10"));
    assert_eq!(
        records.last().unwrap().lesson.as_deref(),
        Some(format!("lesson-{}", ATTEMPT_LOG_CAP + 9).as_str())
    );
}

#[test]
fn corrupt_attempt_log_is_replaced() {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    backend.write(keys::ATTEMPT_LOG, "garbage").unwrap();

    let profile = ProfileStore::new(Arc::clone(&backend));
    assert!(profile.recent_attempts().is_empty());

    let record = AttemptRecord::new(None, SessionMode::Review, Vec::new(), 5);
    profile.push_attempt(record).unwrap();
    assert_eq!(profile.recent_attempts().len(), 1);
}
