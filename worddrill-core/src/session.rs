use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshots older than this are discarded on load instead of resumed.
pub const SNAPSHOT_MAX_AGE_HOURS: i64 = 24;

/// How many attempt records the log retains.
pub const ATTEMPT_LOG_CAP: usize = 100;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Lesson,
    Review,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ItemResult {
    pub term: String,
    pub correct: bool,
    pub mistakes: u32,
    pub hint_used: bool,
}

/// One in-progress practice run. Ephemeral; the persisted form is
/// [`SessionSnapshot`].
#[derive(Clone, Debug)]
pub struct PracticeSession {
    pub mode: SessionMode,
    pub lesson: Option<String>,
    pub items: Vec<String>,
    pub current_index: usize,
    pub started_at: DateTime<Utc>,
    pub results: Vec<ItemResult>,
}

impl PracticeSession {
    pub fn new(mode: SessionMode, lesson: Option<String>, items: Vec<String>) -> Self {
        Self {
            mode,
            lesson,
            items,
            current_index: 0,
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    pub fn current_term(&self) -> Option<&str> {
        self.items.get(self.current_index).map(String::as_str)
    }

    pub fn record(&mut self, result: ItemResult) {
        self.results.push(result);
        self.current_index += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.items.len()
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        now.signed_duration_since(self.started_at)
            .num_seconds()
            .max(0) as u32
    }

    pub fn snapshot(&self, captured_at: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            lesson: self.lesson.clone(),
            items: self.items.clone(),
            current_index: self.current_index,
            started_at: self.started_at,
            results: self.results.clone(),
            captured_at,
        }
    }
}

/// Persisted mirror of a [`PracticeSession`], single slot, resumable
/// until it goes stale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub lesson: Option<String>,
    pub items: Vec<String>,
    pub current_index: usize,
    pub started_at: DateTime<Utc>,
    pub results: Vec<ItemResult>,
    pub captured_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.captured_at) > Duration::hours(SNAPSHOT_MAX_AGE_HOURS)
    }

    pub fn resume(self) -> PracticeSession {
        PracticeSession {
            mode: self.mode,
            lesson: self.lesson,
            items: self.items,
            current_index: self.current_index,
            started_at: self.started_at,
            results: self.results,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PhraseOutcome {
    pub term: String,
    pub correct: bool,
}

/// Summary of one completed session for the attempt log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub lesson: Option<String>,
    pub mode: SessionMode,
    pub phrases: Vec<PhraseOutcome>,
    pub duration_secs: u32,
}

impl AttemptRecord {
    pub fn new(
        lesson: Option<String>,
        mode: SessionMode,
        phrases: Vec<PhraseOutcome>,
        duration_secs: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            lesson,
            mode,
            phrases,
            duration_secs,
        }
    }
}
