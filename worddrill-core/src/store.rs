use crate::{apply_review, CharacterState, Quality, ReviewOutcome, WordState, MASTERY_MAX};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Review gap in days after a character practice, indexed by level.
pub const CHAR_REVIEW_GAPS: [u32; 6] = [1, 2, 3, 5, 10, 20];

/// Word-level learning state, keyed by the word text. Owned explicitly
/// by the caller and passed by reference; mutations never touch storage
/// themselves, the caller schedules persistence after updating.
#[derive(Debug, Default)]
pub struct WordStateStore {
    words: HashMap<String, WordState>,
}

impl WordStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words(words: HashMap<String, WordState>) -> Self {
        Self { words }
    }

    /// Lazily creates default state on first access. The default is not
    /// persisted until the next flush.
    pub fn get_or_create(&mut self, term: &str, today: NaiveDate) -> &WordState {
        self.words
            .entry(term.to_string())
            .or_insert_with(|| WordState::new(today))
    }

    pub fn peek(&self, term: &str) -> Option<&WordState> {
        self.words.get(term)
    }

    /// Mastery score, 0 for words never seen.
    pub fn score(&self, term: &str) -> u8 {
        self.words.get(term).map(|s| s.mastery_score).unwrap_or(0)
    }

    /// Applies one review. Updating a term that was never created is a
    /// silent no-op; lazy creation means this only happens on caller
    /// bugs, and losing one grade beats crashing a session.
    pub fn update(
        &mut self,
        term: &str,
        quality: Quality,
        today: NaiveDate,
    ) -> Option<ReviewOutcome> {
        let current = self.words.get(term)?.clone();
        let outcome = apply_review(current, quality, today);
        self.words.insert(term.to_string(), outcome.state.clone());
        Some(outcome)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WordState)> {
        self.words.iter()
    }
}

/// Character-level mastery track, independent of word state. Lives
/// inside the player profile so it persists under the same key.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CharacterStore {
    chars: HashMap<String, CharacterState>,
}

impl CharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self, ch: char) -> Option<&CharacterState> {
        self.chars.get(&ch.to_string())
    }

    /// Records one practice outcome: level steps down on failure and up
    /// on success (never resets), and the next review lands after the
    /// gap the new level prescribes.
    pub fn record_practice(
        &mut self,
        ch: char,
        success: bool,
        today: NaiveDate,
    ) -> &CharacterState {
        let state = self
            .chars
            .entry(ch.to_string())
            .or_insert_with(|| CharacterState::new(today));
        if success {
            state.level = (state.level + 1).min(MASTERY_MAX);
        } else {
            state.level = state.level.saturating_sub(1);
        }
        state.stages_completed += 1;
        state.last_practiced = Some(today);
        let gap = CHAR_REVIEW_GAPS[state.level as usize];
        state.next_review = today
            .checked_add_signed(Duration::days(gap as i64))
            .unwrap_or(NaiveDate::MAX);
        state
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}
