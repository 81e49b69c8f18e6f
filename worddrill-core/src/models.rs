use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const EF_MIN: f64 = 1.3;
pub const EF_DEFAULT: f64 = 2.5;
pub const MASTERY_MAX: u8 = 5;

/// Recall quality for one review of one word, on the SM-2 0-5 scale.
///
/// This is the single grading scale for the whole engine. Raw integers
/// go through [`Quality::from_score`], which clamps instead of
/// rejecting, and UI-level signals go through [`Quality::from_attempt`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Blackout,
    Revealed,
    Hinted,
    Difficult,
    Good,
    Perfect,
}

impl Quality {
    pub fn as_score(&self) -> u8 {
        match self {
            Quality::Blackout => 0,
            Quality::Revealed => 1,
            Quality::Hinted => 2,
            Quality::Difficult => 3,
            Quality::Good => 4,
            Quality::Perfect => 5,
        }
    }

    /// Clamps out-of-range scores to the nearest end of the scale.
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=0 => Quality::Blackout,
            1 => Quality::Revealed,
            2 => Quality::Hinted,
            3 => Quality::Difficult,
            4 => Quality::Good,
            _ => Quality::Perfect,
        }
    }

    /// Maps raw attempt signals to a grade. Reveal beats hint, hint
    /// beats mistake count.
    pub fn from_attempt(mistakes: u32, hint_used: bool, revealed: bool) -> Self {
        if revealed {
            Quality::Revealed
        } else if hint_used {
            Quality::Hinted
        } else if mistakes == 0 {
            Quality::Perfect
        } else if mistakes <= 2 {
            Quality::Good
        } else {
            Quality::Difficult
        }
    }

    pub fn is_pass(&self) -> bool {
        self.as_score() >= 3
    }
}

/// Per-word learning state. Created lazily with defaults on first
/// access, mutated only by the scheduler, never destroyed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WordState {
    pub mastery_score: u8,
    pub interval_days: u32,
    pub next_review: NaiveDate,
    pub ease_factor: f64,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub times_mistaken: u32,
    #[serde(default)]
    pub learned_milestone: bool,
    #[serde(default)]
    pub perfect_milestone: bool,
}

impl WordState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mastery_score: 0,
            interval_days: 0,
            next_review: today,
            ease_factor: EF_DEFAULT,
            times_correct: 0,
            times_mistaken: 0,
            learned_milestone: false,
            perfect_milestone: false,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }

    /// A word is new until it has been answered correctly once.
    pub fn is_new(&self) -> bool {
        self.times_correct == 0
    }

    pub fn is_mastered(&self) -> bool {
        self.mastery_score >= MASTERY_MAX
    }
}

/// Per-character mastery, tracked independently of word-level state.
/// Level moves one step at a time; the review gap is a fixed schedule
/// indexed by level.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CharacterState {
    pub level: u8,
    pub next_review: NaiveDate,
    #[serde(default)]
    pub last_practiced: Option<NaiveDate>,
    #[serde(default)]
    pub stages_completed: u32,
}

impl CharacterState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            level: 0,
            next_review: today,
            last_practiced: None,
            stages_completed: 0,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }
}
