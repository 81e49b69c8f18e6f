use crate::CharacterStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// XP needed for level n+1 grows quadratically: level = floor(sqrt(xp /
/// 100)) + 1, so 100 XP reaches level 2, 400 reaches level 3, and so on.
pub const LEVEL_XP_BASE: u64 = 100;

/// Aggregate learner progress, one record per device. Every field
/// defaults so profiles written by older versions merge cleanly.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerStats {
    pub total_xp: u64,
    pub daily_streak: u32,
    pub last_played: Option<NaiveDate>,
    pub words_learned: u32,
    pub perfect_words: u32,
    pub total_sessions: u32,
    pub unlocked_achievements: Vec<String>,
    pub current_lesson: Option<String>,
    pub characters: CharacterStore,
}

impl PlayerStats {
    pub fn add_xp(&mut self, amount: u64) -> u64 {
        self.total_xp += amount;
        self.total_xp
    }

    pub fn level(&self) -> u32 {
        ((self.total_xp as f64 / LEVEL_XP_BASE as f64).sqrt().floor() as u32) + 1
    }

    pub fn next_level_threshold(&self) -> u64 {
        let level = self.level() as u64;
        level * level * LEVEL_XP_BASE
    }

    /// Counts today's practice at most once. The streak continues only
    /// when the previous play was exactly yesterday; any gap restarts
    /// it at 1, today counting itself.
    pub fn record_practice_for_today(&mut self, today: NaiveDate) -> bool {
        if self.last_played == Some(today) {
            return false;
        }
        self.daily_streak = match self.last_played {
            Some(prev) if Some(prev) == today.pred_opt() => self.daily_streak + 1,
            _ => 1,
        };
        self.last_played = Some(today);
        self.total_sessions += 1;
        true
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.unlocked_achievements.iter().any(|a| a == id)
    }
}

pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub check: fn(&PlayerStats) -> bool,
}

/// Fixed achievement table. Append-only by convention: ids are stable
/// and unlocks are never revoked, so removing an entry would orphan
/// persisted ids.
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_session",
        title: "First Steps",
        check: |s| s.total_sessions >= 1,
    },
    AchievementDef {
        id: "streak_3",
        title: "Three-Day Streak",
        check: |s| s.daily_streak >= 3,
    },
    AchievementDef {
        id: "streak_7",
        title: "One Week Strong",
        check: |s| s.daily_streak >= 7,
    },
    AchievementDef {
        id: "streak_30",
        title: "Monthly Devotion",
        check: |s| s.daily_streak >= 30,
    },
    AchievementDef {
        id: "words_10",
        title: "Vocabulary Builder",
        check: |s| s.words_learned >= 10,
    },
    AchievementDef {
        id: "words_50",
        title: "Word Collector",
        check: |s| s.words_learned >= 50,
    },
    AchievementDef {
        id: "words_100",
        title: "Lexicon Master",
        check: |s| s.words_learned >= 100,
    },
    AchievementDef {
        id: "perfect_10",
        title: "Perfectionist",
        check: |s| s.perfect_words >= 10,
    },
    AchievementDef {
        id: "level_5",
        title: "Level Five",
        check: |s| s.level() >= 5,
    },
    AchievementDef {
        id: "level_10",
        title: "Level Ten",
        check: |s| s.level() >= 10,
    },
    AchievementDef {
        id: "sessions_100",
        title: "Century of Practice",
        check: |s| s.total_sessions >= 100,
    },
];

/// Re-evaluates the whole table, appending ids that newly hold. Returns
/// the definitions unlocked by this call so the caller can announce them.
pub fn check_achievements(stats: &mut PlayerStats) -> Vec<&'static AchievementDef> {
    let mut newly = Vec::new();
    for def in ACHIEVEMENTS {
        if !stats.has_achievement(def.id) && (def.check)(stats) {
            stats.unlocked_achievements.push(def.id.to_string());
            newly.push(def);
        }
    }
    newly
}
