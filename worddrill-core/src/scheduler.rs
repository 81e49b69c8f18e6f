use crate::{Quality, WordState, EF_MIN, MASTERY_MAX};
use chrono::{Duration, NaiveDate};

/// Result of one review: the updated state plus the milestone edges the
/// caller feeds into player progress. Milestones latch on the state, so
/// each fires at most once per word.
pub struct ReviewOutcome {
    pub state: WordState,
    pub quality: Quality,
    pub newly_learned: bool,
    pub newly_perfect: bool,
}

/// SM-2 review step.
///
/// Ease always moves (quadratic penalty below perfect, +0.1 at perfect)
/// and never drops below 1.3. A failing grade resets the interval to 0
/// and steps mastery down; a passing grade grows the interval 0 -> 1 ->
/// 6 -> round(interval * ease) and, at quality 4+, steps mastery up.
/// There is no upper ease bound; long intervals are expected, and the
/// date arithmetic saturates instead of overflowing.
pub fn apply_review(mut state: WordState, quality: Quality, today: NaiveDate) -> ReviewOutcome {
    let q = quality.as_score() as f64;

    // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    let new_ease = (state.ease_factor + ease_delta).max(EF_MIN);

    let mut newly_learned = false;
    let mut newly_perfect = false;

    if quality.is_pass() {
        state.interval_days = match state.interval_days {
            0 => 1,
            1 => 6,
            n => (n as f64 * new_ease).round() as u32,
        };
        state.times_correct += 1;
        if quality.as_score() >= 4 {
            state.mastery_score = (state.mastery_score + 1).min(MASTERY_MAX);
        }
        if !state.learned_milestone && state.mastery_score >= 4 && state.times_correct >= 3 {
            state.learned_milestone = true;
            newly_learned = true;
        }
        if !state.perfect_milestone
            && quality == Quality::Perfect
            && state.mastery_score == MASTERY_MAX
        {
            state.perfect_milestone = true;
            newly_perfect = true;
        }
    } else {
        state.interval_days = 0;
        state.mastery_score = state.mastery_score.saturating_sub(1);
        state.times_mistaken += 1;
    }

    state.ease_factor = new_ease;
    state.next_review = today
        .checked_add_signed(Duration::days(state.interval_days as i64))
        .unwrap_or(NaiveDate::MAX);

    ReviewOutcome {
        state,
        quality,
        newly_learned,
        newly_perfect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn perfect_on_established_word() {
        let mut state = WordState::new(day());
        state.mastery_score = 2;
        state.interval_days = 6;
        state.ease_factor = 2.3;

        let out = apply_review(state, Quality::Perfect, day());
        let s = out.state;

        // ease 2.3 + 0.1 = 2.4, interval round(6 * 2.4) = 14
        assert!((s.ease_factor - 2.4).abs() < 1e-9);
        assert_eq!(s.interval_days, 14);
        assert_eq!(s.mastery_score, 3);
        assert_eq!(s.next_review, day() + Duration::days(14));
        assert_eq!(s.times_correct, 1);
    }

    #[test]
    fn hint_resets_interval() {
        let mut state = WordState::new(day());
        state.mastery_score = 3;
        state.interval_days = 14;

        let out = apply_review(state, Quality::Hinted, day());
        let s = out.state;

        assert_eq!(s.interval_days, 0);
        assert_eq!(s.mastery_score, 2);
        assert_eq!(s.next_review, day());
        assert_eq!(s.times_mistaken, 1);
        assert_eq!(s.times_correct, 0);
    }

    #[test]
    fn interval_ladder_from_new() {
        let mut state = WordState::new(day());

        state = apply_review(state, Quality::Good, day()).state;
        assert_eq!(state.interval_days, 1);

        state = apply_review(state, Quality::Good, day()).state;
        assert_eq!(state.interval_days, 6);

        state = apply_review(state, Quality::Good, day()).state;
        assert!(state.interval_days > 6);
    }

    #[test]
    fn difficult_passes_without_mastery_gain() {
        let mut state = WordState::new(day());
        state.mastery_score = 2;
        state.interval_days = 1;

        let out = apply_review(state, Quality::Difficult, day());
        assert_eq!(out.state.interval_days, 6);
        assert_eq!(out.state.mastery_score, 2);
        assert_eq!(out.state.times_correct, 1);
    }

    #[test]
    fn ease_floor_holds_under_repeated_blackouts() {
        let mut state = WordState::new(day());
        state.interval_days = 10;
        state.mastery_score = 4;

        for _ in 0..10 {
            state = apply_review(state, Quality::Blackout, day()).state;
            assert!(state.ease_factor >= EF_MIN);
        }
        assert!((state.ease_factor - EF_MIN).abs() < 1e-9);
        assert_eq!(state.mastery_score, 0);
        assert_eq!(state.interval_days, 0);
    }

    #[test]
    fn mastery_clamps_at_five() {
        let mut state = WordState::new(day());
        for _ in 0..12 {
            state = apply_review(state, Quality::Perfect, day()).state;
        }
        assert_eq!(state.mastery_score, MASTERY_MAX);
    }

    #[test]
    fn ease_has_no_upper_bound() {
        let mut state = WordState::new(day());
        for _ in 0..20 {
            state = apply_review(state, Quality::Perfect, day()).state;
        }
        // 20 perfect reviews push ease well past any cap
        assert!(state.ease_factor > 4.0);
        assert!(state.interval_days > 365);
        assert!(state.next_review > day());
    }

    #[test]
    fn learned_milestone_fires_once() {
        let mut state = WordState::new(day());
        let mut fired = 0;
        for _ in 0..6 {
            let out = apply_review(state, Quality::Good, day());
            state = out.state;
            if out.newly_learned {
                fired += 1;
            }
        }
        // mastery reaches 4 on the fourth pass, times_correct is 4 by then
        assert_eq!(fired, 1);
        assert!(state.learned_milestone);
    }

    #[test]
    fn perfect_milestone_requires_full_mastery() {
        let mut state = WordState::new(day());
        let mut fired = 0;
        for _ in 0..7 {
            let out = apply_review(state, Quality::Perfect, day());
            state = out.state;
            if out.newly_perfect {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(state.perfect_milestone);
    }

    #[test]
    fn failing_never_raises_mastery() {
        for quality in [Quality::Blackout, Quality::Revealed, Quality::Hinted] {
            let mut state = WordState::new(day());
            state.mastery_score = 3;
            state.interval_days = 6;
            let out = apply_review(state, quality, day());
            assert_eq!(out.state.interval_days, 0);
            assert!(out.state.mastery_score < 3);
        }
    }

    #[test]
    fn year_scale_intervals_do_not_panic() {
        let mut state = WordState::new(day());
        state.interval_days = u32::MAX / 2;
        state.ease_factor = 3.0;
        let out = apply_review(state, Quality::Perfect, day());
        assert!(out.state.next_review >= day());
    }
}
