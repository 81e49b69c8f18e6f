use crate::WordStateStore;
use chrono::NaiveDate;

/// Per-lesson progress counts for display. `fresh`, `learning`, and
/// `mastered` partition the lesson; `due` counts what a session
/// composed today would surface from the review block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LessonOverview {
    pub total: usize,
    pub due: usize,
    pub fresh: usize,
    pub learning: usize,
    pub mastered: usize,
}

impl LessonOverview {
    pub fn mastery_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.mastered as f64 / self.total as f64 * 100.0
        }
    }
}

pub fn lesson_overview(
    lesson_items: &[String],
    store: &WordStateStore,
    today: NaiveDate,
) -> LessonOverview {
    let mut overview = LessonOverview {
        total: lesson_items.len(),
        ..Default::default()
    };
    for term in lesson_items {
        match store.peek(term) {
            Some(state) if !state.is_new() => {
                if state.is_due(today) {
                    overview.due += 1;
                }
                if state.is_mastered() {
                    overview.mastered += 1;
                } else {
                    overview.learning += 1;
                }
            }
            _ => overview.fresh += 1,
        }
    }
    overview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Quality, WordState, WordStateStore};
    use chrono::Duration;
    use std::collections::HashMap;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn partitions_and_percentage() {
        let items: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();

        let mut words = HashMap::new();
        // mastered, not due
        let mut a = WordState::new(day());
        a.mastery_score = 5;
        a.times_correct = 8;
        a.next_review = day() + Duration::days(30);
        words.insert("a".to_string(), a);
        // learning and due
        let mut b = WordState::new(day());
        b.mastery_score = 2;
        b.times_correct = 2;
        b.next_review = day() - Duration::days(1);
        words.insert("b".to_string(), b);
        // c has state but no correct answer yet -> fresh
        words.insert("c".to_string(), WordState::new(day()));
        // d never seen -> fresh

        let store = WordStateStore::from_words(words);
        let overview = lesson_overview(&items, &store, day());

        assert_eq!(overview.total, 4);
        assert_eq!(overview.due, 1);
        assert_eq!(overview.fresh, 2);
        assert_eq!(overview.learning, 1);
        assert_eq!(overview.mastered, 1);
        assert!((overview.mastery_percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_lesson_is_zero_percent() {
        let store = WordStateStore::new();
        let overview = lesson_overview(&[], &store, day());
        assert_eq!(overview.total, 0);
        assert_eq!(overview.mastery_percent(), 0.0);
    }

    #[test]
    fn session_and_overview_agree_on_due_counts() {
        let items: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let mut store = WordStateStore::new();
        store.get_or_create("a", day());
        store.update("a", Quality::Good, day());
        // interval 1 -> due tomorrow, not today

        let overview = lesson_overview(&items, &store, day());
        assert_eq!(overview.due, 0);
        let overview = lesson_overview(&items, &store, day() + Duration::days(1));
        assert_eq!(overview.due, 1);
    }
}
