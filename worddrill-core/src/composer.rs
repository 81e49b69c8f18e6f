use crate::{WordStateStore, MASTERY_MAX};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Session size when nothing in the lesson is due or new.
pub const FALLBACK_SESSION_SIZE: usize = 6;

/// Composes one practice session from a lesson.
///
/// Due words (scheduled for today or earlier, answered correctly at
/// least once before) come first, then new words (never answered
/// correctly, eligible regardless of due date). Each block is shuffled
/// independently. An empty result falls back to the weakest words in
/// the lesson so a non-empty lesson always yields a session. A word
/// limit truncates after composition, preserving the priority order.
pub fn compose_session(
    lesson_items: &[String],
    store: &WordStateStore,
    today: NaiveDate,
    word_limit: Option<usize>,
) -> Vec<String> {
    compose_session_with_rng(lesson_items, store, today, word_limit, &mut rand::thread_rng())
}

pub fn compose_session_with_rng<R: Rng + ?Sized>(
    lesson_items: &[String],
    store: &WordStateStore,
    today: NaiveDate,
    word_limit: Option<usize>,
    rng: &mut R,
) -> Vec<String> {
    let mut due = Vec::new();
    let mut fresh = Vec::new();
    for term in lesson_items {
        match store.peek(term) {
            Some(state) if !state.is_new() => {
                if state.is_due(today) {
                    due.push(term.clone());
                }
            }
            _ => fresh.push(term.clone()),
        }
    }

    due.shuffle(rng);
    fresh.shuffle(rng);

    let mut ordered = due;
    ordered.extend(fresh);

    if ordered.is_empty() {
        ordered = weakest_items(lesson_items, store, FALLBACK_SESSION_SIZE);
    }

    if let Some(limit) = word_limit {
        if limit > 0 && ordered.len() > limit {
            ordered.truncate(limit);
        }
    }

    ordered
}

fn weakest_items(lesson_items: &[String], store: &WordStateStore, count: usize) -> Vec<String> {
    let mut scored: Vec<(u8, &String)> = lesson_items
        .iter()
        .map(|term| (store.score(term), term))
        .collect();
    // stable sort keeps original lesson order for equal scores
    scored.sort_by_key(|(score, _)| *score);
    scored
        .into_iter()
        .take(count)
        .map(|(_, term)| term.clone())
        .collect()
}

/// Pools several lessons, keeps unmastered words, weakest first. Stable
/// order for ties, duplicates kept once at their first occurrence.
pub fn compose_unmastered_across_lessons(
    lessons: &[Vec<String>],
    store: &WordStateStore,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pool: Vec<(u8, String)> = Vec::new();
    for lesson in lessons {
        for term in lesson {
            if !seen.insert(term.clone()) {
                continue;
            }
            let score = store.score(term);
            if score < MASTERY_MAX {
                pool.push((score, term.clone()));
            }
        }
    }
    pool.sort_by_key(|(score, _)| *score);
    pool.into_iter().map(|(_, term)| term).collect()
}
