use crate::cli::opts::{Cli, Command, ReviewCmd, SessionCmd, StatsCmd};
use crate::lessons::{load_lesson, load_lessons};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use worddrill_core::{
    check_achievements, compose_session, compose_unmastered_across_lessons, days_between,
    lesson_overview, today, AttemptRecord, ItemResult, PhraseOutcome, PlayerStats,
    PracticeSession, Quality, SessionMode, SessionSnapshot, StorageBackend, WordState,
    WordStateStore, ACHIEVEMENTS,
};
use worddrill_json::{FileBackend, ProfileStore, SnapshotStore};

pub const XP_PER_PASS: u64 = 10;
pub const XP_PERFECT_BONUS: u64 = 5;

pub fn run_cli(args: Cli) -> Result<()> {
    let backend: Arc<dyn StorageBackend> = Arc::new(open_backend(args.data_dir)?);
    let profile = ProfileStore::new(Arc::clone(&backend));
    let snapshots = SnapshotStore::new(Arc::clone(&backend));

    match args.cmd {
        Command::Session(cmd) => session_cmd(&profile, &snapshots, cmd),
        Command::Review(cmd) => review_cmd(&profile, &snapshots, cmd),
        Command::Stats(cmd) => stats_cmd(&profile, cmd),
        Command::Achievements => achievements_cmd(&profile),
        Command::Export { path } => export_cmd(&profile, &path),
    }
}

fn open_backend(data_dir: Option<PathBuf>) -> Result<FileBackend> {
    let backend = match data_dir {
        Some(root) => {
            let backups = root.join("backups");
            FileBackend::open_with(root, backups, 10)?
        }
        None => FileBackend::open_default()?,
    };
    Ok(backend)
}

fn session_cmd(profile: &ProfileStore, snapshots: &SnapshotStore, cmd: SessionCmd) -> Result<()> {
    let lesson = load_lesson(&cmd.lesson)?;
    let loaded = profile.load();
    let mut words = loaded.words;
    let mut stats = loaded.stats;
    let today = today();

    if cmd.fresh && snapshots.has_active(Utc::now()) {
        snapshots.clear();
        println!("discarded saved session");
    }
    let resumed = snapshots
        .load(Utc::now())
        .filter(|snap| {
            snap.mode == SessionMode::Lesson && snap.lesson.as_deref() == Some(lesson.id.as_str())
        })
        .map(SessionSnapshot::resume);

    let session = match resumed {
        Some(session) => {
            println!(
                "resuming interrupted session ({} of {} done)",
                session.current_index,
                session.items.len()
            );
            session
        }
        None => {
            let items = compose_session(&lesson.words, &words, today, cmd.limit);
            PracticeSession::new(SessionMode::Lesson, Some(lesson.id.clone()), items)
        }
    };

    if session.items.is_empty() {
        println!("lesson {} has no words", lesson.id);
        return Ok(());
    }

    stats.current_lesson = Some(lesson.id.clone());
    run_practice(profile, snapshots, &mut words, &mut stats, session)
}

fn review_cmd(profile: &ProfileStore, snapshots: &SnapshotStore, cmd: ReviewCmd) -> Result<()> {
    let lessons = load_lessons(&cmd.lessons)?;
    let loaded = profile.load();
    let mut words = loaded.words;
    let mut stats = loaded.stats;

    let resumed = snapshots
        .load(Utc::now())
        .filter(|snap| snap.mode == SessionMode::Review)
        .map(SessionSnapshot::resume);

    let session = match resumed {
        Some(session) => {
            println!(
                "resuming interrupted review ({} of {} done)",
                session.current_index,
                session.items.len()
            );
            session
        }
        None => {
            let pools: Vec<Vec<String>> = lessons.iter().map(|l| l.words.clone()).collect();
            let mut items = compose_unmastered_across_lessons(&pools, &words);
            if let Some(limit) = cmd.limit {
                if limit > 0 && items.len() > limit {
                    items.truncate(limit);
                }
            }
            PracticeSession::new(SessionMode::Review, None, items)
        }
    };

    if session.items.is_empty() {
        println!("everything is mastered, nothing to review");
        return Ok(());
    }

    run_practice(profile, snapshots, &mut words, &mut stats, session)
}

fn run_practice(
    profile: &ProfileStore,
    snapshots: &SnapshotStore,
    words: &mut WordStateStore,
    stats: &mut PlayerStats,
    mut session: PracticeSession,
) -> Result<()> {
    let today = today();
    let total = session.items.len();
    println!(
        "{} word(s) to go. grade each recall 0-5, q to stop.",
        total - session.current_index
    );

    while let Some(term) = session.current_term().map(str::to_string) {
        println!("\n[{}/{}] {}", session.current_index + 1, total, term);
        let Some(quality) = prompt_quality()? else {
            snapshots.save(&session, Utc::now())?;
            profile.save_sync(words, stats)?;
            println!("progress saved, rerun to resume");
            return Ok(());
        };

        words.get_or_create(&term, today);
        if let Some(outcome) = words.update(&term, quality, today) {
            if quality.is_pass() {
                stats.add_xp(XP_PER_PASS);
            }
            if quality == Quality::Perfect {
                stats.add_xp(XP_PERFECT_BONUS);
            }
            if outcome.newly_learned {
                stats.words_learned += 1;
                println!("word learned!");
            }
            if outcome.newly_perfect {
                stats.perfect_words += 1;
                println!("word perfected!");
            }
            match outcome.state.interval_days {
                0 => println!("→ again next session"),
                n => println!("→ next review in {n} day(s)"),
            }
        }

        for ch in term.chars().filter(|c| c.is_alphabetic()) {
            stats.characters.record_practice(ch, quality.is_pass(), today);
        }

        // self-graded flow: no per-item mistake counter to carry over
        session.record(ItemResult {
            term,
            correct: quality.is_pass(),
            mistakes: u32::from(!quality.is_pass()),
            hint_used: quality == Quality::Hinted,
        });

        if let Err(err) = snapshots.save(&session, Utc::now()) {
            warn!(error = %err, "failed to checkpoint session");
        }
        profile.save(words, stats);
    }

    finish_session(profile, snapshots, words, stats, &session)
}

fn finish_session(
    profile: &ProfileStore,
    snapshots: &SnapshotStore,
    words: &WordStateStore,
    stats: &mut PlayerStats,
    session: &PracticeSession,
) -> Result<()> {
    snapshots.clear();
    stats.record_practice_for_today(today());

    let correct = session.results.iter().filter(|r| r.correct).count();
    println!("\nsession done: {}/{} correct", correct, session.results.len());

    let phrases = session
        .results
        .iter()
        .map(|r| PhraseOutcome {
            term: r.term.clone(),
            correct: r.correct,
        })
        .collect();
    let record = AttemptRecord::new(
        session.lesson.clone(),
        session.mode,
        phrases,
        session.elapsed_secs(Utc::now()),
    );
    if let Err(err) = profile.push_attempt(record) {
        warn!(error = %err, "failed to record attempt");
    }

    for def in check_achievements(stats) {
        println!("achievement unlocked: {}", def.title);
    }
    println!(
        "level {} | {} XP (next level at {}) | streak {} day(s)",
        stats.level(),
        stats.total_xp,
        stats.next_level_threshold(),
        stats.daily_streak
    );

    profile.save_sync(words, stats)?;
    Ok(())
}

fn stats_cmd(profile: &ProfileStore, cmd: StatsCmd) -> Result<()> {
    let loaded = profile.load();
    let stats = loaded.stats;
    let today = today();

    println!(
        "level {} | {} XP (next level at {})",
        stats.level(),
        stats.total_xp,
        stats.next_level_threshold()
    );
    println!(
        "streak: {} day(s), sessions: {}",
        stats.daily_streak, stats.total_sessions
    );
    if let Some(prev) = stats.last_played {
        println!("last played {} day(s) ago", days_between(prev, today));
    }
    println!(
        "words learned: {}, perfect: {}",
        stats.words_learned, stats.perfect_words
    );
    if let Some(lesson) = &stats.current_lesson {
        println!("current lesson: {lesson}");
    }
    println!(
        "tracked words: {}, tracked characters: {}",
        loaded.words.len(),
        stats.characters.len()
    );

    for lesson in load_lessons(&cmd.lessons)? {
        let o = lesson_overview(&lesson.words, &loaded.words, today);
        println!(
            "{}: {} words | {} due, {} new, {} learning, {} mastered ({:.0}%)",
            lesson.id,
            o.total,
            o.due,
            o.fresh,
            o.learning,
            o.mastered,
            o.mastery_percent()
        );
    }

    let attempts = profile.recent_attempts();
    if let Some(last) = attempts.last() {
        let correct = last.phrases.iter().filter(|p| p.correct).count();
        println!(
            "last attempt: {} ({}/{} correct, {}s)",
            last.lesson.as_deref().unwrap_or("review"),
            correct,
            last.phrases.len(),
            last.duration_secs
        );
    }
    Ok(())
}

fn achievements_cmd(profile: &ProfileStore) -> Result<()> {
    let stats = profile.load().stats;
    for def in ACHIEVEMENTS {
        let mark = if stats.has_achievement(def.id) { "x" } else { " " };
        println!("[{mark}] {} ({})", def.title, def.id);
    }
    Ok(())
}

#[derive(Serialize)]
struct ExportBundle {
    version: u32,
    exported_at: DateTime<Utc>,
    words: BTreeMap<String, WordState>,
    stats: PlayerStats,
}

fn export_cmd(profile: &ProfileStore, path: &Path) -> Result<()> {
    let loaded = profile.load();
    let bundle = ExportBundle {
        version: 1,
        exported_at: Utc::now(),
        words: loaded
            .words
            .iter()
            .map(|(term, state)| (term.clone(), state.clone()))
            .collect(),
        stats: loaded.stats,
    };
    let s = serde_json::to_string_pretty(&bundle)?;
    std::fs::write(path, s)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn prompt_quality() -> Result<Option<Quality>> {
    println!("[5=perfect, 4=good, 3=difficult, 2=hint, 1=revealed, 0=blackout, q=quit]");
    loop {
        let line = read_line("grade> ")?;
        match line.trim().to_lowercase().as_str() {
            "5" | "p" | "perfect" => return Ok(Some(Quality::Perfect)),
            "4" | "g" | "good" => return Ok(Some(Quality::Good)),
            "3" | "d" | "difficult" => return Ok(Some(Quality::Difficult)),
            "2" | "h" | "hint" => return Ok(Some(Quality::Hinted)),
            "1" | "r" | "revealed" => return Ok(Some(Quality::Revealed)),
            "0" | "b" | "blackout" => return Ok(Some(Quality::Blackout)),
            "q" | "quit" => return Ok(None),
            _ => println!("enter 0-5 or q"),
        }
    }
}

fn read_line(prompt: &str) -> Result<String> { print!("{prompt}"); stdout().flush().ok(); let mut s = String::new(); stdin().read_line(&mut s)?; Ok(s) }
