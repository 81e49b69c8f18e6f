use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "worddrill", version, about = "WordDrill spaced-repetition practice CLI")]
pub struct Cli {
    /// Data directory override (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Practice one lesson, resuming an interrupted session if present
    Session(SessionCmd),
    /// Review unmastered words pooled across lessons
    Review(ReviewCmd),
    /// Show level, XP, streak, and per-lesson progress
    Stats(StatsCmd),
    /// List achievements and which are unlocked
    Achievements,
    /// Write the full profile (word states and player stats) to a JSON file
    Export { path: PathBuf },
}

#[derive(Debug, Args, Clone)]
pub struct SessionCmd {
    /// Lesson file: JSON {"id": "...", "words": ["...", ...]}
    pub lesson: PathBuf,

    /// Cap the session length
    #[arg(long)]
    pub limit: Option<usize>,

    /// Discard any saved session instead of resuming it
    #[arg(long)]
    pub fresh: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReviewCmd {
    /// Lesson files to pool
    #[arg(required = true)]
    pub lessons: Vec<PathBuf>,

    /// Cap the session length
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct StatsCmd {
    /// Lesson files to summarize (optional)
    pub lessons: Vec<PathBuf>,
}
