use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub words: Vec<String>,
}

pub fn load_lesson(path: &Path) -> Result<Lesson> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading lesson file {}", path.display()))?;
    let lesson: Lesson = serde_json::from_str(&data)
        .with_context(|| format!("parsing lesson file {}", path.display()))?;
    Ok(lesson)
}

pub fn load_lessons(paths: &[PathBuf]) -> Result<Vec<Lesson>> {
    paths.iter().map(|p| load_lesson(p)).collect()
}
