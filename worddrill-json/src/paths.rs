use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "worddrill", "WordDrill") {
        pd.data_dir().to_path_buf()
    } else {
        // no home directory: fall back to the working directory
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn default_backups_dir() -> PathBuf {
    data_root().join("backups")
}
