use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use worddrill_core::{keys, StorageBackend, StorageError};

/// Keys whose writes also produce a timestamped backup. Word data is
/// the one store whose loss destroys months of scheduling history.
const BACKUP_KEYS: &[&str] = &[keys::WORD_DATA];

/// File-per-key JSON storage under a single data directory. Writes go
/// through a temp file in the same directory and are persisted over the
/// target, so readers never observe a half-written document.
pub struct FileBackend {
    root: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
}

impl FileBackend {
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open_with(
            crate::paths::data_root(),
            crate::paths::default_backups_dir(),
            10,
        )
    }

    pub fn open_with(
        root: PathBuf,
        backups_dir: PathBuf,
        max_backups: usize,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            root,
            backups_dir,
            max_backups: max_backups.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn write_backup(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let backup_path = self.backups_dir.join(format!("{key}-{ts}.json"));
        write_atomic(&backup_path, value)?;
        rotate_backups(&self.backups_dir, key, self.max_backups)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.file_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        write_atomic(&self.file_for(key), value)?;
        if BACKUP_KEYS.contains(&key) {
            self.write_backup(key, value)?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.file_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, value: &str) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(value.as_bytes())?;
    tmp.flush()?;
    let _ = fs::remove_file(path);
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

fn rotate_backups(dir: &Path, key: &str, keep: usize) -> Result<(), StorageError> {
    let prefix = format!("{key}-");
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name().to_string_lossy().starts_with(&prefix)
                && e.path().extension().and_then(|s| s.to_str()) == Some("json")
        })
        .collect();
    entries.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}
