use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{AppError, AppResult};

use super::record::SessionRecord;

/// Durable key-value substrate for the session record.
/// Writes replace or clear the whole record; there are no partial updates.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> SessionRecord;
    fn save(&self, record: &SessionRecord) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RwLock<SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_record(record: SessionRecord) -> Self {
        Self { record: RwLock::new(record) }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> SessionRecord { self.record.read().clone() }

    fn save(&self, record: &SessionRecord) -> AppResult<()> {
        *self.record.write() = record.clone();
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.record.write() = SessionRecord::default();
        Ok(())
    }
}

/// JSON file store so a session survives process restarts.
/// The file is read once on open; the in-memory copy mirrors every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cached: RwLock<SessionRecord>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let record = if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| AppError::Storage(format!("read {}: {}", path.display(), e)))?;
            if text.trim().is_empty() {
                SessionRecord::default()
            } else {
                serde_json::from_str(&text)
                    .map_err(|e| AppError::Storage(format!("parse {}: {}", path.display(), e)))?
            }
        } else {
            SessionRecord::default()
        };
        debug!(target: "blogdesk::session", "opened session file {} (authenticated={})", path.display(), record.is_authenticated());
        Ok(Self { path, cached: RwLock::new(record) })
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl SessionStore for FileStore {
    fn load(&self) -> SessionRecord { self.cached.read().clone() }

    fn save(&self, record: &SessionRecord) -> AppResult<()> {
        let mut guard = self.cached.write();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(record)
            .map_err(|e| AppError::Storage(format!("encode session: {}", e)))?;
        // write-then-rename so a crash never leaves a half-written record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|e| AppError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::Storage(format!("rename to {}: {}", self.path.display(), e)))?;
        *guard = record.clone();
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut guard = self.cached.write();
        // the cached copy only follows once the file is gone
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::Storage(format!("remove {}: {}", self.path.display(), e))),
        }
        *guard = SessionRecord::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> SessionRecord {
        SessionRecord {
            token: Some("tok".into()),
            username: Some("ayse".into()),
            email: Some("ayse@example.com".into()),
            id: Some("7".into()),
            role: None,
        }
    }

    #[test]
    fn memory_store_replaces_and_clears() {
        let s = MemoryStore::new();
        assert!(s.load().is_empty());
        s.save(&sample()).unwrap();
        assert_eq!(s.load(), sample());
        s.clear().unwrap();
        assert!(s.load().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("session.json");
        {
            let s = FileStore::open(&path).unwrap();
            assert!(s.load().is_empty());
            s.save(&sample()).unwrap();
        }
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.load(), sample());
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn file_store_clear_removes_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        let s = FileStore::open(&path).unwrap();
        s.save(&sample()).unwrap();
        assert!(path.exists());
        s.clear().unwrap();
        assert!(!path.exists());
        assert!(s.load().is_empty());
        // clearing twice is fine
        s.clear().unwrap();
    }

    #[test]
    fn failed_clear_keeps_the_record() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        let s = FileStore::open(&path).unwrap();
        s.save(&sample()).unwrap();
        // a non-empty directory in place of the file makes remove_file fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert_eq!(s.clear().unwrap_err().code_str(), "storage");
        assert_eq!(s.load(), sample());
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let err = FileStore::open(&path).unwrap_err();
        assert_eq!(err.code_str(), "storage");
    }
}
