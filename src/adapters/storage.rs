use crate::domain::ports::DeckStore;
use crate::utils::error::{DeckError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 以 `base_path` 為根的檔案系統儲存，絕對路徑不受根目錄影響
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DeckStore for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        Ok(fs::read(full_path)?)
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        let parent = match full_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&parent).map_err(|e| DeckError::persist(&full_path, e))?;

        // 先寫入同目錄的暫存檔，再以 rename 取代目標檔
        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| DeckError::persist(&full_path, e))?;
        tmp.write_all(data)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| DeckError::persist(&full_path, e))?;
        tmp.persist(&full_path)
            .map_err(|e| DeckError::persist(&full_path, e.error))?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let full_path = self.resolve(path);
        match fs::remove_file(&full_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DeckError::persist(full_path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let path = Path::new("assets/decks/workingDeck.json");

        storage.write_atomic(path, b"{}").unwrap();

        assert!(storage.exists(path));
        assert_eq!(storage.read(path).unwrap(), b"{}");
    }

    #[test]
    fn test_write_atomic_replaces_content_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let path = Path::new("deck.json");

        storage.write_atomic(path, b"first version, quite long").unwrap();
        storage.write_atomic(path, b"second").unwrap();

        assert_eq!(storage.read(path).unwrap(), b"second");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary files must not be left behind");
    }

    #[test]
    fn test_write_into_a_file_path_fails_with_persist_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.write_atomic(Path::new("blocker"), b"x").unwrap();

        let err = storage
            .write_atomic(Path::new("blocker/deck.json"), b"{}")
            .unwrap_err();
        assert!(matches!(err, DeckError::PersistError { .. }));
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.remove(Path::new("nothing.json")).is_ok());
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(!storage.exists(Path::new("missing.json")));
        assert!(matches!(
            storage.read(Path::new("missing.json")),
            Err(DeckError::IoError(_))
        ));
    }
}
