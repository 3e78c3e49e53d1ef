use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use super::KeyValueStore;

/// Stores each key in its own file under a directory.
///
/// Files are written owner-only on unix since one of them carries the
/// session credential.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    #[cfg(unix)]
    fn write_private(path: &std::path::Path, contents: &str) -> Result<()> {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(contents.as_bytes())?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn write_private(path: &std::path::Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage file: {}", key))?;
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(None);
        }
        Ok(Some(contents.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        Self::write_private(&path, value)
            .with_context(|| format!("Failed to write storage file: {}", key))?;
        debug!(key, "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove storage file: {}", key))?;
            debug!(key, "Removed value");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.get("authHeader").unwrap(), None);
        assert!(!store.contains("authHeader").unwrap());
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("authHeader", "Basic YXNoOnBpa2FjaHU=").unwrap();
        assert_eq!(
            store.get("authHeader").unwrap().as_deref(),
            Some("Basic YXNoOnBpa2FjaHU=")
        );

        store.remove("authHeader").unwrap();
        assert_eq!(store.get("authHeader").unwrap(), None);
        // Removing twice is fine
        store.remove("authHeader").unwrap();
    }

    #[test]
    fn test_values_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path().to_path_buf()).unwrap();
            store.set("activeQuest", r#"{"id":42,"start":1000}"#).unwrap();
        }
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            store.get("activeQuest").unwrap().as_deref(),
            Some(r#"{"id":42,"start":1000}"#)
        );
    }

    #[test]
    fn test_blank_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("authHeader.json"), "  \n").unwrap();
        assert_eq!(store.get("authHeader").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.set("authHeader", "Basic abc").unwrap();
        let mode = std::fs::metadata(dir.path().join("authHeader.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
