//! Autosaved drafts
//!
//! The in-progress form is written as one JSON blob under a fixed key after
//! every change, restored on the next start and dropped once a submission
//! succeeds.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IntakeError, Result};
use crate::values::FormValues;

/// Key the intake form saves its draft under.
pub const DRAFT_KEY: &str = "cbcFormData";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub saved_at: DateTime<Utc>,
    pub values: FormValues,
}

impl Draft {
    pub fn new(values: FormValues) -> Self {
        Self { saved_at: Utc::now(), values }
    }
}

/// Key-value store for drafts.
pub trait DraftStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Draft>>;
    fn save(&self, key: &str, draft: &Draft) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per draft inside a directory.
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(IntakeError::Storage(format!("invalid draft key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> Result<Option<Draft>> {
        let path = self.path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable draft");
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, draft: &Draft) -> Result<()> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(draft)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local draft store.
#[derive(Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<HashMap<String, Draft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<Draft>> {
        Ok(self.drafts.read().get(key).cloned())
    }

    fn save(&self, key: &str, draft: &Draft) -> Result<()> {
        self.drafts.write().insert(key.to_string(), draft.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.drafts.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Draft {
        Draft::new([("name", "Asha"), ("hb", "11.2")].into_iter().collect())
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path().join("drafts"));

        assert!(store.load(DRAFT_KEY).unwrap().is_none());

        let draft = sample();
        store.save(DRAFT_KEY, &draft).unwrap();
        assert_eq!(store.load(DRAFT_KEY).unwrap(), Some(draft));

        store.clear(DRAFT_KEY).unwrap();
        assert!(store.load(DRAFT_KEY).unwrap().is_none());
        store.clear(DRAFT_KEY).unwrap();
    }

    #[test]
    fn test_file_store_discards_corrupt_draft() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cbcFormData.json"), "{not json").unwrap();
        let store = FileDraftStore::new(dir.path());
        assert!(store.load(DRAFT_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let store = FileDraftStore::new("/tmp");
        assert!(matches!(store.save("../escape", &sample()), Err(IntakeError::Storage(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = InMemoryDraftStore::new();
        store.save(DRAFT_KEY, &sample()).unwrap();
        assert_eq!(store.load(DRAFT_KEY).unwrap().unwrap().values.get("hb"), Some("11.2"));
        store.clear(DRAFT_KEY).unwrap();
        assert!(store.load(DRAFT_KEY).unwrap().is_none());
    }
}
