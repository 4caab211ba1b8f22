//! Persistent question/answer history.
//!
//! The history is a single JSON array of `{question, answer}` objects. Each
//! append re-reads the file, pushes the record, and rewrites the whole array
//! through a sibling temporary file that is renamed into place. A mutex
//! serializes appends made through the same store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::QaRecord;

pub struct QaHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl QaHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in arrival order; empty if the file does not exist yet.
    pub fn load(&self) -> Result<Vec<QaRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.persistence(e.to_string())),
        };
        serde_json::from_str(&content).map_err(|e| self.persistence(e.to_string()))
    }

    /// Append `record` to the end of the history.
    ///
    /// If the existing file cannot be parsed it is left untouched.
    pub fn append(&self, record: &QaRecord) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| self.persistence("history lock poisoned".to_string()))?;

        let mut records = self.load()?;
        records.push(record.clone());
        self.write_all(&records)
    }

    fn write_all(&self, records: &[QaRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.persistence(e.to_string()))?;
            }
        }

        let json =
            serde_json::to_string_pretty(records).map_err(|e| self.persistence(e.to_string()))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        std::fs::write(&tmp_path, json).map_err(|e| self.persistence(e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.persistence(e.to_string()))
    }

    fn persistence(&self, reason: String) -> Error {
        Error::Persistence {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(q: &str, a: &str) -> QaRecord {
        QaRecord {
            question: q.to_string(),
            answer: a.to_string(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = QaHistoryStore::new(dir.path().join("history.json"));
        assert_eq!(store.path(), dir.path().join("history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn appends_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let store = QaHistoryStore::new(&path);

        store.append(&record("first?", "one")).unwrap();
        store.append(&record("second?", "two")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([
                {"question": "first?", "answer": "one"},
                {"question": "second?", "answer": "two"}
            ])
        );
        assert!(!dir.path().join("nested").join("history.json.tmp").exists());
    }

    #[test]
    fn appends_to_existing_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"[{"question": "old?", "answer": "yes"}]"#).unwrap();

        let store = QaHistoryStore::new(&path);
        store.append(&record("new?", "no")).unwrap();

        assert_eq!(
            store.load().unwrap(),
            vec![record("old?", "yes"), record("new?", "no")]
        );
    }

    #[test]
    fn corrupt_file_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = QaHistoryStore::new(&path);
        let err = store.append(&record("q", "a")).unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn wrong_shape_is_a_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"question": "q", "answer": "a"}"#).unwrap();

        let store = QaHistoryStore::new(&path);
        assert!(matches!(store.load(), Err(Error::Persistence { .. })));
    }
}
