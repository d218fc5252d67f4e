//! JSON file store for the assignment and roster collections.
//!
//! Each key lives in its own file under the data directory. Reads never
//! fail: a missing file, an unreadable file or a value of the wrong shape
//! all come back as a (possibly empty) sequence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chronos_core::records::{AssignmentRecord, RosterEntry};
use chronos_core::store::{decode_all, values_from_stored};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::prelude::*;

pub const ASSIGNMENTS_KEY: &str = "chronos:horarios";
pub const ROSTER_KEY: &str = "chronos:profesores";

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(f!("{}.json", key.replace(':', "_")))
    }

    /// Raw stored text, `None` when the key was never written.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read {key}: {e}");
                None
            }
        }
    }

    /// Every stored value under `key`, as a sequence.
    pub fn values(&self, key: &str) -> Vec<Value> {
        values_from_stored(self.read_raw(key).as_deref())
    }

    /// Stored values that deserialize as `T`; the rest are skipped.
    pub fn read_all<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let (items, skipped) = decode_all(self.values(key));
        if skipped > 0 {
            log::warn!("Skipped {skipped} malformed entries under {key}");
        }
        items
    }

    pub fn assignments(&self) -> Vec<AssignmentRecord> {
        self.read_all(ASSIGNMENTS_KEY)
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.read_all(ROSTER_KEY)
    }

    /// Replace the collection under `key`. Returns how many items were
    /// written.
    pub fn replace(&self, key: &str, items: &[Value]) -> Result<usize> {
        fs::create_dir_all(&self.root)
            .map_err(|e| eyre!("Failed to create data directory {:?}: {}", self.root, e))?;
        let body = serde_json::to_string_pretty(items)?;
        fs::write(self.path(key), body).map_err(|e| eyre!("Failed to write {key}: {e}"))?;
        log::info!("Stored {} items under {key}", items.len());
        Ok(items.len())
    }
}

/// Parse an upload meant to replace a collection: it must be a non-empty
/// JSON array.
pub fn parse_collection(body: &str) -> std::result::Result<Vec<Value>, Error> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::InvalidInput(f!("body is not JSON: {e}")))?;
    match value {
        Value::Array(items) if !items.is_empty() => Ok(items),
        Value::Array(_) => Err(Error::InvalidInput("expected a non-empty array".into())),
        _ => Err(Error::InvalidInput("expected a JSON array".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert!(store.assignments().is_empty());
        assert!(store.read_raw(ROSTER_KEY).is_none());
    }

    #[test]
    fn test_replace_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested"));
        let items = vec![
            json!({"profesor": "ANA", "numTrabajador": 7, "carrera": "ICO"}),
            json!("stray"),
        ];
        assert_eq!(store.replace(ROSTER_KEY, &items).unwrap(), 2);

        let roster = store.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].worker_id(), 7);
        assert_eq!(store.values(ROSTER_KEY).len(), 2);
    }

    #[test]
    fn test_data_wrapper_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(
            dir.path().join("chronos_horarios.json"),
            r#"{"data":[{"profesor":"A","horasTeoricas":"4"}]}"#,
        )
        .unwrap();
        let records = store.assignments();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].theoretical(), 4);
    }

    #[test]
    fn test_unparseable_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(dir.path().join("chronos_horarios.json"), "not json").unwrap();
        assert!(store.assignments().is_empty());
    }

    #[test]
    fn test_parse_collection() {
        assert_eq!(parse_collection(r#"[{"a":1}]"#).unwrap().len(), 1);
        assert!(matches!(parse_collection("[]"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_collection(r#"{"a":1}"#), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_collection("nope"), Err(Error::InvalidInput(_))));
    }
}
