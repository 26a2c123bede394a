//! Persistence gateway for the ledger document.
//!
//! A store hands out a fully materialised snapshot and replaces the whole
//! document on save. It never merges; callers load, modify and save.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::document::LedgerDocument;
use crate::error::CreditQuestError;
use crate::CreditQuestResult;

pub trait LedgerStore {
    /// Current document, or an empty one if nothing is stored yet.
    fn load(&self) -> CreditQuestResult<LedgerDocument>;

    /// Replace the stored document.
    fn save(&self, doc: &LedgerDocument) -> CreditQuestResult<()>;
}

/// Pretty-printed JSON file, replaced via a sibling temp file and rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> CreditQuestResult<LedgerDocument> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no ledger on disk, starting empty");
            return Ok(LedgerDocument::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            CreditQuestError::Storage(format!("failed to read '{}': {}", self.path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(LedgerDocument::default());
        }
        serde_json::from_str(&contents).map_err(|e| {
            CreditQuestError::SerializationError(format!(
                "failed to parse '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, doc: &LedgerDocument) -> CreditQuestResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| {
            CreditQuestError::Storage(format!("failed to write '{}': {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            CreditQuestError::Storage(format!(
                "failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        tracing::info!(
            path = %self.path.display(),
            checked = doc.checked_ids.len(),
            extras = doc.extra_payments.len(),
            "ledger saved"
        );
        Ok(())
    }
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<LedgerDocument>,
}

impl MemoryStore {
    pub fn new(doc: LedgerDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> CreditQuestResult<LedgerDocument> {
        self.doc
            .lock()
            .map(|d| d.clone())
            .map_err(|_| CreditQuestError::Storage("memory store lock poisoned".into()))
    }

    fn save(&self, doc: &LedgerDocument) -> CreditQuestResult<()> {
        let mut guard = self
            .doc
            .lock()
            .map_err(|_| CreditQuestError::Storage("memory store lock poisoned".into()))?;
        *guard = doc.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoanProfile;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn configured() -> LedgerDocument {
        let mut doc = LedgerDocument::default();
        doc.set_profile(LoanProfile {
            principal: dec!(18000),
            interest_rate: dec!(4.2),
            monthly_payment: dec!(320),
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        })
        .unwrap();
        doc
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        assert_eq!(store.load().unwrap(), LedgerDocument::default());
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("db.json"));
        let mut doc = configured();
        doc.check("m-2025-1").unwrap();

        store.save(&doc).unwrap();
        assert!(store.path().exists());
        assert!(!dir.path().join("data").join("db.json.tmp").exists());
        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn test_save_overwrites_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        store.save(&configured()).unwrap();

        store.save(&LedgerDocument::default()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(CreditQuestError::SerializationError(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::default();
        assert!(!store.load().unwrap().is_configured());
        store.save(&configured()).unwrap();
        assert!(store.load().unwrap().is_configured());
    }
}
