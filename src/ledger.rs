// Completion ledger
//
// Persisted set of video paths believed to already have a valid thumbnail.
// A hint, never ground truth: the oracle re-verifies hits against the real
// store and evicts stale entries (see oracle.rs). Single in-memory writer
// per process; persisted wholesale at run end and purge end.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, ThumbError};

#[derive(Debug, Default)]
pub struct CompletionLedger {
    entries: HashSet<String>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ledger from disk. A missing file is the expected first-run
    /// case and yields an empty set; a corrupt file is logged and also
    /// yields an empty set. Never fatal to startup.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No ledger at {}, starting empty", path.display());
            return Self::new();
        }

        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(list) => Self {
                    entries: list.into_iter().collect(),
                },
                Err(e) => {
                    log::warn!("Ledger at {} is corrupt ({}), starting empty", path.display(), e);
                    Self::new()
                }
            },
            Err(e) => {
                log::warn!("Cannot read ledger at {} ({}), starting empty", path.display(), e);
                Self::new()
            }
        }
    }

    /// Overwrite the ledger file wholesale.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ThumbError::LedgerIo(format!("{}: {}", parent.display(), e)))?;
        }
        let mut list: Vec<&String> = self.entries.iter().collect();
        list.sort();
        let text = serde_json::to_string(&list)
            .map_err(|e| ThumbError::LedgerIo(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| ThumbError::LedgerIo(format!("{}: {}", path.display(), e)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn insert(&mut self, key: &str) {
        self.entries.insert(key.to_string());
    }

    pub fn evict(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ledger.json");

        let mut ledger = CompletionLedger::new();
        ledger.insert("/mnt/nas/a.mp4");
        ledger.insert("/mnt/nas/b.mp4");
        ledger.save(&path).unwrap();

        let loaded = CompletionLedger::load(&path);
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("/mnt/nas/a.mp4"));
        assert!(loaded.contains("/mnt/nas/b.mp4"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let ledger = CompletionLedger::load(&tmp.path().join("nope.json"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ledger.json");
        std::fs::write(&path, "{not json").unwrap();
        let ledger = CompletionLedger::load(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_evict() {
        let mut ledger = CompletionLedger::new();
        ledger.insert("/a.mp4");
        ledger.evict("/a.mp4");
        ledger.evict("/never-there.mp4");
        assert!(ledger.is_empty());
    }
}
