//! Persisted scan history
//!
//! A bounded, newest-first list of past scan results held in a single
//! string-keyed JSON slot on disk. Loaded once at startup; every append
//! rewrites the whole truncated document through a temp-file rename, so a
//! reader never observes a partially-written state.

use crate::models::HistoryEntry;
use crate::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Maximum number of retained entries
pub const HISTORY_CAPACITY: usize = 5;

/// Durable document shape; the field name is the fixed storage key
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    dog_scan_history: Vec<HistoryEntry>,
}

/// Bounded durable history store
pub struct HistoryStore {
    path: PathBuf,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Load durable state, once at startup
    ///
    /// Missing or corrupt durable state is an empty history, never fatal.
    pub async fn load(&self) {
        let mut loaded = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<HistoryDocument>(&content) {
                Ok(doc) => doc.dog_scan_history,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Corrupt history document, starting with empty history"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No history document yet");
                Vec::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read history document, starting with empty history"
                );
                Vec::new()
            }
        };

        loaded.truncate(HISTORY_CAPACITY);

        let mut entries = self.entries.write().await;
        *entries = loaded;
        debug!(entries = entries.len(), "History loaded");
    }

    /// Insert at the front, trim to capacity, persist the whole document
    pub async fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(0, entry);
        entries.truncate(HISTORY_CAPACITY);
        self.persist(&entries)
    }

    /// Entries newest first
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        let doc = HistoryDocument {
            dog_scan_history: entries.to_vec(),
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| ScanError::Storage(format!("serialize history failed: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ScanError::Storage(format!("create history dir failed: {}", e)))?;
            }
        }

        // Replace the slot atomically: write a sibling temp file, then rename
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| ScanError::Storage(format!("write history failed: {}", e)))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| ScanError::Storage(format!("replace history failed: {}", e)))?;

        debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "History persisted"
        );
        Ok(())
    }
}
