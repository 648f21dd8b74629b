//! Durable conversation-history storage
//!
//! Histories are stored as a JSON turn list. Saves go through a temp file in
//! the same directory plus an atomic rename, so a failed write never corrupts
//! the previous durable copy. Loads are tolerant: a missing, empty, or
//! malformed file is treated as no history at all.

use std::path::{Path, PathBuf};

use super::history::Turn;

/// Persists and restores the ordered turn list for one session
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store backed by the given file path
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted turn list
    ///
    /// Returns `None` when the file is missing, empty, or malformed —
    /// corruption never aborts startup.
    pub fn load(&self) -> Option<Vec<Turn>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read history");
                return None;
            }
        };

        if content.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<Vec<Turn>>(&content) {
            Ok(turns) if turns.is_empty() => None,
            Ok(turns) => Some(turns),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "malformed history file, starting fresh"
                );
                None
            }
        }
    }

    /// Persist the full turn list
    ///
    /// # Errors
    ///
    /// Returns error if the write or rename fails; the previous durable copy
    /// is left intact in that case.
    pub fn save(&self, turns: &[Turn]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(turns)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), turns = turns.len(), "history saved");
        Ok(())
    }
}
