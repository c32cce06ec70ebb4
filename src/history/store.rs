//! Capped, newest-first calculation history with JSON persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::entry::HistoryEntry;
use crate::calculator::CalcRecord;

/// Default number of entries kept.
pub const MAX_HISTORY_ITEMS: usize = 100;

/// Error raised while persisting history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to read history from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write history to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid history data: {0}")]
    Format(#[from] serde_json::Error),
}

/// Calculation history, newest entry first.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    path: Option<PathBuf>,
    max_items: usize,
}

impl History {
    /// A history that is never written to disk.
    pub fn in_memory(max_items: usize) -> Self {
        Self {
            entries: Vec::new(),
            path: None,
            max_items,
        }
    }

    /// Open the history stored at `path`.
    ///
    /// A missing file starts an empty history. Unreadable or malformed data is
    /// logged and discarded.
    pub fn open(path: impl Into<PathBuf>, max_items: usize) -> Self {
        let path = path.into();
        let mut entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "discarding stored history");
                Vec::new()
            }
        };
        entries.truncate(max_items);
        debug!(path = %path.display(), count = entries.len(), "history loaded");

        Self {
            entries,
            path: Some(path),
            max_items,
        }
    }

    /// Default location of the history file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("calcdeck").join("history.json"))
    }

    /// Record a finished calculation. Blank records are dropped.
    pub fn add(&mut self, record: &CalcRecord) -> bool {
        let entry = HistoryEntry::from_record(record);
        if !entry.is_valid() {
            return false;
        }

        self.entries.insert(0, entry);
        self.entries.truncate(self.max_items);
        self.persist();
        true
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Remove the entry at `index`. Out-of-range indices are ignored.
    pub fn delete(&mut self, index: usize) -> Option<HistoryEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the history to its file, creating parent directories.
    pub fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Write {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| HistoryError::Write {
            path: path.clone(),
            source,
        })
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!(error = %err, "failed to save history");
        }
    }
}

fn load_entries(path: &Path) -> Result<Vec<HistoryEntry>, HistoryError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(HistoryError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Mode;

    fn record(expression: &str, result: &str) -> CalcRecord {
        CalcRecord {
            expression: expression.to_string(),
            result: result.to_string(),
            mode: Mode::Standard,
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = History::in_memory(MAX_HISTORY_ITEMS);
        history.add(&record("1 + 1", "2"));
        history.add(&record("2 + 2", "4"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].result, "4");
        assert_eq!(history.entries()[1].result, "2");
    }

    #[test]
    fn test_capped() {
        let mut history = History::in_memory(MAX_HISTORY_ITEMS);
        for i in 0..105 {
            history.add(&record(&format!("{} + 0", i), &i.to_string()));
        }
        assert_eq!(history.len(), 100);
        assert_eq!(history.entries()[0].result, "104");
        assert_eq!(history.entries()[99].result, "5");
    }

    #[test]
    fn test_blank_records_rejected() {
        let mut history = History::in_memory(MAX_HISTORY_ITEMS);
        assert!(!history.add(&record("", "2")));
        assert!(!history.add(&record("1 + 1", " ")));
        assert!(history.is_empty());
    }

    #[test]
    fn test_delete_and_clear() {
        let mut history = History::in_memory(MAX_HISTORY_ITEMS);
        history.add(&record("1 + 1", "2"));
        history.add(&record("2 + 2", "4"));

        assert!(history.delete(5).is_none());
        assert_eq!(history.delete(0).map(|e| e.result), Some("4".to_string()));
        assert_eq!(history.len(), 1);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let history = History::in_memory(10);
        assert!(history.save().is_ok());
        assert!(history.path().is_none());
    }
}
