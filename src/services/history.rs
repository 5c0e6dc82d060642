//! History store — completed question/answer exchanges.
//!
//! The chat panel commits each exchange once its reveal finishes. The store
//! is append-only; readers get copies.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history record malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait HistoryStore: Send + Sync {
    /// Append one completed exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write.
    fn add(&self, record: HistoryRecord) -> Result<(), HistoryError>;
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl HistoryStore for MemoryHistory {
    fn add(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        records.push(record);
        Ok(())
    }
}

// =============================================================================
// JSON LINES FILE
// =============================================================================

/// One JSON object per line, appended on every commit.
#[derive(Debug)]
pub struct JsonlHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistory {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record. A missing file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a record.
    pub fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

impl HistoryStore for JsonlHistory {
    fn add(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
