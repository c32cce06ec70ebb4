//! History entry representing a finished calculation.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::calculator::{CalcRecord, Mode};

/// A finished calculation as kept in the history list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The calculation, e.g. `12 AND 10`.
    pub expression: String,
    /// The result as displayed.
    pub result: String,
    /// The mode the calculation ran in.
    #[serde(default)]
    pub mode: Mode,
    /// Unix seconds when the entry was recorded.
    #[serde(default)]
    pub timestamp: u64,
}

impl HistoryEntry {
    /// Create a new history entry from a calculation record, stamped now.
    pub fn from_record(record: &CalcRecord) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            expression: record.expression.clone(),
            result: record.result.clone(),
            mode: record.mode,
            timestamp,
        }
    }

    /// An entry needs both an expression and a result to be worth keeping.
    pub fn is_valid(&self) -> bool {
        !self.expression.trim().is_empty() && !self.result.trim().is_empty()
    }

    /// Single-line rendering, `expression = result`.
    pub fn summary(&self) -> String {
        format!("{} = {}", self.expression, self.result)
    }
}
