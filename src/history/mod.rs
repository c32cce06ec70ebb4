//! Calculation history.
//!
//! The engine reports finished calculations through its record callback;
//! the host forwards them here. Entries are kept newest first, capped, and
//! written to a JSON file after every change.

mod entry;
mod store;

pub use entry::HistoryEntry;
pub use store::{History, HistoryError, MAX_HISTORY_ITEMS};
