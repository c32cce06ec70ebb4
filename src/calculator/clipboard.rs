//! Clipboard functionality for copying results and pasting operands.

use arboard::Clipboard;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Plain decimal numbers, optionally negative. Anything else is not pasted.
    static ref NUMERIC_PASTE: Regex = Regex::new(r"^-?\d*\.?\d+$").unwrap();
}

/// Error raised by the system clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Failed to access clipboard: {0}")]
    Access(#[source] arboard::Error),

    #[error("Failed to copy to clipboard: {0}")]
    Copy(#[source] arboard::Error),

    #[error("Failed to read clipboard: {0}")]
    Paste(#[source] arboard::Error),
}

/// Copy text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;

    clipboard
        .set_text(text.to_string())
        .map_err(ClipboardError::Copy)
}

/// Read a number from the system clipboard.
///
/// Returns `Ok(None)` if the clipboard holds something that is not a plain
/// decimal number.
pub fn paste_from_clipboard() -> Result<Option<String>, ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;
    let text = clipboard.get_text().map_err(ClipboardError::Paste)?;
    let text = text.trim();

    Ok(is_numeric_paste(text).then(|| text.to_string()))
}

/// Check if `text` is acceptable as a pasted operand.
pub fn is_numeric_paste(text: &str) -> bool {
    NUMERIC_PASTE.is_match(text)
}
