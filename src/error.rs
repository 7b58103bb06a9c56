//! Error types for usnscope
//!
//! Only structurally unusable input aborts a parse. Individual bad records and
//! unresolvable events are reported through counters and diagnostics instead.

use thiserror::Error;

/// Main error type for usnscope operations
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Journal buffer too small: needed {needed} bytes, got {got}")]
    JournalTooShort { needed: usize, got: usize },

    #[error("Corrupted USN record #{index} at offset {offset}: {detail}")]
    CorruptedRecord {
        index: u64,
        offset: usize,
        detail: String,
    },

    #[error("File {0} not found")]
    LookupFailed(String),

    #[error("Strict validation failed: {corrupted} corrupted records, {dropped} unresolved events")]
    StrictValidation { corrupted: u64, dropped: u64 },

    #[error("Invalid directory listing at line {line}: {source}")]
    InvalidListing {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for usnscope operations
pub type Result<T> = std::result::Result<T, TimelineError>;

impl TimelineError {
    /// Check if this error is recoverable (the timeline can continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TimelineError::CorruptedRecord { .. } | TimelineError::LookupFailed(_)
        )
    }
}
