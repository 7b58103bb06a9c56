//! usnscope - NTFS USN Change Journal timelines
//!
//! Parses the raw `$UsnJrnl:$J` stream of an NTFS volume and correlates its
//! records with a directory walk of the same volume, producing a
//! deduplicated, journal-ordered timeline of file-system changes.
//!
//! # Features
//!
//! - **Resynchronizing reader**: skips sparse padding, reports truncated and
//!   unsupported records without ever stalling
//! - **Aggregation**: back-to-back records for the same change become one event
//! - **Deleted file recovery**: paths of vanished files are rebuilt from their
//!   parent directory
//!
//! # Example
//!
//! ```no_run
//! use usnscope::{build_timeline, DirectoryEntryIndex, ListingSource, RootStat, TimelineConfig, VolumeSource};
//!
//! fn main() -> usnscope::Result<()> {
//!     let source = ListingSource::new("$J", "walk.jsonl", RootStat::default());
//!
//!     let journal = source.read_journal()?;
//!     let index = DirectoryEntryIndex::from_source(&source)?;
//!     let report = build_timeline(&journal, &index, &TimelineConfig::default())?;
//!
//!     for event in &report.events {
//!         println!("{} {} {:?}", event.timestamp, event.path, event.changes);
//!     }
//!     println!("Dropped: {}", report.stats.dropped);
//!
//!     Ok(())
//! }
//! ```

pub mod dirent;
pub mod error;
pub mod logging;
pub mod ntfs;
pub mod source;
pub mod timeline;

// Re-export main types
pub use dirent::{DirectoryEntry, DirectoryEntryIndex, EntryType};
pub use error::{Result, TimelineError};
pub use source::{ListingSource, RootStat, VolumeSource};
pub use timeline::{
    build_timeline, timeline_from_source, Timeline, TimelineConfig, TimelineCorrelator,
    TimelineEvent, TimelineReport, TimelineStats,
};

// Re-export journal types that users might need
pub use ntfs::{
    parse_journal, usn_journal, AggregatedEvent, CorruptedRecord, CorruptionKind, JournalEntry,
    JournalReader, JournalStats, RecordAggregator, UsnRecord,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format bytes as human-readable string
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format an optional size, `-` when unknown
pub fn format_optional_size(bytes: Option<u64>) -> String {
    bytes.map(format_size).unwrap_or_else(|| "-".to_string())
}

/// Format a Windows FILETIME as a human-readable date string
pub fn format_filetime(filetime: u64) -> String {
    ntfs::filetime_to_datetime(filetime)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
        .unwrap_or_else(|| "invalid".to_string())
}
