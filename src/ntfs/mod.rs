//! NTFS USN Change Journal support
//!
//! This module provides:
//! - On-disk USN record layouts and flag vocabularies
//! - A resynchronizing reader for raw `$UsnJrnl:$J` streams
//! - Aggregation of back-to-back records into change events

pub mod structs;
pub mod usn;

// Re-export commonly used types
pub use structs::{
    filetime_to_datetime, unpack_flags, FileReference, RecordHeader, UsnRecordV2, NTFS_ROOT_RECORD,
};
pub use usn::{
    parse_journal, usn_journal, AggregatedEvent, CorruptedRecord, CorruptionKind, JournalEntry,
    JournalReader, JournalStats, RecordAggregator, UsnRecord,
};
