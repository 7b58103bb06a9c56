//! Timeline Correlation
//!
//! Joins aggregated journal events against the directory entry index and
//! emits the final timeline in journal order.

use crate::dirent::{DirectoryEntry, DirectoryEntryIndex};
use crate::error::{Result, TimelineError};
use crate::logging;
use crate::ntfs::{AggregatedEvent, JournalReader, JournalStats, RecordAggregator};
use crate::source::VolumeSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;

// ============================================================================
// Timeline Configuration
// ============================================================================

/// Configuration for timeline generation
#[derive(Debug, Clone, Default)]
pub struct TimelineConfig {
    /// Fail when any record was corrupted or any event could not be resolved
    pub strict: bool,
    /// Only parse this many leading journal bytes
    pub max_journal_bytes: Option<usize>,
}

impl TimelineConfig {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_journal_bytes(mut self, max: usize) -> Self {
        self.max_journal_bytes = Some(max);
        self
    }

    fn cap<'a>(&self, journal: &'a [u8]) -> &'a [u8] {
        match self.max_journal_bytes {
            Some(max) if journal.len() > max => {
                logging::warn(
                    "TIMELINE",
                    &format!("Journal capped at {} of {} bytes", max, journal.len()),
                );
                &journal[..max]
            }
            _ => journal,
        }
    }
}

// ============================================================================
// Timeline Event
// ============================================================================

/// One entry of the file-system timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    /// MFT record number, the NTFS equivalent of an inode
    pub file_id: u64,
    pub path: String,
    /// Size in bytes, if recoverable
    pub size: Option<u64>,
    /// Whether the file still exists on the volume
    pub allocated: bool,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<&'static str>,
    pub attributes: Vec<&'static str>,
}

impl TimelineEvent {
    fn new(event: AggregatedEvent, dirent: &DirectoryEntry) -> Self {
        Self {
            file_id: event.file_id,
            path: dirent.path.clone(),
            size: dirent.size,
            allocated: dirent.allocated,
            timestamp: event.timestamp,
            changes: event.reasons,
            attributes: event.attributes,
        }
    }
}

// ============================================================================
// Correlator
// ============================================================================

/// Resolves aggregated events to directory entries
#[derive(Debug, Clone, Copy)]
pub struct TimelineCorrelator<'a> {
    index: &'a DirectoryEntryIndex,
}

impl<'a> TimelineCorrelator<'a> {
    pub fn new(index: &'a DirectoryEntryIndex) -> Self {
        Self { index }
    }

    /// Find the entry an event refers to.
    ///
    /// First an entry of the object itself whose path ends with the event
    /// name; failing that, a virtual unallocated entry under the first
    /// directory entry of the parent.
    pub fn resolve(&self, event: &AggregatedEvent) -> Result<Cow<'a, DirectoryEntry>> {
        let index = self.index;

        if let Some(dirent) = index
            .get(event.file_id)
            .iter()
            .find(|dirent| dirent.ends_with_name(&event.name))
        {
            return Ok(Cow::Borrowed(dirent));
        }

        index
            .get(event.parent_file_id)
            .iter()
            .find(|dirent| dirent.is_directory())
            .map(|parent| Cow::Owned(parent.deleted_child(event.file_id, &event.name)))
            .ok_or_else(|| TimelineError::LookupFailed(event.name.clone()))
    }

    pub fn correlate(&self, event: AggregatedEvent) -> Result<TimelineEvent> {
        let dirent = self.resolve(&event)?;
        Ok(TimelineEvent::new(event, &dirent))
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// Counters for a timeline pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimelineStats {
    pub journal: JournalStats,
    /// Events written to the timeline
    pub emitted: u64,
    /// Events dropped because neither object nor parent resolved
    pub dropped: u64,
}

/// Lazy timeline over a journal buffer.
///
/// Yields events in journal order; unresolvable events are skipped and
/// counted.
pub struct Timeline<'a> {
    events: RecordAggregator<JournalReader<'a>>,
    correlator: TimelineCorrelator<'a>,
    emitted: u64,
    dropped: u64,
}

impl<'a> Timeline<'a> {
    pub fn new(journal: &'a [u8], index: &'a DirectoryEntryIndex) -> Result<Self> {
        Ok(Self {
            events: RecordAggregator::new(JournalReader::new(journal)?),
            correlator: TimelineCorrelator::new(index),
            emitted: 0,
            dropped: 0,
        })
    }

    pub fn stats(&self) -> TimelineStats {
        TimelineStats {
            journal: self.events.stats(),
            emitted: self.emitted,
            dropped: self.dropped,
        }
    }
}

impl Iterator for Timeline<'_> {
    type Item = TimelineEvent;

    fn next(&mut self) -> Option<TimelineEvent> {
        for event in self.events.by_ref() {
            let (file_id, parent_file_id) = (event.file_id, event.parent_file_id);
            match self.correlator.correlate(event) {
                Ok(timeline_event) => {
                    self.emitted += 1;
                    return Some(timeline_event);
                }
                Err(TimelineError::LookupFailed(name)) => {
                    self.dropped += 1;
                    logging::log_lookup_failure(file_id, parent_file_id, &name);
                }
                Err(e) => {
                    self.dropped += 1;
                    logging::debug("TIMELINE", &e.to_string());
                }
            }
        }
        None
    }
}

/// Eagerly built timeline plus its counters
#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub events: Vec<TimelineEvent>,
    pub stats: TimelineStats,
}

/// Build the full timeline for a journal buffer and a directory index
pub fn build_timeline(
    journal: &[u8],
    index: &DirectoryEntryIndex,
    config: &TimelineConfig,
) -> Result<TimelineReport> {
    let journal = config.cap(journal);

    logging::debug("TIMELINE", "Generating timeline.");
    let mut timeline = Timeline::new(journal, index)?;
    let events: Vec<_> = timeline.by_ref().collect();
    let stats = timeline.stats();

    logging::info(
        "TIMELINE",
        &format!(
            "{} records, {} corrupted, {} events, {} emitted, {} dropped",
            stats.journal.records,
            stats.journal.corrupted,
            stats.journal.events,
            stats.emitted,
            stats.dropped
        ),
    );

    if config.strict && (stats.journal.corrupted > 0 || stats.dropped > 0) {
        return Err(TimelineError::StrictValidation {
            corrupted: stats.journal.corrupted,
            dropped: stats.dropped,
        });
    }

    Ok(TimelineReport { events, stats })
}

/// Read the journal and walk the volume through `source`, then build the timeline
pub fn timeline_from_source<S: VolumeSource + ?Sized>(
    source: &S,
    config: &TimelineConfig,
) -> Result<TimelineReport> {
    logging::separator("TIMELINE");
    logging::debug("TIMELINE", "Extracting Update Sequence Number journal.");
    let journal = source.read_journal()?;

    logging::debug("TIMELINE", "Parsing File System content.");
    let index = DirectoryEntryIndex::from_source(source)?;
    logging::debug(
        "TIMELINE",
        &format!(
            "Indexed {} entries across {} inodes",
            index.len(),
            index.inode_count()
        ),
    );

    build_timeline(&journal, &index, config)
}
