//! USN Journal Reader
//!
//! Decodes the raw `$UsnJrnl:$J` stream into typed records and folds
//! back-to-back records describing the same change into single events.

use crate::error::{Result, TimelineError};
use crate::logging;
use crate::ntfs::structs::*;
use chrono::{DateTime, Utc};
use memmap2::Mmap;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::Path;

// ============================================================================
// Journal Entries
// ============================================================================

/// One decoded journal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsnRecord {
    pub record_length: u32,
    pub major_version: u16,
    pub minor_version: u16,
    /// MFT record number (lower 48 bits of the file reference)
    pub file_id: u64,
    pub file_id_sequence: u16,
    pub parent_file_id: u64,
    pub parent_file_id_sequence: u16,
    pub usn: i64,
    pub timestamp: DateTime<Utc>,
    pub reasons: Vec<&'static str>,
    pub source_info: Vec<&'static str>,
    pub security_id: u32,
    pub attributes: Vec<&'static str>,
    pub file_name: String,
}

impl UsnRecord {
    /// Record version as `major.minor`
    pub fn version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }

    fn from_v2(header: &RecordHeader, body: &[u8]) -> Option<Self> {
        let raw = UsnRecordV2::from_bytes(body)?;

        Some(Self {
            record_length: raw.record_length,
            major_version: header.major_version,
            minor_version: header.minor_version,
            file_id: raw.file_reference.record_number,
            file_id_sequence: raw.file_reference.sequence,
            parent_file_id: raw.parent_file_reference.record_number,
            parent_file_id_sequence: raw.parent_file_reference.sequence,
            usn: raw.usn,
            timestamp: filetime_to_datetime(raw.timestamp)?,
            reasons: unpack_flags(raw.reason, REASONS),
            source_info: unpack_flags(raw.source_info, SOURCE_INFO),
            security_id: raw.security_id,
            attributes: unpack_flags(raw.file_attributes, ATTRIBUTES),
            file_name: raw.file_name,
        })
    }
}

/// Why a record could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorruptionKind {
    /// Declared length runs past the end of the buffer
    Truncated,
    /// No decoder for this major version
    UnsupportedVersion(u16),
    /// Fields or file name out of bounds for the declared length
    Malformed,
    /// Zero length with non-zero bytes in the same 8-byte unit
    StrayPadding,
}

impl fmt::Display for CorruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptionKind::Truncated => write!(f, "record truncated by end of journal"),
            CorruptionKind::UnsupportedVersion(v) => write!(f, "unsupported major version {}", v),
            CorruptionKind::Malformed => write!(f, "malformed record body"),
            CorruptionKind::StrayPadding => write!(f, "non-zero bytes inside padding"),
        }
    }
}

/// Marker for undecodable data at a given position in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorruptedRecord {
    /// Ordinal of this entry within the stream
    pub index: u64,
    /// Byte offset of the record header
    pub offset: usize,
    pub kind: CorruptionKind,
}

impl CorruptedRecord {
    pub fn to_error(&self) -> TimelineError {
        TimelineError::CorruptedRecord {
            index: self.index,
            offset: self.offset,
            detail: self.kind.to_string(),
        }
    }
}

/// Item produced by [`JournalReader`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entry", rename_all = "lowercase")]
pub enum JournalEntry {
    Record(UsnRecord),
    Corrupted(CorruptedRecord),
}

impl JournalEntry {
    pub fn is_corrupted(&self) -> bool {
        matches!(self, JournalEntry::Corrupted(_))
    }

    /// Turn a corrupted entry into an error, for callers that want strict parsing
    pub fn into_result(self) -> Result<UsnRecord> {
        match self {
            JournalEntry::Record(record) => Ok(record),
            JournalEntry::Corrupted(corrupted) => Err(corrupted.to_error()),
        }
    }
}

// ============================================================================
// Version dispatch
// ============================================================================

type RecordDecoder = fn(&RecordHeader, &[u8]) -> Option<UsnRecord>;

/// Supported record versions. Versions 3 and 4 use 128-bit file references
/// and are reported as unsupported.
static RECORD_DECODERS: &[(u16, RecordDecoder)] = &[(2, UsnRecord::from_v2)];

fn decoder_for(major_version: u16) -> Option<RecordDecoder> {
    RECORD_DECODERS
        .iter()
        .find(|(version, _)| *version == major_version)
        .map(|&(_, decoder)| decoder)
}

// ============================================================================
// Journal Reader
// ============================================================================

enum Padding {
    Resumed,
    Exhausted,
    Stray(JournalEntry),
}

/// Pull-based reader over a journal buffer.
///
/// Every step either yields an entry or moves the cursor forward, so the
/// reader terminates on any input. Once exhausted it stays exhausted.
pub struct JournalReader<'a> {
    data: &'a [u8],
    offset: usize,
    index: u64,
    finished: bool,
}

impl<'a> JournalReader<'a> {
    /// Create a reader over `data`.
    ///
    /// Fails only when the buffer cannot hold a single record header.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(TimelineError::JournalTooShort {
                needed: RECORD_HEADER_SIZE,
                got: data.len(),
            });
        }

        Ok(Self {
            data,
            offset: 0,
            index: 0,
            finished: false,
        })
    }

    /// Current byte offset of the cursor
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn corrupted(&mut self, offset: usize, kind: CorruptionKind) -> JournalEntry {
        let record = CorruptedRecord {
            index: self.index,
            offset,
            kind,
        };
        self.index += 1;
        logging::log_corrupted_record(record.index, offset, &kind.to_string());
        JournalEntry::Corrupted(record)
    }

    fn skip_padding(&mut self) -> Padding {
        let start = self.offset;
        let Some(first) = self.data[start..].iter().position(|&b| b != 0) else {
            logging::log_padding_skip(start, self.data.len());
            return Padding::Exhausted;
        };

        let found = start + first;
        let aligned = found - found % RECORD_ALIGNMENT;
        if aligned > start {
            logging::log_padding_skip(start, aligned);
            self.offset = aligned;
            return Padding::Resumed;
        }

        let entry = self.corrupted(start, CorruptionKind::StrayPadding);
        let next = (start / RECORD_ALIGNMENT + 1) * RECORD_ALIGNMENT;
        self.offset = next.min(self.data.len());
        Padding::Stray(entry)
    }

    fn read_record(&mut self, header: &RecordHeader) -> JournalEntry {
        let data = self.data;
        let start = self.offset;
        let end = start.checked_add(header.record_length as usize);

        let Some(body) = end.and_then(|end| data.get(start..end)) else {
            self.finished = true;
            return self.corrupted(start, CorruptionKind::Truncated);
        };
        self.offset = start + body.len();

        let Some(decode) = decoder_for(header.major_version) else {
            return self.corrupted(start, CorruptionKind::UnsupportedVersion(header.major_version));
        };

        match decode(header, body) {
            Some(record) => {
                self.index += 1;
                JournalEntry::Record(record)
            }
            None => self.corrupted(start, CorruptionKind::Malformed),
        }
    }
}

impl Iterator for JournalReader<'_> {
    type Item = JournalEntry;

    fn next(&mut self) -> Option<JournalEntry> {
        let data = self.data;
        while !self.finished {
            let remaining = &data[self.offset..];
            if remaining.is_empty() {
                self.finished = true;
                break;
            }

            let Some(header) = RecordHeader::from_bytes(remaining) else {
                // Tail shorter than a header
                self.finished = true;
                if remaining.iter().all(|&b| b == 0) {
                    break;
                }
                return Some(self.corrupted(self.offset, CorruptionKind::Truncated));
            };

            if header.record_length == 0 {
                match self.skip_padding() {
                    Padding::Resumed => continue,
                    Padding::Exhausted => {
                        self.finished = true;
                        break;
                    }
                    Padding::Stray(entry) => return Some(entry),
                }
            }

            return Some(self.read_record(&header));
        }

        None
    }
}

/// Map a journal file and decode all of its entries
pub fn usn_journal(path: impl AsRef<Path>) -> Result<Vec<JournalEntry>> {
    let file = File::open(path.as_ref())?;
    // SAFETY: the mapping is read-only and dropped before returning; entries
    // own their data.
    let map = unsafe { Mmap::map(&file)? };
    Ok(JournalReader::new(&map)?.collect())
}

// ============================================================================
// Record Aggregation
// ============================================================================

/// A run of consecutive records describing one change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedEvent {
    pub file_id: u64,
    pub parent_file_id: u64,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub reasons: Vec<&'static str>,
    pub attributes: Vec<&'static str>,
}

impl AggregatedEvent {
    fn from_record(record: UsnRecord) -> Self {
        Self {
            file_id: record.file_id,
            parent_file_id: record.parent_file_id,
            name: record.file_name,
            timestamp: record.timestamp,
            reasons: record.reasons,
            attributes: record.attributes,
        }
    }

    /// Same `(file_id, file_name, timestamp)` grouping key
    fn same_change(&self, record: &UsnRecord) -> bool {
        self.file_id == record.file_id
            && self.timestamp == record.timestamp
            && self.name == record.file_name
    }

    fn merge(&mut self, record: &UsnRecord) {
        merge_flags(&mut self.reasons, &record.reasons);
        merge_flags(&mut self.attributes, &record.attributes);
    }
}

fn merge_flags(into: &mut Vec<&'static str>, from: &[&'static str]) {
    for flag in from {
        if !into.contains(flag) {
            into.push(flag);
        }
    }
}

/// Counters collected while reading and aggregating a journal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JournalStats {
    /// Successfully decoded records
    pub records: u64,
    /// Corrupted entries skipped
    pub corrupted: u64,
    /// Aggregated events produced
    pub events: u64,
}

impl JournalStats {
    /// Entries observed in the stream, good or bad
    pub fn total(&self) -> u64 {
        self.records + self.corrupted
    }

    pub fn has_corruption(&self) -> bool {
        self.corrupted > 0
    }
}

/// Folds contiguous records with the same grouping key into one event.
///
/// Records with the same key separated by any other record stay separate.
pub struct RecordAggregator<I> {
    entries: I,
    pending: Option<UsnRecord>,
    stats: JournalStats,
    exhausted: bool,
}

impl<I: Iterator<Item = JournalEntry>> RecordAggregator<I> {
    pub fn new(entries: I) -> Self {
        Self {
            entries,
            pending: None,
            stats: JournalStats::default(),
            exhausted: false,
        }
    }

    pub fn stats(&self) -> JournalStats {
        self.stats
    }

    fn next_record(&mut self) -> Option<UsnRecord> {
        if self.exhausted {
            return None;
        }

        for entry in self.entries.by_ref() {
            match entry {
                JournalEntry::Record(record) => {
                    self.stats.records += 1;
                    return Some(record);
                }
                JournalEntry::Corrupted(_) => self.stats.corrupted += 1,
            }
        }

        self.exhausted = true;
        if self.stats.has_corruption() {
            logging::debug(
                "USN",
                &format!(
                    "Corrupted records in UsnJrnl ({} of {}), some events might be missing.",
                    self.stats.corrupted,
                    self.stats.total()
                ),
            );
        }
        None
    }
}

impl<I: Iterator<Item = JournalEntry>> Iterator for RecordAggregator<I> {
    type Item = AggregatedEvent;

    fn next(&mut self) -> Option<AggregatedEvent> {
        let first = match self.pending.take() {
            Some(record) => record,
            None => self.next_record()?,
        };
        let mut event = AggregatedEvent::from_record(first);

        while let Some(record) = self.next_record() {
            if event.same_change(&record) {
                event.merge(&record);
            } else {
                self.pending = Some(record);
                break;
            }
        }

        self.stats.events += 1;
        Some(event)
    }
}

/// Parse and aggregate a whole journal buffer
pub fn parse_journal(data: &[u8]) -> Result<(Vec<AggregatedEvent>, JournalStats)> {
    let mut aggregator = RecordAggregator::new(JournalReader::new(data)?);
    let events: Vec<_> = aggregator.by_ref().collect();
    Ok((events, aggregator.stats()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a V2 record, padded to 8-byte alignment like the journal does
    pub(crate) fn v2_record(
        file_ref: u64,
        parent_ref: u64,
        usn: i64,
        filetime: u64,
        reason: u32,
        attributes: u32,
        name: &str,
    ) -> Vec<u8> {
        let name_bytes: Vec<u8> = name.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let unpadded = USN_RECORD_V2_MIN_SIZE + name_bytes.len();
        let length = unpadded.div_ceil(RECORD_ALIGNMENT) * RECORD_ALIGNMENT;

        let mut data = Vec::with_capacity(length);
        data.extend_from_slice(&(length as u32).to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&file_ref.to_le_bytes());
        data.extend_from_slice(&parent_ref.to_le_bytes());
        data.extend_from_slice(&usn.to_le_bytes());
        data.extend_from_slice(&filetime.to_le_bytes());
        data.extend_from_slice(&reason.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x101u32.to_le_bytes());
        data.extend_from_slice(&attributes.to_le_bytes());
        data.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        data.extend_from_slice(&(USN_RECORD_V2_MIN_SIZE as u16).to_le_bytes());
        data.extend_from_slice(&name_bytes);
        data.resize(length, 0);
        data
    }

    fn simple(file_id: u64, name: &str, filetime: u64, reason: u32) -> Vec<u8> {
        v2_record(file_id, NTFS_ROOT_RECORD, 0, filetime, reason, 0x20, name)
    }

    fn unsupported(major_version: u16, length: u32) -> Vec<u8> {
        let mut data = vec![0u8; length as usize];
        data[0..4].copy_from_slice(&length.to_le_bytes());
        data[4..6].copy_from_slice(&major_version.to_le_bytes());
        data
    }

    fn records(entries: &[JournalEntry]) -> Vec<&UsnRecord> {
        entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Record(r) => Some(r),
                JournalEntry::Corrupted(_) => None,
            })
            .collect()
    }

    #[test]
    fn decodes_v2_fields() {
        let data = v2_record(
            0x0002_0000_0000_0040,
            0x0001_0000_0000_0005,
            4096,
            FILETIME_UNIX_EPOCH,
            0x8000_0100,
            0x20,
            "a.txt",
        );
        let entries: Vec<_> = JournalReader::new(&data).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let JournalEntry::Record(record) = &entries[0] else {
            panic!("expected a record, got {:?}", entries[0]);
        };
        assert_eq!(record.file_id, 0x40);
        assert_eq!(record.file_id_sequence, 2);
        assert_eq!(record.parent_file_id, 5);
        assert_eq!(record.parent_file_id_sequence, 1);
        assert_eq!(record.usn, 4096);
        assert_eq!(record.timestamp.timestamp(), 0);
        assert_eq!(record.reasons, vec!["FILE_CREATE", "CLOSE"]);
        assert_eq!(record.source_info, vec![NO_FLAG]);
        assert_eq!(record.security_id, 0x101);
        assert_eq!(record.attributes, vec!["ARCHIVE"]);
        assert_eq!(record.file_name, "a.txt");
        assert_eq!(record.version(), "2.0");
        assert_eq!(record.record_length as usize, data.len());
    }

    #[test]
    fn create_and_delete_bits_decode_together() {
        let data = simple(7, "x", FILETIME_UNIX_EPOCH, 0x300);
        let entry = JournalReader::new(&data).unwrap().next().unwrap();
        let record = entry.into_result().unwrap();
        assert_eq!(record.reasons, vec!["FILE_CREATE", "FILE_DELETE"]);
    }

    #[test]
    fn empty_buffer_is_fatal() {
        assert!(matches!(
            JournalReader::new(&[]),
            Err(TimelineError::JournalTooShort { needed: 8, got: 0 })
        ));
        assert!(JournalReader::new(&[1, 2, 3]).is_err());
    }

    #[test]
    fn skips_zero_padding() {
        let mut data = vec![0u8; 64];
        data.extend(simple(9, "after_padding.log", FILETIME_UNIX_EPOCH, 0x2));

        let entries: Vec<_> = JournalReader::new(&data).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_corrupted());
        assert_eq!(records(&entries)[0].file_name, "after_padding.log");
    }

    #[test]
    fn trailing_padding_ends_stream() {
        let mut data = simple(9, "a", FILETIME_UNIX_EPOCH, 0x2);
        data.extend(vec![0u8; 4096]);

        let mut reader = JournalReader::new(&data).unwrap();
        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        assert!(reader.is_finished());
        assert!(reader.next().is_none());
    }

    #[test]
    fn all_zero_buffer_yields_nothing() {
        let data = vec![0u8; 128];
        assert_eq!(JournalReader::new(&data).unwrap().count(), 0);
    }

    #[test]
    fn padding_resumes_on_alignment_boundary() {
        // A record starting at 72; its first non-zero byte is the length at 72.
        let mut data = vec![0u8; 72];
        data.extend(simple(3, "b", FILETIME_UNIX_EPOCH, 0x1));

        let mut reader = JournalReader::new(&data).unwrap();
        assert!(!reader.next().unwrap().is_corrupted());
        assert_eq!(reader.offset(), data.len());
    }

    #[test]
    fn stray_bytes_in_padding_make_progress() {
        // Zero length, but the version bytes of the same unit are set.
        let mut data = vec![0u8; 16];
        data[5] = 0xFF;
        data.extend(simple(3, "c", FILETIME_UNIX_EPOCH, 0x1));

        let entries: Vec<_> = JournalReader::new(&data).unwrap().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            JournalEntry::Corrupted(CorruptedRecord {
                index: 0,
                offset: 0,
                kind: CorruptionKind::StrayPadding,
            })
        );
        assert_eq!(records(&entries)[0].file_name, "c");
    }

    #[test]
    fn truncated_tail_yields_one_corrupted_and_stops() {
        let mut data = simple(1, "ok", FILETIME_UNIX_EPOCH, 0x1);
        let first_len = data.len();
        let mut tail = simple(2, "cut", FILETIME_UNIX_EPOCH, 0x1);
        tail.truncate(tail.len() - 10);
        data.extend(tail);

        let entries: Vec<_> = JournalReader::new(&data).unwrap().collect();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_corrupted());
        assert_eq!(
            entries[1],
            JournalEntry::Corrupted(CorruptedRecord {
                index: 1,
                offset: first_len,
                kind: CorruptionKind::Truncated,
            })
        );
    }

    #[test]
    fn short_non_zero_tail_is_truncated() {
        let mut data = simple(1, "ok", FILETIME_UNIX_EPOCH, 0x1);
        data.extend([0x10, 0, 0, 0]);

        let entries: Vec<_> = JournalReader::new(&data).unwrap().collect();
        assert_eq!(entries.len(), 2);
        assert!(matches!(
            entries[1],
            JournalEntry::Corrupted(CorruptedRecord {
                kind: CorruptionKind::Truncated,
                ..
            })
        ));
    }

    #[test]
    fn unsupported_version_advances_by_record_length() {
        let mut data = unsupported(3, 80);
        data.extend(simple(4, "next", FILETIME_UNIX_EPOCH, 0x1));

        let mut reader = JournalReader::new(&data).unwrap();
        let first = reader.next().unwrap();
        assert_eq!(
            first,
            JournalEntry::Corrupted(CorruptedRecord {
                index: 0,
                offset: 0,
                kind: CorruptionKind::UnsupportedVersion(3),
            })
        );
        assert_eq!(reader.offset(), 80);

        let second = reader.next().unwrap().into_result().unwrap();
        assert_eq!(second.file_name, "next");
        assert!(reader.next().is_none());
    }

    #[test]
    fn version_four_and_unknown_versions_are_unsupported() {
        let mut data = unsupported(4, 40);
        data.extend(unsupported(9, 16));

        let kinds: Vec<_> = JournalReader::new(&data)
            .unwrap()
            .map(|e| match e {
                JournalEntry::Corrupted(c) => c.kind,
                JournalEntry::Record(r) => panic!("unexpected record {:?}", r),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                CorruptionKind::UnsupportedVersion(4),
                CorruptionKind::UnsupportedVersion(9)
            ]
        );
    }

    #[test]
    fn malformed_v2_body_is_skipped() {
        let mut bad = simple(1, "name", FILETIME_UNIX_EPOCH, 0x1);
        // Point the name past the end of the record.
        bad[v2_layout::FILE_NAME_OFFSET..v2_layout::FILE_NAME_OFFSET + 2]
            .copy_from_slice(&0x200u16.to_le_bytes());
        let bad_len = bad.len();
        bad.extend(simple(2, "good", FILETIME_UNIX_EPOCH, 0x1));

        let mut reader = JournalReader::new(&bad).unwrap();
        assert!(matches!(
            reader.next(),
            Some(JournalEntry::Corrupted(CorruptedRecord {
                kind: CorruptionKind::Malformed,
                ..
            }))
        ));
        assert_eq!(reader.offset(), bad_len);
        assert_eq!(reader.next().unwrap().into_result().unwrap().file_name, "good");
    }

    #[test]
    fn corrupted_entry_converts_to_error() {
        let data = unsupported(3, 16);
        let err = JournalReader::new(&data)
            .unwrap()
            .next()
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("unsupported major version 3"));
    }

    #[test]
    fn aggregates_only_contiguous_runs() {
        let t = FILETIME_UNIX_EPOCH;
        let mut data = Vec::new();
        data.extend(simple(10, "a.txt", t, 0x100));
        data.extend(simple(10, "a.txt", t, 0x2));
        data.extend(simple(11, "b.txt", t, 0x100));
        data.extend(simple(10, "a.txt", t, 0x8000_0000));

        let (events, stats) = parse_journal(&data).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].reasons, vec!["FILE_CREATE", "DATA_EXTEND"]);
        assert_eq!(events[1].name, "b.txt");
        assert_eq!(events[2].reasons, vec!["CLOSE"]);
        assert_eq!(
            stats,
            JournalStats {
                records: 4,
                corrupted: 0,
                events: 3
            }
        );
    }

    #[test]
    fn different_timestamps_stay_separate() {
        let t = FILETIME_UNIX_EPOCH;
        let mut data = simple(10, "a.txt", t, 0x100);
        data.extend(simple(10, "a.txt", t + 10, 0x2));

        let (events, _) = parse_journal(&data).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn aggregation_unions_attributes_and_keeps_first_ids() {
        let t = FILETIME_UNIX_EPOCH;
        let mut data = v2_record(10, 5, 0, t, 0x100, 0x20, "a.txt");
        data.extend(v2_record(10, 6, 64, t, 0x100, 0x22, "a.txt"));

        let (events, _) = parse_journal(&data).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].parent_file_id, 5);
        assert_eq!(events[0].reasons, vec!["FILE_CREATE"]);
        assert_eq!(events[0].attributes, vec!["ARCHIVE", "HIDDEN"]);
    }

    #[test]
    fn aggregator_counts_corrupted_records() {
        let t = FILETIME_UNIX_EPOCH;
        let mut data = simple(10, "a.txt", t, 0x100);
        data.extend(unsupported(3, 24));
        data.extend(simple(10, "a.txt", t, 0x2));

        let (events, stats) = parse_journal(&data).unwrap();
        // The corrupted entry is discarded, so the two records are adjacent.
        assert_eq!(events.len(), 1);
        assert_eq!(stats.corrupted, 1);
        assert_eq!(stats.total(), 3);
        assert!(stats.has_corruption());
    }
}
