//! USN journal on-disk structures and constants
//!
//! Layouts are kept as explicit offset tables and read through a
//! little-endian cursor, so a new record version only needs a new table.

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::io::Cursor;

// ============================================================================
// USN Journal Constants
// ============================================================================

/// Records in `$UsnJrnl:$J` start on 8-byte boundaries
pub const RECORD_ALIGNMENT: usize = 8;

/// `RecordLength` + `MajorVersion` + `MinorVersion`
pub const RECORD_HEADER_SIZE: usize = 8;

/// Fixed part of a USN_RECORD_V2, up to the file name
pub const USN_RECORD_V2_MIN_SIZE: usize = 60;

/// Lower 48 bits of a file reference hold the MFT record number
pub const FILE_REFERENCE_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;

/// MFT record number of the volume root directory
pub const NTFS_ROOT_RECORD: u64 = 5;

/// Difference between 1601 and 1970 in 100-nanosecond intervals
pub const FILETIME_UNIX_EPOCH: u64 = 116_444_736_000_000_000;

/// Field offsets of the common record header
pub mod header_layout {
    pub const RECORD_LENGTH: usize = 0;
    pub const MAJOR_VERSION: usize = 4;
    pub const MINOR_VERSION: usize = 6;
}

/// Field offsets of USN_RECORD_V2, relative to the start of the record
pub mod v2_layout {
    pub const FILE_REFERENCE: usize = 8;
    pub const PARENT_FILE_REFERENCE: usize = 16;
    pub const USN: usize = 24;
    pub const TIMESTAMP: usize = 32;
    pub const REASON: usize = 40;
    pub const SOURCE_INFO: usize = 44;
    pub const SECURITY_ID: usize = 48;
    pub const FILE_ATTRIBUTES: usize = 52;
    pub const FILE_NAME_LENGTH: usize = 56;
    pub const FILE_NAME_OFFSET: usize = 58;
}

// ============================================================================
// Little-endian field access
// ============================================================================

fn cursor_at(data: &[u8], offset: usize) -> Option<Cursor<&[u8]>> {
    data.get(offset..).map(Cursor::new)
}

fn read_u16_at(data: &[u8], offset: usize) -> Option<u16> {
    cursor_at(data, offset)?.read_u16::<LittleEndian>().ok()
}

fn read_u32_at(data: &[u8], offset: usize) -> Option<u32> {
    cursor_at(data, offset)?.read_u32::<LittleEndian>().ok()
}

fn read_u64_at(data: &[u8], offset: usize) -> Option<u64> {
    cursor_at(data, offset)?.read_u64::<LittleEndian>().ok()
}

fn read_i64_at(data: &[u8], offset: usize) -> Option<i64> {
    cursor_at(data, offset)?.read_i64::<LittleEndian>().ok()
}

/// Decode a UTF-16LE byte run, replacing invalid code units
pub fn decode_utf16le(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

// ============================================================================
// Record Header
// ============================================================================

/// Header shared by every USN record version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_length: u32,
    pub major_version: u16,
    pub minor_version: u16,
}

impl RecordHeader {
    /// Parse the 8-byte header at the start of `data`
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < RECORD_HEADER_SIZE {
            return None;
        }

        Some(Self {
            record_length: read_u32_at(data, header_layout::RECORD_LENGTH)?,
            major_version: read_u16_at(data, header_layout::MAJOR_VERSION)?,
            minor_version: read_u16_at(data, header_layout::MINOR_VERSION)?,
        })
    }
}

// ============================================================================
// File Reference
// ============================================================================

/// 64-bit NTFS file reference: 48-bit record number plus 16-bit sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileReference {
    pub record_number: u64,
    pub sequence: u16,
}

impl FileReference {
    pub fn from_raw(raw: u64) -> Self {
        Self {
            record_number: raw & FILE_REFERENCE_MASK,
            sequence: (raw >> 48) as u16,
        }
    }

    pub fn to_raw(self) -> u64 {
        (self.record_number & FILE_REFERENCE_MASK) | ((self.sequence as u64) << 48)
    }
}

// ============================================================================
// USN_RECORD_V2
// ============================================================================

/// Raw fields of a USN_RECORD_V2, before flag and timestamp decoding
#[derive(Debug, Clone)]
pub struct UsnRecordV2 {
    pub record_length: u32,
    pub file_reference: FileReference,
    pub parent_file_reference: FileReference,
    pub usn: i64,
    pub timestamp: u64,
    pub reason: u32,
    pub source_info: u32,
    pub security_id: u32,
    pub file_attributes: u32,
    pub file_name_length: u16,
    pub file_name_offset: u16,
    pub file_name: String,
}

impl UsnRecordV2 {
    /// Parse a V2 record from exactly `RecordLength` bytes.
    ///
    /// The file name offset is relative to the record start and the name must
    /// lie inside the record.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < USN_RECORD_V2_MIN_SIZE {
            return None;
        }

        let record_length = read_u32_at(data, header_layout::RECORD_LENGTH)?;
        let file_name_length = read_u16_at(data, v2_layout::FILE_NAME_LENGTH)?;
        let file_name_offset = read_u16_at(data, v2_layout::FILE_NAME_OFFSET)?;

        let name_start = file_name_offset as usize;
        let name_end = name_start + file_name_length as usize;
        let file_name = decode_utf16le(data.get(name_start..name_end)?);

        Some(Self {
            record_length,
            file_reference: FileReference::from_raw(read_u64_at(data, v2_layout::FILE_REFERENCE)?),
            parent_file_reference: FileReference::from_raw(read_u64_at(
                data,
                v2_layout::PARENT_FILE_REFERENCE,
            )?),
            usn: read_i64_at(data, v2_layout::USN)?,
            timestamp: read_u64_at(data, v2_layout::TIMESTAMP)?,
            reason: read_u32_at(data, v2_layout::REASON)?,
            source_info: read_u32_at(data, v2_layout::SOURCE_INFO)?,
            security_id: read_u32_at(data, v2_layout::SECURITY_ID)?,
            file_attributes: read_u32_at(data, v2_layout::FILE_ATTRIBUTES)?,
            file_name_length,
            file_name_offset,
            file_name,
        })
    }
}

// ============================================================================
// Flag vocabularies
// ============================================================================

/// Name used when a flag field is zero and the table defines an entry for it
pub const NO_FLAG: &str = "NONE";

// USN Reason flags
pub mod usn_reason {
    pub const DATA_OVERWRITE: u32 = 0x00000001;
    pub const DATA_EXTEND: u32 = 0x00000002;
    pub const DATA_TRUNCATION: u32 = 0x00000004;
    pub const NAMED_DATA_OVERWRITE: u32 = 0x00000010;
    pub const NAMED_DATA_EXTEND: u32 = 0x00000020;
    pub const NAMED_DATA_TRUNCATION: u32 = 0x00000040;
    pub const FILE_CREATE: u32 = 0x00000100;
    pub const FILE_DELETE: u32 = 0x00000200;
    pub const EA_CHANGE: u32 = 0x00000400;
    pub const SECURITY_CHANGE: u32 = 0x00000800;
    pub const RENAME_OLD_NAME: u32 = 0x00001000;
    pub const RENAME_NEW_NAME: u32 = 0x00002000;
    pub const INDEXABLE_CHANGE: u32 = 0x00004000;
    pub const BASIC_INFO_CHANGE: u32 = 0x00008000;
    pub const HARD_LINK_CHANGE: u32 = 0x00010000;
    pub const COMPRESSION_CHANGE: u32 = 0x00020000;
    pub const ENCRYPTION_CHANGE: u32 = 0x00040000;
    pub const OBJECT_ID_CHANGE: u32 = 0x00080000;
    pub const REPARSE_POINT_CHANGE: u32 = 0x00100000;
    pub const STREAM_CHANGE: u32 = 0x00200000;
    pub const CLOSE: u32 = 0x80000000;
}

// USN Source Info flags
pub mod usn_source_info {
    pub const DATA_MANAGEMENT: u32 = 0x00000001;
    pub const AUXILIARY_DATA: u32 = 0x00000002;
    pub const REPLICATION_MANAGEMENT: u32 = 0x00000004;
}

pub mod file_attributes {
    pub const READONLY: u32 = 0x00000001;
    pub const HIDDEN: u32 = 0x00000002;
    pub const SYSTEM: u32 = 0x00000004;
    pub const DIRECTORY: u32 = 0x00000010;
    pub const ARCHIVE: u32 = 0x00000020;
    pub const DEVICE: u32 = 0x00000040;
    pub const NORMAL: u32 = 0x00000080;
    pub const TEMPORARY: u32 = 0x00000100;
    pub const SPARSE_FILE: u32 = 0x00000200;
    pub const REPARSE_POINT: u32 = 0x00000400;
    pub const COMPRESSED: u32 = 0x00000800;
    pub const OFFLINE: u32 = 0x00001000;
    pub const NOT_CONTENT_INDEXED: u32 = 0x00002000;
    pub const ENCRYPTED: u32 = 0x00004000;
    pub const INTEGRITY_STREAM: u32 = 0x00008000;
    pub const VIRTUAL: u32 = 0x00010000;
    pub const NO_SCRUB_DATA: u32 = 0x00020000;
}

/// Bit → name table, kept in ascending bit order
pub type FlagTable = &'static [(u32, &'static str)];

pub static REASONS: FlagTable = &[
    (0, NO_FLAG),
    (usn_reason::DATA_OVERWRITE, "DATA_OVERWRITE"),
    (usn_reason::DATA_EXTEND, "DATA_EXTEND"),
    (usn_reason::DATA_TRUNCATION, "DATA_TRUNCATION"),
    (usn_reason::NAMED_DATA_OVERWRITE, "NAMED_DATA_OVERWRITE"),
    (usn_reason::NAMED_DATA_EXTEND, "NAMED_DATA_EXTEND"),
    (usn_reason::NAMED_DATA_TRUNCATION, "NAMED_DATA_TRUNCATION"),
    (usn_reason::FILE_CREATE, "FILE_CREATE"),
    (usn_reason::FILE_DELETE, "FILE_DELETE"),
    (usn_reason::EA_CHANGE, "EA_CHANGE"),
    (usn_reason::SECURITY_CHANGE, "SECURITY_CHANGE"),
    (usn_reason::RENAME_OLD_NAME, "RENAME_OLD_NAME"),
    (usn_reason::RENAME_NEW_NAME, "RENAME_NEW_NAME"),
    (usn_reason::INDEXABLE_CHANGE, "INDEXABLE_CHANGE"),
    (usn_reason::BASIC_INFO_CHANGE, "BASIC_INFO_CHANGE"),
    (usn_reason::HARD_LINK_CHANGE, "HARD_LINK_CHANGE"),
    (usn_reason::COMPRESSION_CHANGE, "COMPRESSION_CHANGE"),
    (usn_reason::ENCRYPTION_CHANGE, "ENCRYPTION_CHANGE"),
    (usn_reason::OBJECT_ID_CHANGE, "OBJECT_ID_CHANGE"),
    (usn_reason::REPARSE_POINT_CHANGE, "REPARSE_POINT_CHANGE"),
    (usn_reason::STREAM_CHANGE, "STREAM_CHANGE"),
    (usn_reason::CLOSE, "CLOSE"),
];

pub static SOURCE_INFO: FlagTable = &[
    (0, NO_FLAG),
    (usn_source_info::DATA_MANAGEMENT, "DATA_MANAGEMENT"),
    (usn_source_info::AUXILIARY_DATA, "AUXILIARY_DATA"),
    (usn_source_info::REPLICATION_MANAGEMENT, "REPLICATION_MANAGEMENT"),
];

pub static ATTRIBUTES: FlagTable = &[
    (file_attributes::READONLY, "READONLY"),
    (file_attributes::HIDDEN, "HIDDEN"),
    (file_attributes::SYSTEM, "SYSTEM"),
    (file_attributes::DIRECTORY, "DIRECTORY"),
    (file_attributes::ARCHIVE, "ARCHIVE"),
    (file_attributes::DEVICE, "DEVICE"),
    (file_attributes::NORMAL, "NORMAL"),
    (file_attributes::TEMPORARY, "TEMPORARY"),
    (file_attributes::SPARSE_FILE, "SPARSE_FILE"),
    (file_attributes::REPARSE_POINT, "REPARSE_POINT"),
    (file_attributes::COMPRESSED, "COMPRESSED"),
    (file_attributes::OFFLINE, "OFFLINE"),
    (file_attributes::NOT_CONTENT_INDEXED, "NOT_CONTENT_INDEXED"),
    (file_attributes::ENCRYPTED, "ENCRYPTED"),
    (file_attributes::INTEGRITY_STREAM, "INTEGRITY_STREAM"),
    (file_attributes::VIRTUAL, "VIRTUAL"),
    (file_attributes::NO_SCRUB_DATA, "NO_SCRUB_DATA"),
];

/// Decode a bitmask into flag names.
///
/// An exact table match yields that single name; otherwise every known bit
/// that is set is reported, lowest bit first. Unknown bits are ignored.
pub fn unpack_flags(value: u32, table: FlagTable) -> Vec<&'static str> {
    if let Some(&(_, name)) = table.iter().find(|(bit, _)| *bit == value) {
        return vec![name];
    }

    table
        .iter()
        .filter(|(bit, _)| bit & value != 0)
        .map(|&(_, name)| name)
        .collect()
}

// ============================================================================
// FILETIME conversion utilities
// ============================================================================

/// Convert Windows FILETIME to a UTC instant with microsecond resolution
pub fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    let epoch = NaiveDate::from_ymd_opt(1601, 1, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    epoch.checked_add_signed(Duration::microseconds((filetime / 10) as i64))
}
