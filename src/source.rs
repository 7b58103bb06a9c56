//! Volume data sources
//!
//! The timeline needs three things from a volume: the raw journal bytes, a
//! full directory walk, and a stat of the root. Mounting and walking a disk is
//! someone else's job; anything that can hand over those three implements
//! [`VolumeSource`].

use crate::dirent::DirectoryEntry;
use crate::error::{Result, TimelineError};
use crate::logging;
use crate::ntfs::NTFS_ROOT_RECORD;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Result of stat'ing the volume root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootStat {
    pub inode: u64,
    pub size: u64,
    pub path: String,
}

impl RootStat {
    pub fn new(inode: u64, size: u64, path: impl Into<String>) -> Self {
        Self {
            inode,
            size,
            path: path.into(),
        }
    }
}

impl Default for RootStat {
    fn default() -> Self {
        Self::new(NTFS_ROOT_RECORD, 0, "/")
    }
}

/// Point-in-time view of a volume.
///
/// The journal and the walk must come from the same snapshot, otherwise paths
/// resolve silently wrong.
pub trait VolumeSource {
    /// Raw bytes of the `$UsnJrnl:$J` stream
    fn read_journal(&self) -> Result<Vec<u8>>;

    /// Every entry of a recursive walk, excluding the root itself
    fn walk(&self) -> Result<Vec<DirectoryEntry>>;

    fn stat_root(&self) -> Result<RootStat>;
}

// ============================================================================
// Listing Source
// ============================================================================

/// Offline export of a volume: an extracted `$J` file and a JSON-lines walk
/// listing with one [`DirectoryEntry`] per line.
#[derive(Debug, Clone)]
pub struct ListingSource {
    journal_path: PathBuf,
    listing_path: PathBuf,
    root: RootStat,
}

impl ListingSource {
    pub fn new(
        journal_path: impl Into<PathBuf>,
        listing_path: impl Into<PathBuf>,
        root: RootStat,
    ) -> Self {
        Self {
            journal_path: journal_path.into(),
            listing_path: listing_path.into(),
            root,
        }
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn listing_path(&self) -> &Path {
        &self.listing_path
    }
}

impl VolumeSource for ListingSource {
    fn read_journal(&self) -> Result<Vec<u8>> {
        if !self.journal_path.is_file() {
            return Err(TimelineError::InvalidPath(
                self.journal_path.display().to_string(),
            ));
        }
        Ok(std::fs::read(&self.journal_path)?)
    }

    fn walk(&self) -> Result<Vec<DirectoryEntry>> {
        let file = File::open(&self.listing_path)?;
        let entries = read_listing(BufReader::new(file))?;
        logging::debug(
            "SOURCE",
            &format!(
                "Read {} entries from {}",
                entries.len(),
                self.listing_path.display()
            ),
        );
        Ok(entries)
    }

    fn stat_root(&self) -> Result<RootStat> {
        Ok(self.root.clone())
    }
}

/// Parse a JSON-lines walk listing. Blank lines are skipped.
pub fn read_listing<R: BufRead>(reader: R) -> Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let entry = serde_json::from_str(&line).map_err(|source| TimelineError::InvalidListing {
            line: number + 1,
            source,
        })?;
        entries.push(entry);
    }

    Ok(entries)
}
