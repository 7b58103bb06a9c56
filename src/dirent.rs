//! Directory Entry Index
//!
//! Snapshot of a raw volume walk, keyed by inode (MFT record number).
//! Built once per correlation pass and only read afterwards.

use crate::error::Result;
use crate::source::{RootStat, VolumeSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Directory Entry
// ============================================================================

/// Kind of object a walk entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Other,
    /// Synthesized entries for objects no longer on the volume
    #[default]
    Unknown,
}

impl EntryType {
    /// Map a single-letter walk type code (`r` regular, `d` directory, ...)
    pub fn from_code(code: &str) -> Self {
        match code {
            "r" | "f" => EntryType::File,
            "d" => EntryType::Directory,
            "" | "-" | "u" => EntryType::Unknown,
            _ => EntryType::Other,
        }
    }
}

fn default_allocated() -> bool {
    true
}

/// One row of a raw volume walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub inode: u64,
    /// Full path from the volume root
    pub path: String,
    /// Size in bytes, `None` when unknown
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
    /// Live object, as opposed to an unlinked walk artifact
    #[serde(default = "default_allocated")]
    pub allocated: bool,
}

impl DirectoryEntry {
    pub fn new(
        inode: u64,
        path: impl Into<String>,
        size: Option<u64>,
        entry_type: EntryType,
        allocated: bool,
    ) -> Self {
        Self {
            inode,
            path: path.into(),
            size,
            entry_type,
            allocated,
        }
    }

    /// Entry for the volume root, which walks do not report themselves
    pub fn root(stat: &RootStat) -> Self {
        Self::new(
            stat.inode,
            stat.path.clone(),
            Some(stat.size),
            EntryType::Directory,
            true,
        )
    }

    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    /// True when the last path segment(s) equal `name`
    pub fn ends_with_name(&self, name: &str) -> bool {
        ends_with_segment(&self.path, name)
    }

    /// Virtual entry for a child that no longer exists under this directory
    pub fn deleted_child(&self, inode: u64, name: &str) -> Self {
        Self::new(
            inode,
            join_path(&self.path, name),
            None,
            EntryType::Unknown,
            false,
        )
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Suffix match on whole path segments: `/a/b.txt` ends with `b.txt`, not `.txt`
pub fn ends_with_segment(path: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    match path.strip_suffix(name) {
        Some("") => true,
        Some(prefix) => prefix.ends_with(is_separator),
        None => false,
    }
}

/// Join `name` onto `parent`, following the parent's separator style
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with(is_separator) {
        return format!("{}{}", parent, name);
    }

    let separator = if parent.contains('\\') && !parent.contains('/') {
        '\\'
    } else {
        '/'
    };
    format!("{}{}{}", parent, separator, name)
}

// ============================================================================
// Directory Entry Index
// ============================================================================

/// Inode → entries observed for it, in walk order
#[derive(Debug, Clone, Default)]
pub struct DirectoryEntryIndex {
    entries: HashMap<u64, Vec<DirectoryEntry>>,
    len: usize,
}

impl DirectoryEntryIndex {
    /// Index `root` followed by the walk's entries.
    pub fn build<I>(root: DirectoryEntry, walk: I) -> Self
    where
        I: IntoIterator<Item = DirectoryEntry>,
    {
        let mut index = Self::default();
        index.insert(root);
        for entry in walk {
            index.insert(entry);
        }
        index
    }

    /// Stat the root and walk the volume through `source`
    pub fn from_source<S: VolumeSource + ?Sized>(source: &S) -> Result<Self> {
        let root = DirectoryEntry::root(&source.stat_root()?);
        Ok(Self::build(root, source.walk()?))
    }

    fn insert(&mut self, entry: DirectoryEntry) {
        self.entries.entry(entry.inode).or_default().push(entry);
        self.len += 1;
    }

    /// Entries for `inode`, empty when the walk never saw it
    pub fn get(&self, inode: u64) -> &[DirectoryEntry] {
        self.entries.get(&inode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of indexed entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct inodes
    pub fn inode_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> DirectoryEntry {
        DirectoryEntry::root(&RootStat::new(5, 4096, "/"))
    }

    #[test]
    fn segment_suffix_matching() {
        assert!(ends_with_segment("/Users/x/a.txt", "a.txt"));
        assert!(ends_with_segment("C:\\Users\\x\\a.txt", "a.txt"));
        assert!(ends_with_segment("a.txt", "a.txt"));
        assert!(!ends_with_segment("/Users/x/ba.txt", "a.txt"));
        assert!(!ends_with_segment("/Users/x/a.txt.bak", "a.txt"));
        assert!(!ends_with_segment("/Users/x", ""));
    }

    #[test]
    fn join_follows_parent_style() {
        assert_eq!(join_path("/Users/x", "deleted.txt"), "/Users/x/deleted.txt");
        assert_eq!(join_path("C:\\Users\\x", "d.txt"), "C:\\Users\\x\\d.txt");
        assert_eq!(join_path("/", "d.txt"), "/d.txt");
        assert_eq!(join_path("C:\\", "d.txt"), "C:\\d.txt");
    }

    #[test]
    fn type_codes() {
        assert_eq!(EntryType::from_code("d"), EntryType::Directory);
        assert_eq!(EntryType::from_code("r"), EntryType::File);
        assert_eq!(EntryType::from_code("l"), EntryType::Other);
        assert_eq!(EntryType::from_code(""), EntryType::Unknown);
    }

    #[test]
    fn root_is_indexed_first() {
        let walk = vec![
            DirectoryEntry::new(5, "/.", Some(0), EntryType::Directory, true),
            DirectoryEntry::new(40, "/a.txt", Some(10), EntryType::File, true),
        ];
        let index = DirectoryEntryIndex::build(root(), walk);

        assert_eq!(index.len(), 3);
        assert_eq!(index.inode_count(), 2);
        assert_eq!(index.get(5)[0].path, "/");
        assert_eq!(index.get(5)[1].path, "/.");
        assert!(index.get(5)[0].allocated);
    }

    #[test]
    fn hard_links_keep_walk_order() {
        let walk = vec![
            DirectoryEntry::new(40, "/a/link1", Some(3), EntryType::File, true),
            DirectoryEntry::new(41, "/b", Some(0), EntryType::Directory, true),
            DirectoryEntry::new(40, "/b/link2", Some(3), EntryType::File, true),
        ];
        let index = DirectoryEntryIndex::build(root(), walk);

        let paths: Vec<_> = index.get(40).iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a/link1", "/b/link2"]);
        assert!(index.get(999).is_empty());
    }

    #[test]
    fn deleted_child_is_unallocated_and_sizeless() {
        let parent = DirectoryEntry::new(3, "/Users/x", Some(0), EntryType::Directory, true);
        let child = parent.deleted_child(7, "deleted.txt");
        assert_eq!(child.inode, 7);
        assert_eq!(child.path, "/Users/x/deleted.txt");
        assert_eq!(child.size, None);
        assert_eq!(child.entry_type, EntryType::Unknown);
        assert!(!child.allocated);
    }

    #[test]
    fn listing_defaults() {
        let entry: DirectoryEntry =
            serde_json::from_str(r#"{"inode": 9, "path": "/x", "type": "file"}"#).unwrap();
        assert_eq!(entry.size, None);
        assert!(entry.allocated);
        assert_eq!(entry.entry_type, EntryType::File);
    }
}
