//! Directory entries and the storage tree.
//!
//! Every storage keeps its children in a red-black tree of sibling links.
//! [`DirectoryTree::parse`] flattens those trees into ordered child lists once,
//! so lookups never follow raw sibling ids afterwards.

use crate::common::binary::decode_utf16le;
use crate::common::error::{Error, Result};
use crate::ole::consts::*;
use fixedbitset::FixedBitSet;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE directory entry structure (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    entry_type: u8,
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Empty,
    Storage,
    Stream,
    Root,
}

impl EntryKind {
    fn from_raw(value: u8) -> Self {
        match value {
            STGTY_STORAGE => EntryKind::Storage,
            STGTY_STREAM => EntryKind::Stream,
            STGTY_ROOT => EntryKind::Root,
            _ => EntryKind::Empty,
        }
    }
}

/// One parsed directory entry.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Index in the directory stream
    pub sid: u32,
    /// Entry name (UTF-16 decoded to UTF-8)
    pub name: String,
    pub kind: EntryKind,
    pub left: u32,
    pub right: u32,
    pub child: u32,
    /// CLSID formatted as a GUID, empty when all zeros
    pub clsid: String,
    pub state_bits: u32,
    /// Creation time (FILETIME)
    pub created: u64,
    /// Modification time (FILETIME)
    pub modified: u64,
    /// First sector of the stream (or of the mini stream for the root)
    pub start_sector: u32,
    /// Declared size in bytes
    pub size: u64,
    /// Child sids in sibling-tree order (storages and root only)
    pub children: Vec<u32>,
}

impl DirectoryEntry {
    pub fn is_stream(&self) -> bool {
        self.kind == EntryKind::Stream
    }

    /// Storages and the root can hold children.
    pub fn is_storage(&self) -> bool {
        matches!(self.kind, EntryKind::Storage | EntryKind::Root)
    }

    fn matches(&self, name: &str) -> bool {
        self.name
            .chars()
            .flat_map(char::to_lowercase)
            .eq(name.chars().flat_map(char::to_lowercase))
    }
}

/// All directory entries of a container, linked into a tree at sid 0.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    entries: Vec<DirectoryEntry>,
}

impl DirectoryTree {
    /// Parse the concatenated directory chain.
    pub fn parse(dir_data: &[u8], sector_size: usize) -> Result<Self> {
        let mut entries = dir_data
            .chunks_exact(DIRENTRY_SIZE)
            .enumerate()
            .map(|(sid, chunk)| parse_entry(chunk, sid as u32, sector_size))
            .collect::<Result<Vec<_>>>()?;

        match entries.first() {
            Some(root) if root.kind == EntryKind::Root => {},
            _ => {
                return Err(Error::ContainerCorrupt(
                    "directory does not start with a root entry".to_string(),
                ));
            },
        }

        link_children(&mut entries)?;
        Ok(Self { entries })
    }

    pub fn root(&self) -> &DirectoryEntry {
        &self.entries[0]
    }

    pub fn get(&self, sid: u32) -> Option<&DirectoryEntry> {
        self.entries.get(sid as usize)
    }

    /// Number of directory slots, including empty ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Children of a storage in sibling-tree order.
    pub fn children<'a>(
        &'a self,
        parent: &'a DirectoryEntry,
    ) -> impl Iterator<Item = &'a DirectoryEntry> + 'a {
        parent
            .children
            .iter()
            .filter_map(move |&sid| self.entries.get(sid as usize))
    }

    /// Case-insensitive child lookup.
    pub fn find_child<'a>(
        &'a self,
        parent: &'a DirectoryEntry,
        name: &str,
    ) -> Option<&'a DirectoryEntry> {
        self.children(parent).find(|entry| entry.matches(name))
    }

    /// Resolve a path from the root. The empty path is the root itself.
    pub fn resolve(&self, path: &[&str]) -> Option<&DirectoryEntry> {
        let mut current = self.root();
        for name in path {
            if !current.is_storage() {
                return None;
            }
            current = self.find_child(current, name)?;
        }
        Some(current)
    }

    /// Paths of every stream below the root.
    pub fn stream_paths(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        let mut stack = vec![(self.root(), Vec::new())];
        while let Some((storage, prefix)) = stack.pop() {
            for child in self.children(storage) {
                let mut path = prefix.clone();
                path.push(child.name.clone());
                if child.is_storage() {
                    stack.push((child, path));
                } else if child.is_stream() {
                    streams.push(path);
                }
            }
        }
        streams.sort();
        streams
    }
}

fn parse_entry(data: &[u8], sid: u32, sector_size: usize) -> Result<DirectoryEntry> {
    let raw = RawDirectoryEntry::read_from_bytes(data)
        .map_err(|_| Error::ContainerCorrupt(format!("unreadable directory entry {}", sid)))?;

    let kind = EntryKind::from_raw(raw.entry_type);
    let name_len = raw.name_len.get() as usize;
    if kind != EntryKind::Empty && name_len > 64 {
        log::warn!(
            "directory entry {} declares a {}-byte name, clamping to 64",
            sid,
            name_len
        );
    }
    let name = decode_utf16le(&raw.name[..name_len.saturating_sub(2).min(64)]);

    // Version 3 files may leave garbage in the high half of the size.
    let size = if sector_size == SECTOR_SIZE_V3 {
        raw.stream_size.get() & 0xFFFF_FFFF
    } else {
        raw.stream_size.get()
    };

    Ok(DirectoryEntry {
        sid,
        name,
        kind,
        left: raw.sid_left.get(),
        right: raw.sid_right.get(),
        child: raw.sid_child.get(),
        clsid: format_clsid(&raw.clsid),
        state_bits: raw.state_bits.get(),
        created: raw.creation_time.get(),
        modified: raw.modified_time.get(),
        start_sector: raw.start_sector.get(),
        size,
        children: Vec::new(),
    })
}

/// Flatten each storage's sibling tree into its child list.
///
/// Every entry may be reached at most once across the whole directory.
fn link_children(entries: &mut [DirectoryEntry]) -> Result<()> {
    let mut visited = FixedBitSet::with_capacity(entries.len());
    visited.insert(0);
    let mut storages = vec![0usize];

    while let Some(parent) = storages.pop() {
        let mut children = Vec::new();
        // In-order traversal: left subtree, node, right subtree.
        let mut stack: Vec<u32> = Vec::new();
        let mut current = entries[parent].child;
        loop {
            while current != NOSTREAM {
                let sid = current as usize;
                if sid >= entries.len() || entries[sid].kind == EntryKind::Empty {
                    return Err(Error::ContainerCorrupt(format!(
                        "storage {} links to invalid directory entry {}",
                        parent, current
                    )));
                }
                if visited.put(sid) {
                    return Err(Error::ContainerCorrupt(format!(
                        "directory entry {} is linked more than once",
                        current
                    )));
                }
                stack.push(current);
                current = entries[sid].left;
            }
            let Some(sid) = stack.pop() else { break };
            children.push(sid);
            if entries[sid as usize].is_storage() {
                storages.push(sid as usize);
            }
            current = entries[sid as usize].right;
        }
        entries[parent].children = children;
    }
    Ok(())
}

/// Format CLSID as a human-readable string
fn format_clsid(bytes: &[u8; 16]) -> String {
    if bytes.iter().all(|&b| b == 0) {
        return String::new();
    }

    format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u16::from_le_bytes([bytes[4], bytes[5]]),
        u16::from_le_bytes([bytes[6], bytes[7]]),
        bytes[8],
        bytes[9],
        bytes[10],
        bytes[11],
        bytes[12],
        bytes[13],
        bytes[14],
        bytes[15],
    )
}
