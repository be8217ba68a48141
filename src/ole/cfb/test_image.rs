//! In-memory compound file images for tests.
//!
//! Sectors are laid out in a fixed order so tests can reason about ids:
//! FAT sectors first, then regular stream data in insertion order, then the
//! mini stream, the Mini-FAT and finally the directory.

use crate::ole::consts::*;
use std::collections::HashMap;

struct Node {
    name: String,
    kind: u8,
    data: Vec<u8>,
    children: Vec<usize>,
    regular: bool,
}

/// Where the builder placed things.
pub(crate) struct Layout {
    pub sector_size: usize,
    pub starts: HashMap<String, u32>,
    pub first_dir_sector: u32,
    pub ministream_start: u32,
}

impl Layout {
    /// First sector of the stream at `path` (mini sector id for mini streams).
    pub fn start_of(&self, path: &str) -> u32 {
        self.starts[path]
    }

    /// File offset of the FAT slot describing `sector`.
    pub fn fat_entry_offset(&self, sector: u32) -> usize {
        let per = self.sector_size / 4;
        let fat_sector = sector as usize / per;
        (fat_sector + 1) * self.sector_size + (sector as usize % per) * 4
    }

    /// Overwrite the FAT successor of `sector` inside `image`.
    pub fn patch_fat(&self, image: &mut [u8], sector: u32, next: u32) {
        let offset = self.fat_entry_offset(sector);
        image[offset..offset + 4].copy_from_slice(&next.to_le_bytes());
    }

    /// File offset of the directory entry with index `sid`.
    pub fn dir_entry_offset(&self, sid: usize) -> usize {
        (self.first_dir_sector as usize + 1) * self.sector_size + sid * DIRENTRY_SIZE
    }
}

pub(crate) struct ImageBuilder {
    sector_size: usize,
    nodes: Vec<Node>,
}

impl ImageBuilder {
    pub fn new(sector_size: usize) -> Self {
        Self {
            sector_size,
            nodes: vec![Node {
                name: "Root Entry".to_string(),
                kind: STGTY_ROOT,
                data: Vec::new(),
                children: Vec::new(),
                regular: false,
            }],
        }
    }

    /// Add a stream; small streams go to the mini stream.
    pub fn stream(mut self, path: &str, data: &[u8]) -> Self {
        self.insert(path, data, false);
        self
    }

    /// Add a stream that always uses regular sectors.
    pub fn regular_stream(mut self, path: &str, data: &[u8]) -> Self {
        self.insert(path, data, true);
        self
    }

    fn insert(&mut self, path: &str, data: &[u8], regular: bool) {
        let parts: Vec<&str> = path.split('/').collect();
        let mut parent = 0;
        for storage in &parts[..parts.len() - 1] {
            let existing = self.nodes[parent]
                .children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].name == *storage);
            parent = match existing {
                Some(idx) => idx,
                None => {
                    self.nodes.push(Node {
                        name: storage.to_string(),
                        kind: STGTY_STORAGE,
                        data: Vec::new(),
                        children: Vec::new(),
                        regular: false,
                    });
                    let idx = self.nodes.len() - 1;
                    self.nodes[parent].children.push(idx);
                    idx
                },
            };
        }
        self.nodes.push(Node {
            name: parts[parts.len() - 1].to_string(),
            kind: STGTY_STREAM,
            data: data.to_vec(),
            children: Vec::new(),
            regular,
        });
        let idx = self.nodes.len() - 1;
        self.nodes[parent].children.push(idx);
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }

    pub fn build_with_layout(&self) -> (Vec<u8>, Layout) {
        let ss = self.sector_size;
        let per = ss / 4;
        let sectors_for = |len: usize| len.div_ceil(ss);

        let mut mini_stream = Vec::new();
        let mut minifat: Vec<u32> = Vec::new();
        let mut mini_starts = HashMap::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.kind != STGTY_STREAM
                || node.regular
                || node.data.is_empty()
                || node.data.len() as u64 >= MINI_STREAM_CUTOFF
            {
                continue;
            }
            let first = (mini_stream.len() / MINI_SECTOR_SIZE) as u32;
            let count = node.data.len().div_ceil(MINI_SECTOR_SIZE) as u32;
            for k in 0..count {
                minifat.push(if k + 1 < count { first + k + 1 } else { ENDOFCHAIN });
            }
            mini_stream.extend_from_slice(&node.data);
            mini_stream.resize(mini_stream.len().div_ceil(MINI_SECTOR_SIZE) * MINI_SECTOR_SIZE, 0);
            mini_starts.insert(idx, first);
        }

        let regular: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| {
                let n = &self.nodes[i];
                n.kind == STGTY_STREAM && !n.data.is_empty() && !mini_starts.contains_key(&i)
            })
            .collect();

        let dir_sectors = sectors_for(self.nodes.len() * DIRENTRY_SIZE).max(1);
        let minifat_sectors = sectors_for(minifat.len() * 4);
        let ministream_sectors = sectors_for(mini_stream.len());
        let body: usize = regular
            .iter()
            .map(|&i| sectors_for(self.nodes[i].data.len()))
            .sum::<usize>()
            + dir_sectors
            + minifat_sectors
            + ministream_sectors;
        let mut fat_sectors = 1;
        while fat_sectors * per < body + fat_sectors {
            fat_sectors += 1;
        }
        let total = fat_sectors + body;

        let mut fat = vec![FREESECT; fat_sectors * per];
        for slot in fat.iter_mut().take(fat_sectors) {
            *slot = FATSECT;
        }
        let mut next = fat_sectors as u32;

        let mut starts = HashMap::new();
        let mut regular_starts = HashMap::new();
        for &i in &regular {
            let first = allocate(&mut fat, &mut next, sectors_for(self.nodes[i].data.len()));
            regular_starts.insert(i, first);
        }
        let ministream_start = allocate(&mut fat, &mut next, ministream_sectors);
        let minifat_start = allocate(&mut fat, &mut next, minifat_sectors);
        let dir_start = allocate(&mut fat, &mut next, dir_sectors);

        let mut image = vec![0u8; ss * (total + 1)];
        write_header(
            &mut image,
            ss,
            fat_sectors as u32,
            dir_start,
            minifat_start,
            minifat_sectors as u32,
        );

        for (i, value) in fat.iter().enumerate() {
            let offset = ss + i * 4;
            image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }

        for (&i, &first) in &regular_starts {
            let offset = (first as usize + 1) * ss;
            let data = &self.nodes[i].data;
            image[offset..offset + data.len()].copy_from_slice(data);
        }
        if ministream_start != ENDOFCHAIN {
            let offset = (ministream_start as usize + 1) * ss;
            image[offset..offset + mini_stream.len()].copy_from_slice(&mini_stream);
        }
        if minifat_start != ENDOFCHAIN {
            let mut offset = (minifat_start as usize + 1) * ss;
            for value in minifat.iter().chain(std::iter::repeat_n(
                &FREESECT,
                minifat_sectors * per - minifat.len(),
            )) {
                image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
                offset += 4;
            }
        }

        let dir_base = (dir_start as usize + 1) * ss;
        for slot in 0..dir_sectors * ss / DIRENTRY_SIZE {
            let entry = &mut image[dir_base + slot * DIRENTRY_SIZE..][..DIRENTRY_SIZE];
            match self.nodes.get(slot) {
                Some(node) => {
                    let (start, size) = if slot == 0 {
                        (ministream_start, mini_stream.len() as u64)
                    } else if let Some(&s) = mini_starts.get(&slot) {
                        (s, node.data.len() as u64)
                    } else if let Some(&s) = regular_starts.get(&slot) {
                        (s, node.data.len() as u64)
                    } else {
                        (ENDOFCHAIN, 0)
                    };
                    let right = self.next_sibling(slot);
                    let child = node.children.first().map_or(NOSTREAM, |&c| c as u32);
                    write_entry(entry, &node.name, node.kind, right, child, start, size);
                },
                None => write_entry(entry, "", STGTY_EMPTY, NOSTREAM, NOSTREAM, 0, 0),
            }
        }

        for (idx, node) in self.nodes.iter().enumerate().skip(1) {
            if node.kind != STGTY_STREAM {
                continue;
            }
            let start = mini_starts
                .get(&idx)
                .or_else(|| regular_starts.get(&idx))
                .copied()
                .unwrap_or(ENDOFCHAIN);
            starts.insert(self.path_of(idx), start);
        }

        (
            image,
            Layout {
                sector_size: ss,
                starts,
                first_dir_sector: dir_start,
                ministream_start,
            },
        )
    }

    fn parent_of(&self, idx: usize) -> Option<usize> {
        self.nodes.iter().position(|n| n.children.contains(&idx))
    }

    fn next_sibling(&self, idx: usize) -> u32 {
        let Some(parent) = self.parent_of(idx) else {
            return NOSTREAM;
        };
        let siblings = &self.nodes[parent].children;
        let pos = siblings.iter().position(|&c| c == idx).unwrap_or(0);
        siblings.get(pos + 1).map_or(NOSTREAM, |&c| c as u32)
    }

    fn path_of(&self, idx: usize) -> String {
        let mut parts = vec![self.nodes[idx].name.clone()];
        let mut current = idx;
        while let Some(parent) = self.parent_of(current) {
            if parent == 0 {
                break;
            }
            parts.push(self.nodes[parent].name.clone());
            current = parent;
        }
        parts.reverse();
        parts.join("/")
    }
}

fn allocate(fat: &mut [u32], next: &mut u32, count: usize) -> u32 {
    if count == 0 {
        return ENDOFCHAIN;
    }
    let first = *next;
    for k in 0..count as u32 {
        fat[(first + k) as usize] = if k + 1 < count as u32 {
            first + k + 1
        } else {
            ENDOFCHAIN
        };
    }
    *next += count as u32;
    first
}

fn write_header(
    image: &mut [u8],
    sector_size: usize,
    num_fat_sectors: u32,
    first_dir_sector: u32,
    first_minifat_sector: u32,
    num_minifat_sectors: u32,
) {
    let put16 = |image: &mut [u8], at: usize, v: u16| image[at..at + 2].copy_from_slice(&v.to_le_bytes());
    let put32 = |image: &mut [u8], at: usize, v: u32| image[at..at + 4].copy_from_slice(&v.to_le_bytes());

    image[0..8].copy_from_slice(MAGIC);
    put16(image, 0x18, 0x003E);
    put16(image, 0x1A, if sector_size == 512 { 3 } else { 4 });
    put16(image, 0x1C, BYTE_ORDER_LE);
    put16(image, 0x1E, if sector_size == 512 { 9 } else { 12 });
    put16(image, 0x20, 6);
    put32(image, 0x2C, num_fat_sectors);
    put32(image, 0x30, first_dir_sector);
    put32(image, 0x38, MINI_STREAM_CUTOFF as u32);
    put32(image, 0x3C, first_minifat_sector);
    put32(image, 0x40, num_minifat_sectors);
    put32(image, 0x44, ENDOFCHAIN);
    put32(image, 0x48, 0);
    for slot in 0..HEADER_DIFAT_SLOTS {
        let value = if (slot as u32) < num_fat_sectors {
            slot as u32
        } else {
            FREESECT
        };
        put32(image, 0x4C + slot * 4, value);
    }
}

fn write_entry(
    entry: &mut [u8],
    name: &str,
    kind: u8,
    right: u32,
    child: u32,
    start: u32,
    size: u64,
) {
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        entry[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    let name_len = if name.is_empty() {
        0
    } else {
        (units.len() as u16 + 1) * 2
    };
    entry[64..66].copy_from_slice(&name_len.to_le_bytes());
    entry[66] = kind;
    entry[67] = 1; // black
    entry[68..72].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[72..76].copy_from_slice(&right.to_le_bytes());
    entry[76..80].copy_from_slice(&child.to_le_bytes());
    entry[116..120].copy_from_slice(&start.to_le_bytes());
    entry[120..128].copy_from_slice(&size.to_le_bytes());
}
