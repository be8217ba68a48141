//! FAT, DIFAT and Mini-FAT tables.
//!
//! A [`SectorTable`] maps every sector (or mini sector) to its successor. Chain
//! walks go through [`ChainWalk`], which refuses to revisit a sector and
//! rejects indices outside the table.

use super::header::Header;
use crate::common::binary::read_u32_le;
use crate::common::error::{Error, Result};
use crate::ole::consts::*;
use fixedbitset::FixedBitSet;

/// Which allocation table a chain lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// Regular sectors addressed through the FAT
    Regular,
    /// 64-byte mini sectors carved from the mini stream, addressed through the Mini-FAT
    Mini,
}

/// Sector successor tables of one container.
#[derive(Debug, Clone)]
pub struct SectorTable {
    sector_size: usize,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    /// Regular sectors holding the mini stream, in order
    ministream: Vec<u32>,
    ministream_len: u64,
}

impl SectorTable {
    /// Build the FAT from the header DIFAT slots and the DIFAT chain, then
    /// load the Mini-FAT through it.
    pub fn load(data: &[u8], header: &Header) -> Result<Self> {
        let sector_size = header.sector_size;
        let mut fat_sectors = header.difat.clone();

        if header.num_difat_sectors > 0 && header.first_difat_sector != ENDOFCHAIN {
            let entries_per_sector = sector_size / 4 - 1;
            let mut visited = FixedBitSet::with_capacity(sector_count(data, sector_size));
            let mut difat_sector = header.first_difat_sector;

            for _ in 0..header.num_difat_sectors {
                if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                    break;
                }
                if difat_sector as usize >= visited.len() {
                    return Err(Error::ContainerCorrupt(format!(
                        "DIFAT sector {} is outside the file",
                        difat_sector
                    )));
                }
                if visited.put(difat_sector as usize) {
                    return Err(Error::CyclicSectorChain {
                        start: header.first_difat_sector,
                        sector: difat_sector,
                    });
                }

                let sector_data = sector_slice(data, sector_size, difat_sector)?;
                for i in 0..entries_per_sector {
                    let sector = read_u32_le(sector_data, i * 4)?;
                    if sector == FREESECT || sector == ENDOFCHAIN {
                        break;
                    }
                    fat_sectors.push(sector);
                }
                difat_sector = read_u32_le(sector_data, entries_per_sector * 4)?;
            }
        }

        if fat_sectors.len() < header.num_fat_sectors as usize {
            log::warn!(
                "header declares {} FAT sectors but the DIFAT lists {}",
                header.num_fat_sectors,
                fat_sectors.len()
            );
        }

        let entries_per_sector = sector_size / 4;
        let mut fat = Vec::with_capacity(fat_sectors.len() * entries_per_sector);
        for &sector_id in &fat_sectors {
            let sector_data = sector_slice(data, sector_size, sector_id)?;
            fat.extend(
                sector_data
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
        }

        let mut table = SectorTable {
            sector_size,
            fat,
            minifat: Vec::new(),
            ministream: Vec::new(),
            ministream_len: 0,
        };

        if header.num_minifat_sectors > 0 && header.first_minifat_sector != ENDOFCHAIN {
            let bytes = table.read_chain(data, header.first_minifat_sector)?;
            table.minifat = bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
        }

        Ok(table)
    }

    /// Record the regular chain holding the mini stream (the root entry's chain).
    pub fn attach_mini_stream(&mut self, start: u32, len: u64) -> Result<()> {
        let chain = self.walk(ChainKind::Regular, start).collect::<Result<Vec<_>>>()?;
        let capacity = chain.len() as u64 * self.sector_size as u64;
        if capacity < len {
            return Err(Error::ContainerCorrupt(format!(
                "mini stream chain holds {} bytes but {} are declared",
                capacity, len
            )));
        }
        self.ministream = chain;
        self.ministream_len = len;
        Ok(())
    }

    /// Sector size in bytes.
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    /// Size of one allocation unit of `kind`.
    pub fn unit_size(&self, kind: ChainKind) -> usize {
        match kind {
            ChainKind::Regular => self.sector_size,
            ChainKind::Mini => MINI_SECTOR_SIZE,
        }
    }

    pub fn fat(&self) -> &[u32] {
        &self.fat
    }

    pub fn minifat(&self) -> &[u32] {
        &self.minifat
    }

    /// True when the container carries a usable mini stream.
    pub fn has_mini_stream(&self) -> bool {
        !self.minifat.is_empty() && !self.ministream.is_empty()
    }

    fn table(&self, kind: ChainKind) -> &[u32] {
        match kind {
            ChainKind::Regular => &self.fat,
            ChainKind::Mini => &self.minifat,
        }
    }

    /// Iterate the chain starting at `start`.
    pub fn walk(&self, kind: ChainKind, start: u32) -> ChainWalk<'_> {
        ChainWalk::new(self.table(kind), start)
    }

    /// Successor of `sector`, validated like a single step of a walk.
    pub fn successor(&self, kind: ChainKind, sector: u32) -> Result<u32> {
        let table = self.table(kind);
        table.get(sector as usize).copied().ok_or_else(|| {
            Error::ContainerCorrupt(format!(
                "sector {} is outside a {}-entry allocation table",
                sector,
                table.len()
            ))
        })
    }

    /// Bytes of one allocation unit, borrowed from the container buffer.
    ///
    /// The slice may be shorter than the unit size when the file ends inside
    /// its last sector.
    pub fn unit<'a>(&self, data: &'a [u8], kind: ChainKind, id: u32) -> Result<&'a [u8]> {
        match kind {
            ChainKind::Regular => sector_slice(data, self.sector_size, id),
            ChainKind::Mini => {
                let offset = id as u64 * MINI_SECTOR_SIZE as u64;
                if offset + MINI_SECTOR_SIZE as u64 > self.ministream_len.next_multiple_of(64) {
                    return Err(Error::ContainerCorrupt(format!(
                        "mini sector {} is outside the {}-byte mini stream",
                        id, self.ministream_len
                    )));
                }
                let host = self.ministream[(offset / self.sector_size as u64) as usize];
                let within = (offset % self.sector_size as u64) as usize;
                let sector = sector_slice(data, self.sector_size, host)?;
                let end = (within + MINI_SECTOR_SIZE).min(sector.len());
                sector.get(within..end).ok_or_else(|| {
                    Error::ContainerCorrupt(format!("mini sector {} is cut off by end of file", id))
                })
            },
        }
    }

    /// Concatenate every sector of a regular chain.
    pub fn read_chain(&self, data: &[u8], start: u32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for sector in self.walk(ChainKind::Regular, start) {
            out.extend_from_slice(sector_slice(data, self.sector_size, sector?)?);
        }
        Ok(out)
    }

    /// Check that the chain at `start` is acyclic, in range and covers `len` bytes.
    pub fn validate_chain(&self, data: &[u8], kind: ChainKind, start: u32, len: u64) -> Result<()> {
        let unit = self.unit_size(kind) as u64;
        let needed = len.div_ceil(unit);
        let mut covered = 0u64;
        for sector in self.walk(kind, start) {
            let sector = sector?;
            if covered < needed {
                let bytes = self.unit(data, kind, sector)?;
                let wanted = (len - covered * unit).min(unit);
                if (bytes.len() as u64) < wanted {
                    return Err(Error::ContainerCorrupt(format!(
                        "sector {} is cut off by end of file",
                        sector
                    )));
                }
            }
            covered += 1;
        }
        if covered < needed {
            return Err(Error::ContainerCorrupt(format!(
                "chain at sector {} holds {} sectors, {} needed for {} bytes",
                start, covered, needed, len
            )));
        }
        Ok(())
    }
}

/// Number of whole or partial sectors after the header.
fn sector_count(data: &[u8], sector_size: usize) -> usize {
    data.len().saturating_sub(sector_size).div_ceil(sector_size)
}

fn sector_slice(data: &[u8], sector_size: usize, id: u32) -> Result<&[u8]> {
    let start = (id as usize)
        .checked_add(1)
        .and_then(|n| n.checked_mul(sector_size))
        .filter(|&start| start < data.len())
        .ok_or_else(|| Error::ContainerCorrupt(format!("sector {} is outside the file", id)))?;
    let end = (start + sector_size).min(data.len());
    Ok(&data[start..end])
}

/// Iterator over the sector ids of one chain.
///
/// Yields an error and stops on a revisited sector, an index outside the
/// table, or a special value other than `ENDOFCHAIN` inside the chain.
pub struct ChainWalk<'a> {
    table: &'a [u32],
    start: u32,
    next: u32,
    visited: FixedBitSet,
    done: bool,
}

impl<'a> ChainWalk<'a> {
    fn new(table: &'a [u32], start: u32) -> Self {
        Self {
            table,
            start,
            next: start,
            visited: FixedBitSet::with_capacity(table.len()),
            done: false,
        }
    }
}

impl Iterator for ChainWalk<'_> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next == ENDOFCHAIN {
            return None;
        }
        let sector = self.next;
        if sector > MAXREGSECT || sector as usize >= self.table.len() {
            self.done = true;
            return Some(Err(Error::ContainerCorrupt(format!(
                "chain at sector {} references sector 0x{:X} outside a {}-entry table",
                self.start,
                sector,
                self.table.len()
            ))));
        }
        if self.visited.put(sector as usize) {
            self.done = true;
            return Some(Err(Error::CyclicSectorChain {
                start: self.start,
                sector,
            }));
        }
        self.next = self.table[sector as usize];
        Some(Ok(sector))
    }
}
