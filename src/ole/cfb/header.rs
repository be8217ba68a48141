//! Compound file header parsing.
//!
//! The header occupies the first 512 bytes of the file (the rest of the first
//! sector is padding for 4096-byte sector files) and locates the FAT, the
//! Mini-FAT, the DIFAT and the directory chain.

use crate::common::error::{Error, Result};
use crate::ole::consts::*;
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE header structure (512 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    magic: [u8; 8],
    clsid: [u8; 16],
    minor_version: U16<LE>,
    dll_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    transaction_signature: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    difat: [U32<LE>; HEADER_DIFAT_SLOTS],
}

/// Parsed and validated compound file header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Major version (3 for 512-byte sectors, 4 for 4096-byte sectors)
    pub dll_version: u16,
    /// Sector size in bytes (512 or 4096)
    pub sector_size: usize,
    /// Number of FAT sectors
    pub num_fat_sectors: u32,
    /// First sector of the directory chain
    pub first_dir_sector: u32,
    /// Mini stream cutoff as stored in the header
    pub mini_stream_cutoff: u32,
    /// First sector of the Mini-FAT chain
    pub first_minifat_sector: u32,
    /// Number of Mini-FAT sectors
    pub num_minifat_sectors: u32,
    /// First DIFAT sector
    pub first_difat_sector: u32,
    /// Number of DIFAT sectors
    pub num_difat_sectors: u32,
    /// FAT sector ids stored in the header, up to the first free slot
    pub difat: Vec<u32>,
}

impl Header {
    /// Parse and validate the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::ContainerCorrupt(format!(
                "file is {} bytes, smaller than the {}-byte header",
                data.len(),
                HEADER_SIZE
            )));
        }

        let raw = RawHeader::read_from_bytes(&data[..HEADER_SIZE])
            .map_err(|_| Error::ContainerCorrupt("unreadable header".to_string()))?;

        if &raw.magic != MAGIC {
            return Err(Error::ContainerCorrupt("invalid signature".to_string()));
        }

        if raw.byte_order.get() != BYTE_ORDER_LE {
            return Err(Error::ContainerCorrupt(format!(
                "invalid byte order mark 0x{:04X}",
                raw.byte_order.get()
            )));
        }

        let sector_size = match raw.sector_shift.get() {
            9 => SECTOR_SIZE_V3,
            12 => SECTOR_SIZE_V4,
            shift => {
                return Err(Error::ContainerCorrupt(format!(
                    "invalid sector shift {}",
                    shift
                )));
            },
        };

        if raw.mini_sector_shift.get() != 6 {
            return Err(Error::ContainerCorrupt(format!(
                "invalid mini sector shift {}",
                raw.mini_sector_shift.get()
            )));
        }

        // The first sector is the header itself; a 4096-byte file must hold it whole.
        if data.len() < sector_size {
            return Err(Error::ContainerCorrupt(format!(
                "file is {} bytes, smaller than one {}-byte sector",
                data.len(),
                sector_size
            )));
        }

        let dll_version = raw.dll_version.get();
        if (dll_version == 3 && sector_size != SECTOR_SIZE_V3)
            || (dll_version == 4 && sector_size != SECTOR_SIZE_V4)
        {
            log::warn!(
                "header version {} does not match {}-byte sectors",
                dll_version,
                sector_size
            );
        }

        let mini_stream_cutoff = raw.mini_stream_cutoff.get();
        if mini_stream_cutoff as u64 != MINI_STREAM_CUTOFF {
            log::warn!(
                "non-standard mini stream cutoff {}, using {}",
                mini_stream_cutoff,
                MINI_STREAM_CUTOFF
            );
        }

        let difat = raw
            .difat
            .iter()
            .map(|v| v.get())
            .take_while(|&sector| sector != FREESECT && sector != ENDOFCHAIN)
            .collect();

        Ok(Header {
            dll_version,
            sector_size,
            num_fat_sectors: raw.num_fat_sectors.get(),
            first_dir_sector: raw.first_dir_sector.get(),
            mini_stream_cutoff,
            first_minifat_sector: raw.first_minifat_sector.get(),
            num_minifat_sectors: raw.num_minifat_sectors.get(),
            first_difat_sector: raw.first_difat_sector.get(),
            num_difat_sectors: raw.num_difat_sectors.get(),
            difat,
        })
    }
}
