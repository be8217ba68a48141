//! Record header layouts.

use crate::common::error::{Error, Result};
use crate::ole::reader::VirtualStreamReader;
use std::io::{Read, Seek};

/// On-disk shape of a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// `u16 tag, u16 length` (BIFF, 4 bytes)
    Biff,
    /// `u16 version/instance, u16 tag, u32 length` (Office drawing and PowerPoint, 8 bytes)
    Office,
}

impl HeaderLayout {
    /// Header size in bytes.
    pub const fn size(self) -> usize {
        match self {
            HeaderLayout::Biff => 4,
            HeaderLayout::Office => 8,
        }
    }
}

/// A decoded record header. The length excludes the header itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: u16,
    pub length: u32,
    /// recInstance, 12 bits (Office layout only)
    pub instance: u16,
    /// recVer, 4 bits (Office layout only)
    pub version: u8,
}

impl RecordHeader {
    /// Container records in the Office layout carry recVer 0xF.
    pub const CONTAINER_VERSION: u8 = 0x0F;

    /// Decode a header from exactly `layout.size()` bytes.
    pub fn parse(bytes: &[u8], layout: HeaderLayout) -> Result<Self> {
        if bytes.len() < layout.size() {
            return Err(Error::truncated(layout.size() as u64, bytes.len() as u64));
        }
        let word = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        Ok(match layout {
            HeaderLayout::Biff => RecordHeader {
                tag: word(0),
                length: word(2) as u32,
                instance: 0,
                version: 0,
            },
            HeaderLayout::Office => {
                let ver_inst = word(0);
                RecordHeader {
                    tag: word(2),
                    length: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
                    instance: ver_inst >> 4,
                    version: (ver_inst & 0x000F) as u8,
                }
            },
        })
    }

    /// Read a header from the stream, advancing past it.
    pub fn read<S: Read + Seek>(
        reader: &mut VirtualStreamReader<S>,
        layout: HeaderLayout,
    ) -> Result<Self> {
        let bytes = reader.read_bytes(layout.size())?;
        Self::parse(&bytes, layout)
    }

    pub fn is_container(&self) -> bool {
        self.version == Self::CONTAINER_VERSION
    }
}
