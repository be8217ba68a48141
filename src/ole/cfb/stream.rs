//! Seekable views over sector chains.

use super::sector::{ChainKind, SectorTable};
use crate::common::error::{Error, Result};
use crate::ole::consts::ENDOFCHAIN;
use bytes::Bytes;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Position cache: the chain index and sector id last resolved.
#[derive(Debug, Clone, Copy)]
struct ChainCursor {
    index: u64,
    sector: u32,
}

/// A named stream materialized lazily from its sector chain.
///
/// The logical content is the concatenation of the chain's sectors truncated
/// to the declared length. Each `VirtualStream` owns its position; opening
/// the same stream twice yields two independent cursors over shared,
/// immutable container bytes.
#[derive(Debug, Clone)]
pub struct VirtualStream {
    data: Bytes,
    table: Arc<SectorTable>,
    kind: ChainKind,
    start: u32,
    len: u64,
    pos: u64,
    cursor: ChainCursor,
}

impl VirtualStream {
    /// Validate the chain and build a stream positioned at 0.
    pub(crate) fn open(
        data: Bytes,
        table: Arc<SectorTable>,
        kind: ChainKind,
        start: u32,
        len: u64,
    ) -> Result<Self> {
        table.validate_chain(&data, kind, start, len)?;
        Ok(Self {
            data,
            table,
            kind,
            start,
            len,
            pos: 0,
            cursor: ChainCursor {
                index: 0,
                sector: start,
            },
        })
    }

    /// Declared length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Bytes left between the position and the declared end.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    /// Whether the stream lives in the mini stream.
    pub fn chain_kind(&self) -> ChainKind {
        self.kind
    }

    /// Read exactly `count` bytes or fail without consuming anything.
    pub fn read_exact_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if (count as u64) > self.remaining() {
            return Err(Error::truncated(count as u64, self.remaining()));
        }
        let mut buf = vec![0u8; count];
        let mut filled = 0;
        while filled < count {
            filled += self.read_chunk(&mut buf[filled..])?;
        }
        Ok(buf)
    }

    /// Read everything from the current position to the end.
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        self.read_exact_bytes(self.remaining() as usize)
    }

    /// Sector id holding chain index `index`.
    ///
    /// Moves forward from the cache; a target before the cache restarts from
    /// the chain head.
    fn locate(&mut self, index: u64) -> Result<u32> {
        if index < self.cursor.index {
            log::trace!(
                "rewinding chain at sector {} from index {} to {}",
                self.start,
                self.cursor.index,
                index
            );
            self.cursor = ChainCursor {
                index: 0,
                sector: self.start,
            };
        }
        while self.cursor.index < index {
            let next = self.table.successor(self.kind, self.cursor.sector)?;
            if next == ENDOFCHAIN {
                return Err(Error::ContainerCorrupt(format!(
                    "chain at sector {} ends before index {}",
                    self.start, index
                )));
            }
            self.cursor = ChainCursor {
                index: self.cursor.index + 1,
                sector: next,
            };
        }
        Ok(self.cursor.sector)
    }

    /// Copy bytes from the sector under the position, at most to its end.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let unit = self.table.unit_size(self.kind) as u64;
        let sector = self.locate(self.pos / unit)?;
        let within = (self.pos % unit) as usize;
        let bytes = self.table.unit(&self.data, self.kind, sector)?;
        let take = buf
            .len()
            .min((unit as usize) - within)
            .min(remaining as usize);
        let chunk = bytes.get(within..within + take).ok_or_else(|| {
            Error::ContainerCorrupt(format!("sector {} is cut off by end of file", sector))
        })?;
        buf[..take].copy_from_slice(chunk);
        self.pos += take as u64;
        Ok(take)
    }
}

impl Read for VirtualStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf)?)
    }
}

impl Seek for VirtualStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(target) => {
                self.pos = target;
                Ok(target)
            },
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative position",
            )),
        }
    }
}
