//! Typed little-endian cursor over seekable streams.
//!
//! [`VirtualStreamReader`] is the single read primitive every format parser
//! uses. It wraps a [`VirtualStream`](crate::ole::VirtualStream) for whole
//! streams and an in-memory cursor ([`PayloadReader`]) for record payloads.
//! Every read checks the remaining length first and fails with
//! `TruncatedStream` instead of returning a partial value.

use super::codepage::decode_ansi;
use crate::common::error::{Error, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Reader over a record payload held in memory.
pub type PayloadReader<'a> = VirtualStreamReader<Cursor<&'a [u8]>>;

#[derive(Debug)]
pub struct VirtualStreamReader<S> {
    inner: S,
    pos: u64,
    len: u64,
}

impl<'a> VirtualStreamReader<Cursor<&'a [u8]>> {
    /// Reader over a byte slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
            pos: 0,
            len: data.len() as u64,
        }
    }
}

impl<S: Read + Seek> VirtualStreamReader<S> {
    /// Wrap `inner`, keeping its current position.
    pub fn new(mut inner: S) -> Result<Self> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, pos, len })
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Total length of the underlying stream.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when no bytes remain.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    fn ensure(&self, count: u64) -> Result<()> {
        if count > self.remaining() {
            return Err(Error::truncated(count, self.remaining()));
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read `count` raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut buf = vec![0u8; count];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read `chars` UTF-16LE code units; invalid sequences become U+FFFD.
    pub fn read_utf16(&mut self, chars: usize) -> Result<String> {
        let count = chars
            .checked_mul(2)
            .ok_or_else(|| Error::truncated(u64::MAX, self.remaining()))?;
        let bytes = self.read_bytes(count)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }

    /// Read `count` single-byte characters in `codepage`.
    pub fn read_ansi(&mut self, count: usize, codepage: u16) -> Result<String> {
        let bytes = self.read_bytes(count)?;
        Ok(decode_ansi(&bytes, codepage))
    }

    /// Look at the next two bytes without consuming them.
    pub fn peek_u16(&mut self) -> Result<u16> {
        let bytes = self.peek_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Look at the next `count` bytes without consuming them.
    pub fn peek_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let start = self.pos;
        let bytes = self.read_bytes(count)?;
        self.seek_to(start)?;
        Ok(bytes)
    }

    /// Skip `count` bytes; skipping past the end is a truncation.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.ensure(count)?;
        self.seek_to(self.pos + count)
    }

    /// Move relative to the current position, staying within `0..=len`.
    pub fn seek_relative(&mut self, delta: i64) -> Result<()> {
        let target = self
            .pos
            .checked_add_signed(delta)
            .filter(|&t| t <= self.len)
            .ok_or_else(|| {
                let available = if delta < 0 { self.pos } else { self.remaining() };
                Error::truncated(delta.unsigned_abs(), available)
            })?;
        self.seek_to(target)
    }

    /// Move to an absolute position within `0..=len`.
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        if pos > self.len {
            return Err(Error::truncated(pos, self.len));
        }
        self.inner.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }
}
