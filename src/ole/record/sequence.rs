//! Record grammars built from Required, Optional and Repeated slots.
//!
//! Slot presence is decided by peeking one record tag; nothing is ever
//! un-read. Records the family has no decoder for are skipped over before
//! every lookahead and collected, so they never take part in slot matching.

use super::registry::{RecordFamily, next_record_header, read_raw, read_record};
use super::UnsupportedRecord;
use crate::common::error::{Error, Result};
use crate::ole::context::ParseContext;
use crate::ole::reader::VirtualStreamReader;
use bytes::Bytes;
use std::io::{Read, Seek};
use std::marker::PhantomData;

/// Lookahead cursor over a stream of `F` records.
pub struct RecordCursor<'r, F, S> {
    reader: &'r mut VirtualStreamReader<S>,
    ctx: &'r mut ParseContext,
    unsupported: Vec<UnsupportedRecord>,
    _family: PhantomData<F>,
}

impl<'r, F: RecordFamily, S: Read + Seek> RecordCursor<'r, F, S> {
    pub fn new(reader: &'r mut VirtualStreamReader<S>, ctx: &'r mut ParseContext) -> Self {
        Self {
            reader,
            ctx,
            unsupported: Vec::new(),
            _family: PhantomData,
        }
    }

    pub fn reader(&mut self) -> &mut VirtualStreamReader<S> {
        &mut *self.reader
    }

    pub fn context(&mut self) -> &mut ParseContext {
        &mut *self.ctx
    }

    /// Records captured opaquely so far; the list is drained.
    pub fn take_unsupported(&mut self) -> Vec<UnsupportedRecord> {
        std::mem::take(&mut self.unsupported)
    }

    /// Tag of the next decodable record, capturing unknown ones on the way.
    pub fn peek_tag(&mut self) -> Result<Option<u16>> {
        while let Some(header) = next_record_header::<F, S>(self.reader)? {
            if F::decoder(&header).is_some() {
                return Ok(Some(header.tag));
            }
            let (info, payload) = read_raw::<F, S>(self.reader)?;
            log::debug!(
                "skipping unsupported record 0x{:04X} at offset {}",
                info.header.tag,
                info.offset
            );
            self.unsupported.push(UnsupportedRecord {
                header: info.header,
                offset: info.offset,
                payload: Bytes::from(payload),
            });
        }
        Ok(None)
    }

    /// Decode the next record whatever its tag.
    pub fn next(&mut self) -> Result<Option<F>> {
        match self.peek_tag()? {
            Some(_) => read_record::<F, S>(self.reader, self.ctx).map(Some),
            None => Ok(None),
        }
    }

    /// Exactly one record tagged `tag`.
    pub fn required(&mut self, tag: u16) -> Result<F> {
        match self.peek_tag()? {
            Some(found) if found == tag => read_record::<F, S>(self.reader, self.ctx),
            found => Err(Error::UnexpectedRecord {
                expected: tag,
                found,
            }),
        }
    }

    /// Zero or one record tagged `tag`.
    pub fn optional(&mut self, tag: u16) -> Result<Option<F>> {
        if self.peek_tag()? == Some(tag) {
            read_record::<F, S>(self.reader, self.ctx).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Zero or more records tagged `tag`.
    pub fn repeated(&mut self, tag: u16) -> Result<Vec<F>> {
        let mut records = Vec::new();
        while self.peek_tag()? == Some(tag) {
            records.push(read_record::<F, S>(self.reader, self.ctx)?);
        }
        Ok(records)
    }

    /// Every record up to (not including) the first whose tag satisfies
    /// `stop`, or to end of stream.
    pub fn repeated_until(&mut self, stop: impl Fn(u16) -> bool) -> Result<Vec<F>> {
        let mut records = Vec::new();
        while let Some(tag) = self.peek_tag()? {
            if stop(tag) {
                break;
            }
            records.push(read_record::<F, S>(self.reader, self.ctx)?);
        }
        Ok(records)
    }

    /// A nested sequence that must start with `tag`.
    pub fn required_seq<T>(
        &mut self,
        tag: u16,
        parse: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        match self.peek_tag()? {
            Some(found) if found == tag => parse(self),
            found => Err(Error::UnexpectedRecord {
                expected: tag,
                found,
            }),
        }
    }

    /// A nested sequence present when the next tag is `tag`.
    pub fn optional_seq<T>(
        &mut self,
        tag: u16,
        parse: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.peek_tag()? == Some(tag) {
            parse(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Nested sequences repeated while the next tag is `tag`.
    ///
    /// Each `parse` call must consume at least one record.
    pub fn repeated_seq<T>(
        &mut self,
        tag: u16,
        mut parse: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while self.peek_tag()? == Some(tag) {
            let before = self.reader.position();
            items.push(parse(self)?);
            if self.reader.position() == before {
                return Err(Error::InvalidFormat(format!(
                    "sequence starting with record 0x{:04X} consumed nothing",
                    tag
                )));
            }
        }
        Ok(items)
    }
}
