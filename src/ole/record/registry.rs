//! Tag dispatch and the record-length invariant.

use super::continuation::append_continuations;
use super::header::{HeaderLayout, RecordHeader};
use super::{RecordInfo, UnsupportedRecord};
use crate::common::error::{Error, Result};
use crate::ole::context::ParseContext;
use crate::ole::reader::{PayloadReader, VirtualStreamReader};
use bytes::Bytes;
use smallvec::SmallVec;
use std::io::{Read, Seek};

/// Decode function for one record tag.
///
/// The reader spans exactly the (merged) payload; a decoder must consume all
/// of it.
pub type Decoder<T> = fn(&RecordInfo, &mut PayloadReader<'_>, &mut ParseContext) -> Result<T>;

/// A family of records sharing one header layout and one sum type.
pub trait RecordFamily: Sized {
    const LAYOUT: HeaderLayout;

    /// Tag of the continuation record, if the family has one.
    const CONTINUATION_TAG: Option<u16> = None;

    /// Decoder for the record described by `header`, `None` if unknown.
    fn decoder(header: &RecordHeader) -> Option<Decoder<Self>>;

    /// Wrap a record nobody can decode.
    fn unsupported(record: UnsupportedRecord) -> Self;

    /// Whether `tag` absorbs trailing continuation records before decoding.
    fn merges_continuations(_tag: u16) -> bool {
        false
    }
}

/// Peek the next header without advancing; `None` at end of stream.
pub fn next_record_header<F: RecordFamily, S: Read + Seek>(
    reader: &mut VirtualStreamReader<S>,
) -> Result<Option<RecordHeader>> {
    if reader.is_empty() {
        return Ok(None);
    }
    let bytes = reader.peek_bytes(F::LAYOUT.size())?;
    RecordHeader::parse(&bytes, F::LAYOUT).map(Some)
}

/// Peek the next record tag without advancing; `None` at end of stream.
pub fn next_record_tag<F: RecordFamily, S: Read + Seek>(
    reader: &mut VirtualStreamReader<S>,
) -> Result<Option<u16>> {
    Ok(next_record_header::<F, S>(reader)?.map(|header| header.tag))
}

/// Read a header and its payload, merging continuations when the family asks.
pub(crate) fn read_raw<F: RecordFamily, S: Read + Seek>(
    reader: &mut VirtualStreamReader<S>,
) -> Result<(RecordInfo, Vec<u8>)> {
    let offset = reader.position();
    let header = RecordHeader::read(reader, F::LAYOUT)?;
    if reader.remaining() < header.length as u64 {
        return Err(Error::truncated(header.length as u64, reader.remaining()));
    }
    let mut payload = reader.read_bytes(header.length as usize)?;

    let mut fragments = SmallVec::new();
    if F::merges_continuations(header.tag) {
        append_continuations::<F, S>(reader, &mut payload, &mut fragments)?;
    }

    let info = RecordInfo {
        header,
        offset,
        length: payload.len(),
        fragments,
    };
    Ok((info, payload))
}

/// Read and decode one record.
///
/// Records without a decoder come back as `F::unsupported`; a decoder that
/// leaves payload bytes unread (or reads past them) is an error because every
/// following record would be misaligned.
pub fn read_record<F: RecordFamily, S: Read + Seek>(
    reader: &mut VirtualStreamReader<S>,
    ctx: &mut ParseContext,
) -> Result<F> {
    let (info, payload) = read_raw::<F, S>(reader)?;
    decode_payload(info, payload, ctx)
}

/// Decode an already-read payload.
pub fn decode_payload<F: RecordFamily>(
    info: RecordInfo,
    payload: Vec<u8>,
    ctx: &mut ParseContext,
) -> Result<F> {
    let Some(decode) = F::decoder(&info.header) else {
        log::debug!(
            "capturing unsupported record 0x{:04X} ({} bytes) at offset {}",
            info.header.tag,
            payload.len(),
            info.offset
        );
        return Ok(F::unsupported(UnsupportedRecord {
            header: info.header,
            offset: info.offset,
            payload: Bytes::from(payload),
        }));
    };

    let mut reader = PayloadReader::from_slice(&payload);
    let record = decode(&info, &mut reader, ctx)?;
    let consumed = reader.position();
    if consumed != payload.len() as u64 {
        return Err(Error::RecordLengthMismatch {
            tag: info.header.tag,
            declared: payload.len() as u64,
            consumed,
        });
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::record::test_family::{TestRecord, biff};

    fn reader(bytes: &[u8]) -> PayloadReader<'_> {
        PayloadReader::from_slice(bytes)
    }

    #[test]
    fn test_known_record_decodes() {
        let bytes = biff(0x0001, &[0x34, 0x12]);
        let mut r = reader(&bytes);
        let mut ctx = ParseContext::new();
        assert_eq!(
            read_record::<TestRecord, _>(&mut r, &mut ctx).unwrap(),
            TestRecord::Alpha(0x1234)
        );
        assert!(r.is_empty());
    }

    #[test]
    fn test_unknown_record_is_captured() {
        let mut bytes = biff(0x0999, &[1, 2, 3]);
        bytes.extend(biff(0x0001, &[7, 0]));
        let mut r = reader(&bytes);
        let mut ctx = ParseContext::new();

        match read_record::<TestRecord, _>(&mut r, &mut ctx).unwrap() {
            TestRecord::Unsupported(raw) => {
                assert_eq!(raw.tag(), 0x0999);
                assert_eq!(raw.offset, 0);
                assert_eq!(&raw.payload[..], &[1, 2, 3]);
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            read_record::<TestRecord, _>(&mut r, &mut ctx).unwrap(),
            TestRecord::Alpha(7)
        );
    }

    #[test]
    fn test_length_mismatch_is_fatal() {
        // Beta expects 4 bytes; the header declares 6.
        let bytes = biff(0x0002, &[1, 0, 0, 0, 9, 9]);
        let mut ctx = ParseContext::new();
        assert!(matches!(
            read_record::<TestRecord, _>(&mut reader(&bytes), &mut ctx),
            Err(Error::RecordLengthMismatch {
                tag: 0x0002,
                declared: 6,
                consumed: 4
            })
        ));
    }

    #[test]
    fn test_declared_length_past_end_is_truncated() {
        let mut bytes = biff(0x0001, &[1, 0]);
        bytes[2] = 0x40; // declare 64 bytes, only 2 present
        let mut ctx = ParseContext::new();
        assert!(matches!(
            read_record::<TestRecord, _>(&mut reader(&bytes), &mut ctx),
            Err(Error::TruncatedStream {
                requested: 64,
                available: 2
            })
        ));
    }

    #[test]
    fn test_next_record_tag_peeks() {
        let bytes = biff(0x0002, &[0, 0, 0, 0]);
        let mut r = reader(&bytes);
        assert_eq!(next_record_tag::<TestRecord, _>(&mut r).unwrap(), Some(2));
        assert_eq!(r.position(), 0);
        r.skip(8).unwrap();
        assert_eq!(next_record_tag::<TestRecord, _>(&mut r).unwrap(), None);
    }
}
