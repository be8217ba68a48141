//! A small BIFF-layout record family for engine tests.

use super::{Decoder, HeaderLayout, RecordFamily, RecordHeader, RecordInfo, UnsupportedRecord};
use crate::common::error::Result;
use crate::ole::context::ParseContext;
use crate::ole::reader::PayloadReader;
use phf::phf_map;

pub(crate) const CONTINUE: u16 = 0x003C;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TestRecord {
    Alpha(u16),
    Beta(u32),
    Text(Vec<u8>, Vec<usize>),
    Continue(Vec<u8>),
    Unsupported(UnsupportedRecord),
}

fn decode_alpha(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<TestRecord> {
    Ok(TestRecord::Alpha(r.read_u16()?))
}

fn decode_beta(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<TestRecord> {
    Ok(TestRecord::Beta(r.read_u32()?))
}

fn decode_text(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<TestRecord> {
    let bytes = r.read_bytes(r.remaining() as usize)?;
    Ok(TestRecord::Text(bytes, info.fragments.to_vec()))
}

fn decode_continue(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<TestRecord> {
    Ok(TestRecord::Continue(r.read_bytes(r.remaining() as usize)?))
}

static DECODERS: phf::Map<u16, Decoder<TestRecord>> = phf_map! {
    0x0001u16 => decode_alpha,
    0x0002u16 => decode_beta,
    0x0003u16 => decode_text,
    0x003Cu16 => decode_continue,
};

impl RecordFamily for TestRecord {
    const LAYOUT: HeaderLayout = HeaderLayout::Biff;
    const CONTINUATION_TAG: Option<u16> = Some(CONTINUE);

    fn decoder(header: &RecordHeader) -> Option<Decoder<Self>> {
        DECODERS.get(&header.tag).copied()
    }

    fn unsupported(record: UnsupportedRecord) -> Self {
        TestRecord::Unsupported(record)
    }

    fn merges_continuations(tag: u16) -> bool {
        tag == 0x0003
    }
}

/// Encode one BIFF record.
pub(crate) fn biff(tag: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}
