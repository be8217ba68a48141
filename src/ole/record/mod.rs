//! Generic tagged-record engine shared by the BIFF and PowerPoint parsers.
//!
//! A format plugs in by implementing [`RecordFamily`]: a header layout, a
//! static tag → decoder table and a variant for records it cannot decode.
//! [`read_record`] enforces that every decoder consumes exactly the payload
//! the header declared, and [`RecordCursor`] composes records into
//! grammars with one-record lookahead.

pub mod continuation;
pub mod header;
pub mod registry;
pub mod sequence;

#[cfg(test)]
pub(crate) mod test_family;

pub use header::{HeaderLayout, RecordHeader};
pub use registry::{
    Decoder, RecordFamily, decode_payload, next_record_header, next_record_tag, read_record,
};
pub use sequence::RecordCursor;

use bytes::Bytes;
use smallvec::SmallVec;

/// Where a record came from and how its payload was assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    pub header: RecordHeader,
    /// Stream offset of the record header
    pub offset: u64,
    /// Payload length after continuation merging
    pub length: usize,
    /// Payload offsets where each merged continuation begins
    pub fragments: SmallVec<[usize; 4]>,
}

impl RecordInfo {
    /// End of the fragment containing payload offset `pos`.
    pub fn fragment_end(&self, pos: usize) -> usize {
        self.fragments
            .iter()
            .copied()
            .find(|&start| start > pos)
            .unwrap_or(self.length)
    }
}

/// A record without a registered decoder, kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedRecord {
    pub header: RecordHeader,
    pub offset: u64,
    pub payload: Bytes,
}

impl UnsupportedRecord {
    pub fn tag(&self) -> u16 {
        self.header.tag
    }
}
