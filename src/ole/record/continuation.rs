//! Continuation record merging.
//!
//! Payloads longer than one record can hold are split into a primary record
//! followed by continuation records. The primary absorbs them greedily and
//! remembers where each fragment began, since some formats restart encoding
//! state (such as the BIFF string compression flag) at a fragment boundary.

use super::header::RecordHeader;
use super::registry::{RecordFamily, next_record_header};
use crate::common::error::Result;
use crate::ole::reader::VirtualStreamReader;
use smallvec::SmallVec;
use std::io::{Read, Seek};

/// Append every directly following continuation record to `payload`.
pub(crate) fn append_continuations<F: RecordFamily, S: Read + Seek>(
    reader: &mut VirtualStreamReader<S>,
    payload: &mut Vec<u8>,
    fragments: &mut SmallVec<[usize; 4]>,
) -> Result<()> {
    let Some(continuation) = F::CONTINUATION_TAG else {
        return Ok(());
    };
    while let Some(header) = next_record_header::<F, S>(reader)? {
        if header.tag != continuation {
            break;
        }
        RecordHeader::read(reader, F::LAYOUT)?;
        let bytes = reader.read_bytes(header.length as usize)?;
        fragments.push(payload.len());
        payload.extend_from_slice(&bytes);
    }
    Ok(())
}
