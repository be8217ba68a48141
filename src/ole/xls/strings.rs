//! BIFF string structures.
//!
//! BIFF8 strings carry an option byte whose low bit (`fHighByte`) selects
//! UTF-16LE or "compressed" single-byte characters (the low bytes of UTF-16
//! code units). When a long string is split by a CONTINUE record, the
//! continuation starts with a fresh option byte for the remaining
//! characters, so decoding needs the fragment boundaries of the merged
//! payload. BIFF5 strings are plain bytes in the workbook codepage.

use crate::common::binary::decode_latin1;
use crate::common::error::{Error, Result};
use crate::ole::codepage::decode_ansi;
use crate::ole::context::{BiffVersion, ParseContext};
use crate::ole::reader::PayloadReader;
use crate::ole::record::RecordInfo;

const HIGH_BYTE: u8 = 0x01;
const EXT_ST: u8 = 0x04;
const RICH_ST: u8 = 0x08;

/// Read `cch` characters whose first option byte is `flags`.
///
/// Fragment starts inside the character array introduce a new option byte.
/// Pass `None` for `info` when the string cannot span continuations.
fn read_chars(
    r: &mut PayloadReader<'_>,
    info: Option<&RecordInfo>,
    mut cch: usize,
    mut flags: u8,
) -> Result<String> {
    let mut text = String::with_capacity(cch);
    while cch > 0 {
        let pos = r.position() as usize;
        if let Some(info) = info {
            if info.fragments.contains(&pos) {
                flags = r.read_u8()?;
                continue;
            }
        }

        let width = if flags & HIGH_BYTE != 0 { 2 } else { 1 };
        let available = match info {
            Some(info) => info.fragment_end(pos) - pos,
            None => r.remaining() as usize,
        };
        let count = cch.min(available / width);
        if count == 0 {
            return Err(Error::InvalidFormat(format!(
                "string characters split mid-character at payload offset {}",
                pos
            )));
        }

        if width == 2 {
            text.push_str(&r.read_utf16(count)?);
        } else {
            text.push_str(&decode_latin1(&r.read_bytes(count)?));
        }
        cch -= count;
    }
    Ok(text)
}

/// ShortXLUnicodeString (8-bit length) in BIFF8, or a byte string in BIFF5.
pub fn read_short_string(r: &mut PayloadReader<'_>, ctx: &ParseContext) -> Result<String> {
    let cch = r.read_u8()? as usize;
    match ctx.biff_version {
        BiffVersion::Biff8 => {
            let flags = r.read_u8()?;
            read_chars(r, None, cch, flags)
        },
        BiffVersion::Biff5 => r.read_ansi(cch, ctx.codepage),
    }
}

/// XLUnicodeString (16-bit length) in BIFF8, or a 16-bit-length byte string in BIFF5.
pub fn read_unicode_string(r: &mut PayloadReader<'_>, ctx: &ParseContext) -> Result<String> {
    let cch = r.read_u16()? as usize;
    match ctx.biff_version {
        BiffVersion::Biff8 => {
            let flags = r.read_u8()?;
            read_chars(r, None, cch, flags)
        },
        BiffVersion::Biff5 => Ok(decode_ansi(&r.read_bytes(cch)?, ctx.codepage)),
    }
}

/// XLUnicodeRichExtendedString, as stored in the SST.
///
/// Formatting runs and phonetic data are skipped; they never carry option
/// bytes at continuation boundaries.
pub fn read_rich_string(r: &mut PayloadReader<'_>, info: &RecordInfo) -> Result<String> {
    let cch = r.read_u16()? as usize;
    let flags = r.read_u8()?;
    let runs = if flags & RICH_ST != 0 {
        r.read_u16()? as u64
    } else {
        0
    };
    let ext_len = if flags & EXT_ST != 0 {
        r.read_u32()? as u64
    } else {
        0
    };

    let text = read_chars(r, Some(info), cch, flags)?;
    r.skip(runs * 4 + ext_len)?;
    Ok(text)
}
