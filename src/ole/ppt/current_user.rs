/// Current User stream parser for PowerPoint presentations.
///
/// The `Current User` stream holds a single CurrentUserAtom naming the last
/// user to save the file and, more importantly, the offset of the newest
/// UserEditAtom in the `PowerPoint Document` stream. Reading a presentation
/// always starts here.
use super::records::PptRecord;
use crate::common::error::{Error, Result};
use crate::ole::OleFile;
use crate::ole::context::ParseContext;
use crate::ole::reader::{PayloadReader, VirtualStreamReader};
use crate::ole::record::{RecordInfo, read_record};
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Name of the stream holding the CurrentUserAtom
pub const CURRENT_USER_STREAM: &str = "Current User";

/// headerToken of an unencrypted document
pub const TOKEN_PLAIN: u32 = 0xE391_C05F;
/// headerToken of an encrypted document
pub const TOKEN_ENCRYPTED: u32 = 0xF3D1_C4DF;

/// Fixed part of the atom
const FIXED_SIZE: usize = 20;

#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawCurrentUser {
    size: U32<LE>,
    header_token: U32<LE>,
    offset_to_current_edit: U32<LE>,
    len_user_name: U16<LE>,
    doc_file_version: U16<LE>,
    major_version: u8,
    minor_version: u8,
    _unused: U16<LE>,
}

/// Decoded CurrentUserAtom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub header_token: u32,
    /// Offset of the newest UserEditAtom in the document stream
    pub offset_to_current_edit: u32,
    pub doc_file_version: u16,
    pub major_version: u8,
    pub minor_version: u8,
    /// 8 for a regular save, 9 for files carrying a PP9 extension
    pub rel_version: Option<u32>,
    pub user_name: String,
}

impl CurrentUser {
    /// Read the atom from the `Current User` stream of `ole`.
    pub fn read(ole: &OleFile) -> Result<Self> {
        let mut reader = VirtualStreamReader::new(ole.open_stream(&[CURRENT_USER_STREAM])?)?;
        let mut ctx = ParseContext::new();
        match read_record::<PptRecord, _>(&mut reader, &mut ctx)? {
            PptRecord::CurrentUser(user) => Ok(user),
            other => Err(Error::InvalidFormat(format!(
                "Current User stream starts with record 0x{:04X}",
                other.tag()
            ))),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.header_token == TOKEN_ENCRYPTED
    }
}

/// Decoder for record 0x0FF6.
pub(crate) fn decode_current_user(
    _: &RecordInfo,
    r: &mut PayloadReader<'_>,
    ctx: &mut ParseContext,
) -> Result<PptRecord> {
    let fixed = r.read_array::<FIXED_SIZE>()?;
    let raw = RawCurrentUser::read_from_bytes(&fixed)
        .map_err(|_| Error::InvalidFormat("unreadable CurrentUserAtom".to_string()))?;

    if raw.size.get() != FIXED_SIZE as u32 {
        return Err(Error::InvalidFormat(format!(
            "CurrentUserAtom size field is {}",
            raw.size.get()
        )));
    }
    let header_token = raw.header_token.get();
    if header_token != TOKEN_PLAIN && header_token != TOKEN_ENCRYPTED {
        return Err(Error::InvalidFormat(format!(
            "Invalid CurrentUser header token: 0x{:08X}",
            header_token
        )));
    }

    let len = raw.len_user_name.get() as usize;
    let ansi_name = r.read_ansi(len, ctx.codepage)?;
    let rel_version = if r.remaining() >= 4 {
        Some(r.read_u32()?)
    } else {
        None
    };
    // The Unicode copy of the name is optional and preferred.
    let user_name = if r.remaining() >= (len * 2) as u64 && len > 0 {
        r.read_utf16(len)?
    } else {
        ansi_name
    };
    r.skip(r.remaining())?;

    Ok(PptRecord::CurrentUser(CurrentUser {
        header_token,
        offset_to_current_edit: raw.offset_to_current_edit.get(),
        doc_file_version: raw.doc_file_version.get(),
        major_version: raw.major_version,
        minor_version: raw.minor_version,
        rel_version,
        user_name,
    }))
}

#[cfg(test)]
pub(crate) fn current_user_stream(token: u32, edit_offset: u32, name: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(FIXED_SIZE as u32).to_le_bytes());
    payload.extend_from_slice(&token.to_le_bytes());
    payload.extend_from_slice(&edit_offset.to_le_bytes());
    payload.extend_from_slice(&(name.len() as u16).to_le_bytes());
    payload.extend_from_slice(&0x03F4u16.to_le_bytes());
    payload.extend_from_slice(&[3, 0, 0, 0]);
    payload.extend_from_slice(name.as_bytes());
    payload.extend_from_slice(&8u32.to_le_bytes());
    for unit in name.encode_utf16() {
        payload.extend_from_slice(&unit.to_le_bytes());
    }
    super::records::office_record(super::records::tags::CURRENT_USER_ATOM, 0, 0, &payload)
}
