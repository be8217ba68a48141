//! PowerPoint record family.
//!
//! PowerPoint records share the Office drawing header: a 4-bit version, a
//! 12-bit instance, a 16-bit type and a 32-bit length. Records with version
//! 0xF are containers whose payload is a run of child records; they are
//! decoded recursively whatever their type. Atoms the presentation reader
//! needs have decoders below, everything else is kept opaque.

use super::current_user::{CurrentUser, decode_current_user};
use crate::common::binary::decode_latin1;
use crate::common::error::{Error, Result};
use crate::ole::context::ParseContext;
use crate::ole::reader::PayloadReader;
use crate::ole::record::{
    Decoder, HeaderLayout, RecordFamily, RecordHeader, RecordInfo, UnsupportedRecord, read_record,
};
use phf::phf_map;

/// Record type numbers.
pub mod tags {
    pub const DOCUMENT: u16 = 0x03E8;
    pub const DOCUMENT_ATOM: u16 = 0x03E9;
    pub const SLIDE: u16 = 0x03EE;
    pub const SLIDE_ATOM: u16 = 0x03EF;
    pub const NOTES: u16 = 0x03F0;
    pub const ENVIRONMENT: u16 = 0x03F2;
    pub const SLIDE_PERSIST_ATOM: u16 = 0x03F3;
    pub const MAIN_MASTER: u16 = 0x03F8;
    pub const PP_DRAWING: u16 = 0x040C;
    pub const TEXT_HEADER_ATOM: u16 = 0x0F9F;
    pub const TEXT_CHARS_ATOM: u16 = 0x0FA0;
    pub const STYLE_TEXT_PROP_ATOM: u16 = 0x0FA1;
    pub const TEXT_BYTES_ATOM: u16 = 0x0FA8;
    pub const CSTRING: u16 = 0x0FBA;
    pub const SLIDE_LIST_WITH_TEXT: u16 = 0x0FF0;
    pub const USER_EDIT_ATOM: u16 = 0x0FF5;
    pub const CURRENT_USER_ATOM: u16 = 0x0FF6;
    pub const PERSIST_DIRECTORY_ATOM: u16 = 0x1772;
}

/// A container record and its decoded children.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub tag: u16,
    pub instance: u16,
    pub children: Vec<PptRecord>,
}

impl Container {
    /// Direct children tagged `tag`.
    pub fn children_tagged(&self, tag: u16) -> impl Iterator<Item = &PptRecord> {
        self.children.iter().filter(move |child| child.tag() == tag)
    }

    /// First direct child container tagged `tag` with instance `instance`.
    pub fn child_container(&self, tag: u16, instance: u16) -> Option<&Container> {
        self.children.iter().find_map(|child| match child {
            PptRecord::Container(c) if c.tag == tag && c.instance == instance => Some(c),
            _ => None,
        })
    }

    /// Every text atom in this container and its descendants, in order.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        for child in &self.children {
            match child {
                PptRecord::TextChars(text) | PptRecord::TextBytes(text) => out.push(text),
                PptRecord::Container(c) => c.collect_texts(out),
                _ => {},
            }
        }
    }
}

/// DocumentAtom: presentation-wide sizes and master references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentAtom {
    /// Slide size in master units (1/576 inch)
    pub slide_size: (i32, i32),
    pub notes_size: (i32, i32),
    pub server_zoom: (i32, i32),
    pub notes_master_persist_id: u32,
    pub handout_master_persist_id: u32,
    pub first_slide_number: u16,
    pub slide_size_type: u16,
    pub save_with_fonts: bool,
    pub omit_title_place: bool,
    pub right_to_left: bool,
    pub show_comments: bool,
}

/// SlidePersistAtom: one slide in a SlideListWithText.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidePersistAtom {
    pub persist_id_ref: u32,
    pub flags: u32,
    /// Number of placeholder texts stored for this slide
    pub text_count: i32,
    pub slide_id: u32,
}

/// Placeholder role announced by a TextHeaderAtom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    Title,
    Body,
    Notes,
    Other,
    CenterBody,
    CenterTitle,
    HalfBody,
    QuarterBody,
    Unknown(u32),
}

impl From<u32> for TextType {
    fn from(value: u32) -> Self {
        match value {
            0 => TextType::Title,
            1 => TextType::Body,
            2 => TextType::Notes,
            4 => TextType::Other,
            5 => TextType::CenterBody,
            6 => TextType::CenterTitle,
            7 => TextType::HalfBody,
            8 => TextType::QuarterBody,
            other => TextType::Unknown(other),
        }
    }
}

/// UserEditAtom: one save of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEditAtom {
    pub last_slide_id_ref: u32,
    pub version: u16,
    pub minor_version: u8,
    pub major_version: u8,
    /// Offset of the previous UserEditAtom, 0 for the first save
    pub offset_last_edit: u32,
    pub offset_persist_directory: u32,
    pub doc_persist_id_ref: u32,
    pub persist_id_seed: u32,
    pub last_view: u16,
    pub encrypt_session_persist_id_ref: Option<u32>,
}

/// One run of a PersistDirectoryAtom: offsets for consecutive persist ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistDirectoryEntry {
    pub first_persist_id: u32,
    pub offsets: Vec<u32>,
}

/// A decoded PowerPoint record.
#[derive(Debug, Clone, PartialEq)]
pub enum PptRecord {
    Container(Container),
    Document(DocumentAtom),
    SlidePersist(SlidePersistAtom),
    TextHeader(TextType),
    TextChars(String),
    TextBytes(String),
    CString(String),
    UserEdit(UserEditAtom),
    PersistDirectory(Vec<PersistDirectoryEntry>),
    CurrentUser(CurrentUser),
    Unsupported(UnsupportedRecord),
}

impl PptRecord {
    /// Record type of this record.
    pub fn tag(&self) -> u16 {
        match self {
            PptRecord::Container(c) => c.tag,
            PptRecord::Document(_) => tags::DOCUMENT_ATOM,
            PptRecord::SlidePersist(_) => tags::SLIDE_PERSIST_ATOM,
            PptRecord::TextHeader(_) => tags::TEXT_HEADER_ATOM,
            PptRecord::TextChars(_) => tags::TEXT_CHARS_ATOM,
            PptRecord::TextBytes(_) => tags::TEXT_BYTES_ATOM,
            PptRecord::CString(_) => tags::CSTRING,
            PptRecord::UserEdit(_) => tags::USER_EDIT_ATOM,
            PptRecord::PersistDirectory(_) => tags::PERSIST_DIRECTORY_ATOM,
            PptRecord::CurrentUser(_) => tags::CURRENT_USER_ATOM,
            PptRecord::Unsupported(u) => u.tag(),
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            PptRecord::Container(c) => Some(c),
            _ => None,
        }
    }
}

fn decode_container(info: &RecordInfo, r: &mut PayloadReader<'_>, ctx: &mut ParseContext) -> Result<PptRecord> {
    ctx.enter()?;
    let mut children = Vec::new();
    let result = loop {
        if r.is_empty() {
            break Ok(());
        }
        match read_record::<PptRecord, _>(r, ctx) {
            Ok(child) => children.push(child),
            Err(e) => break Err(e),
        }
    };
    ctx.leave();
    result?;

    Ok(PptRecord::Container(Container {
        tag: info.header.tag,
        instance: info.header.instance,
        children,
    }))
}

fn decode_document_atom(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    Ok(PptRecord::Document(DocumentAtom {
        slide_size: (r.read_i32()?, r.read_i32()?),
        notes_size: (r.read_i32()?, r.read_i32()?),
        server_zoom: (r.read_i32()?, r.read_i32()?),
        notes_master_persist_id: r.read_u32()?,
        handout_master_persist_id: r.read_u32()?,
        first_slide_number: r.read_u16()?,
        slide_size_type: r.read_u16()?,
        save_with_fonts: r.read_u8()? != 0,
        omit_title_place: r.read_u8()? != 0,
        right_to_left: r.read_u8()? != 0,
        show_comments: r.read_u8()? != 0,
    }))
}

fn decode_slide_persist(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    let atom = SlidePersistAtom {
        persist_id_ref: r.read_u32()?,
        flags: r.read_u32()?,
        text_count: r.read_i32()?,
        slide_id: r.read_u32()?,
    };
    r.skip(4)?;
    Ok(PptRecord::SlidePersist(atom))
}

fn decode_text_header(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    Ok(PptRecord::TextHeader(TextType::from(r.read_u32()?)))
}

fn utf16_payload(info: &RecordInfo, r: &mut PayloadReader<'_>) -> Result<String> {
    if info.length % 2 != 0 {
        return Err(Error::InvalidFormat(format!(
            "UTF-16 record 0x{:04X} has odd length {}",
            info.header.tag, info.length
        )));
    }
    r.read_utf16(info.length / 2)
}

fn decode_text_chars(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    Ok(PptRecord::TextChars(utf16_payload(info, r)?))
}

fn decode_text_bytes(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    // Low bytes of UTF-16 code units.
    Ok(PptRecord::TextBytes(decode_latin1(&r.read_bytes(info.length)?)))
}

fn decode_cstring(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    Ok(PptRecord::CString(utf16_payload(info, r)?))
}

fn decode_user_edit(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    let mut atom = UserEditAtom {
        last_slide_id_ref: r.read_u32()?,
        version: r.read_u16()?,
        minor_version: r.read_u8()?,
        major_version: r.read_u8()?,
        offset_last_edit: r.read_u32()?,
        offset_persist_directory: r.read_u32()?,
        doc_persist_id_ref: r.read_u32()?,
        persist_id_seed: r.read_u32()?,
        last_view: r.read_u16()?,
        encrypt_session_persist_id_ref: None,
    };
    r.skip(2)?;
    if info.length >= 32 {
        atom.encrypt_session_persist_id_ref = Some(r.read_u32()?);
    }
    r.skip(r.remaining())?;
    Ok(PptRecord::UserEdit(atom))
}

fn decode_persist_directory(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<PptRecord> {
    let mut entries = Vec::new();
    while !r.is_empty() {
        let word = r.read_u32()?;
        let first_persist_id = word & 0x000F_FFFF;
        let count = word >> 20;
        let offsets = (0..count)
            .map(|_| r.read_u32())
            .collect::<Result<Vec<_>>>()?;
        entries.push(PersistDirectoryEntry {
            first_persist_id,
            offsets,
        });
    }
    Ok(PptRecord::PersistDirectory(entries))
}

static DECODERS: phf::Map<u16, Decoder<PptRecord>> = phf_map! {
    0x03E9u16 => decode_document_atom,
    0x03F3u16 => decode_slide_persist,
    0x0F9Fu16 => decode_text_header,
    0x0FA0u16 => decode_text_chars,
    0x0FA8u16 => decode_text_bytes,
    0x0FBAu16 => decode_cstring,
    0x0FF5u16 => decode_user_edit,
    0x0FF6u16 => decode_current_user,
    0x1772u16 => decode_persist_directory,
};

impl RecordFamily for PptRecord {
    const LAYOUT: HeaderLayout = HeaderLayout::Office;

    fn decoder(header: &RecordHeader) -> Option<Decoder<Self>> {
        if header.is_container() {
            return Some(decode_container);
        }
        DECODERS.get(&header.tag).copied()
    }

    fn unsupported(record: UnsupportedRecord) -> Self {
        PptRecord::Unsupported(record)
    }
}

/// Encode one Office-layout record.
#[cfg(test)]
pub(crate) fn office_record(tag: u16, instance: u16, version: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&((instance << 4) | version as u16).to_le_bytes());
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Encode a container around already-encoded children.
#[cfg(test)]
pub(crate) fn container(tag: u16, instance: u16, children: &[Vec<u8>]) -> Vec<u8> {
    office_record(tag, instance, 0x0F, &children.concat())
}
