//! BIFF record family for XLS workbooks.
//!
//! Every record type the workbook reader understands has a decoder in
//! [`DECODERS`]; anything else comes back as [`XlsRecord::Unsupported`]
//! with its raw payload.

use super::strings::{read_rich_string, read_short_string};
use crate::common::error::{Error, Result};
use crate::ole::context::{BiffVersion, ParseContext};
use crate::ole::reader::PayloadReader;
use crate::ole::record::{Decoder, HeaderLayout, RecordFamily, RecordHeader, RecordInfo, UnsupportedRecord};
use phf::phf_map;

/// Record type numbers.
pub mod tags {
    pub const FORMULA: u16 = 0x0006;
    pub const EOF: u16 = 0x000A;
    pub const DATE1904: u16 = 0x0022;
    pub const FILEPASS: u16 = 0x002F;
    pub const CONTINUE: u16 = 0x003C;
    pub const CODEPAGE: u16 = 0x0042;
    pub const BOUNDSHEET: u16 = 0x0085;
    pub const MULRK: u16 = 0x00BD;
    pub const SST: u16 = 0x00FC;
    pub const LABELSST: u16 = 0x00FD;
    pub const DIMENSIONS: u16 = 0x0200;
    pub const BLANK: u16 = 0x0201;
    pub const NUMBER: u16 = 0x0203;
    pub const BOOLERR: u16 = 0x0205;
    pub const RK: u16 = 0x027E;
    pub const BOF: u16 = 0x0809;
}

/// Substream announced by a BOF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstreamType {
    Globals,
    VbModule,
    Worksheet,
    Chart,
    MacroSheet,
    Workspace,
    Other(u16),
}

impl SubstreamType {
    fn from_u16(dt: u16) -> Self {
        match dt {
            0x0005 => SubstreamType::Globals,
            0x0006 => SubstreamType::VbModule,
            0x0010 => SubstreamType::Worksheet,
            0x0020 => SubstreamType::Chart,
            0x0040 => SubstreamType::MacroSheet,
            0x0100 => SubstreamType::Workspace,
            other => SubstreamType::Other(other),
        }
    }
}

/// BOF (Beginning of File) record
#[derive(Debug, Clone, PartialEq)]
pub struct Bof {
    pub version: BiffVersion,
    pub substream: SubstreamType,
}

/// Sheet visibility types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetVisible {
    Visible,
    Hidden,
    VeryHidden,
}

/// Sheet types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetType {
    WorkSheet,
    MacroSheet,
    ChartSheet,
    VbModule,
}

/// BoundSheet8 record (worksheet metadata)
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSheet {
    /// Stream offset of the sheet's BOF record
    pub position: u32,
    pub visible: SheetVisible,
    pub sheet_type: SheetType,
    pub name: String,
}

/// Dimensions record (worksheet bounds); last row and column are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u16,
    pub last_col: u16,
}

/// Shared string table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedStringTable {
    /// Total string references in the workbook
    pub total: u32,
    pub strings: Vec<String>,
}

impl SharedStringTable {
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoolErrValue {
    Bool(bool),
    Error(u8),
}

/// Cell records
#[derive(Debug, Clone, PartialEq)]
pub enum CellRecord {
    Blank {
        row: u16,
        col: u16,
        xf_index: u16,
    },
    Number {
        row: u16,
        col: u16,
        xf_index: u16,
        value: f64,
    },
    BoolErr {
        row: u16,
        col: u16,
        xf_index: u16,
        value: BoolErrValue,
    },
    Rk {
        row: u16,
        col: u16,
        xf_index: u16,
        value: f64,
    },
    MulRk {
        row: u16,
        first_col: u16,
        /// (xf_index, value) per column starting at `first_col`
        values: Vec<(u16, f64)>,
    },
    LabelSst {
        row: u16,
        col: u16,
        xf_index: u16,
        sst_index: u32,
    },
}

/// A decoded BIFF record.
#[derive(Debug, Clone, PartialEq)]
pub enum XlsRecord {
    Bof(Bof),
    Eof,
    CodePage(u16),
    Date1904(bool),
    BoundSheet(BoundSheet),
    Sst(SharedStringTable),
    /// A CONTINUE record not absorbed by a preceding record
    Continue(Vec<u8>),
    /// Workbook is encrypted; the payload describes the scheme
    FilePass(Vec<u8>),
    Dimensions(Dimensions),
    Cell(CellRecord),
    Unsupported(UnsupportedRecord),
}

/// Decode an RK number.
///
/// Bit 0 marks the value as multiplied by 100, bit 1 marks a 30-bit signed
/// integer; otherwise the upper 30 bits are the high bits of an IEEE double.
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = rk & 0x01 != 0;
    let is_int = rk & 0x02 != 0;

    let value = if is_int {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if div100 { value / 100.0 } else { value }
}

fn rest(r: &mut PayloadReader<'_>) -> Result<Vec<u8>> {
    r.read_bytes(r.remaining() as usize)
}

fn decode_bof(_: &RecordInfo, r: &mut PayloadReader<'_>, ctx: &mut ParseContext) -> Result<XlsRecord> {
    let raw_version = r.read_u16()?;
    let version = match raw_version {
        0x0600 => BiffVersion::Biff8,
        0x0500 => BiffVersion::Biff5,
        other => {
            return Err(Error::Unsupported(format!("BIFF version 0x{:04X}", other)));
        },
    };
    let substream = SubstreamType::from_u16(r.read_u16()?);
    // Build identifiers and file history flags.
    rest(r)?;

    ctx.biff_version = version;
    Ok(XlsRecord::Bof(Bof { version, substream }))
}

fn decode_eof(_: &RecordInfo, _: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    Ok(XlsRecord::Eof)
}

fn decode_codepage(_: &RecordInfo, r: &mut PayloadReader<'_>, ctx: &mut ParseContext) -> Result<XlsRecord> {
    let codepage = r.read_u16()?;
    ctx.codepage = codepage;
    Ok(XlsRecord::CodePage(codepage))
}

fn decode_date1904(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    Ok(XlsRecord::Date1904(r.read_u16()? != 0))
}

fn decode_boundsheet(_: &RecordInfo, r: &mut PayloadReader<'_>, ctx: &mut ParseContext) -> Result<XlsRecord> {
    let position = r.read_u32()?;
    let visible = match r.read_u8()? & 0x03 {
        0x00 => SheetVisible::Visible,
        0x01 => SheetVisible::Hidden,
        0x02 => SheetVisible::VeryHidden,
        v => {
            return Err(Error::InvalidFormat(format!("Invalid visibility value: {}", v)));
        },
    };
    let sheet_type = match r.read_u8()? {
        0x00 => SheetType::WorkSheet,
        0x01 => SheetType::MacroSheet,
        0x02 => SheetType::ChartSheet,
        0x06 => SheetType::VbModule,
        v => return Err(Error::InvalidFormat(format!("Invalid sheet type: {}", v))),
    };
    let name = read_short_string(r, ctx)?;
    Ok(XlsRecord::BoundSheet(BoundSheet {
        position,
        visible,
        sheet_type,
        name,
    }))
}

fn decode_sst(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let total = r.read_u32()?;
    let unique = r.read_u32()?;
    let mut strings = Vec::with_capacity(unique.min(0x10000) as usize);
    for _ in 0..unique {
        strings.push(read_rich_string(r, info)?);
    }
    Ok(XlsRecord::Sst(SharedStringTable { total, strings }))
}

fn decode_continue(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    Ok(XlsRecord::Continue(rest(r)?))
}

fn decode_filepass(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    Ok(XlsRecord::FilePass(rest(r)?))
}

fn decode_dimensions(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let dimensions = match info.length {
        14 => {
            let dims = Dimensions {
                first_row: r.read_u32()?,
                last_row: r.read_u32()?,
                first_col: r.read_u16()?,
                last_col: r.read_u16()?,
            };
            r.skip(2)?;
            dims
        },
        10 => {
            let dims = Dimensions {
                first_row: r.read_u16()? as u32,
                last_row: r.read_u16()? as u32,
                first_col: r.read_u16()?,
                last_col: r.read_u16()?,
            };
            r.skip(2)?;
            dims
        },
        other => {
            return Err(Error::InvalidFormat(format!(
                "DIMENSIONS record of {} bytes",
                other
            )));
        },
    };
    Ok(XlsRecord::Dimensions(dimensions))
}

fn cell_position(r: &mut PayloadReader<'_>) -> Result<(u16, u16, u16)> {
    Ok((r.read_u16()?, r.read_u16()?, r.read_u16()?))
}

fn decode_blank(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let (row, col, xf_index) = cell_position(r)?;
    Ok(XlsRecord::Cell(CellRecord::Blank { row, col, xf_index }))
}

fn decode_number(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let (row, col, xf_index) = cell_position(r)?;
    let value = r.read_f64()?;
    Ok(XlsRecord::Cell(CellRecord::Number {
        row,
        col,
        xf_index,
        value,
    }))
}

fn decode_rk_record(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let (row, col, xf_index) = cell_position(r)?;
    let value = decode_rk(r.read_u32()?);
    Ok(XlsRecord::Cell(CellRecord::Rk {
        row,
        col,
        xf_index,
        value,
    }))
}

fn decode_mulrk(info: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    // rw, colFirst, n * (ixfe, rk), colLast
    if info.length < 6 || (info.length - 6) % 6 != 0 {
        return Err(Error::InvalidFormat(format!(
            "MULRK record of {} bytes",
            info.length
        )));
    }
    let count = (info.length - 6) / 6;
    let row = r.read_u16()?;
    let first_col = r.read_u16()?;
    let values = (0..count)
        .map(|_| -> Result<(u16, f64)> { Ok((r.read_u16()?, decode_rk(r.read_u32()?))) })
        .collect::<Result<Vec<_>>>()?;
    let last_col = r.read_u16()?;
    if last_col as usize + 1 != first_col as usize + count {
        return Err(Error::InvalidFormat(format!(
            "MULRK columns {}..={} do not match {} values",
            first_col, last_col, count
        )));
    }
    Ok(XlsRecord::Cell(CellRecord::MulRk {
        row,
        first_col,
        values,
    }))
}

fn decode_labelsst(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let (row, col, xf_index) = cell_position(r)?;
    let sst_index = r.read_u32()?;
    Ok(XlsRecord::Cell(CellRecord::LabelSst {
        row,
        col,
        xf_index,
        sst_index,
    }))
}

fn decode_boolerr(_: &RecordInfo, r: &mut PayloadReader<'_>, _: &mut ParseContext) -> Result<XlsRecord> {
    let (row, col, xf_index) = cell_position(r)?;
    let raw = r.read_u8()?;
    let value = if r.read_u8()? != 0 {
        BoolErrValue::Error(raw)
    } else {
        BoolErrValue::Bool(raw != 0)
    };
    Ok(XlsRecord::Cell(CellRecord::BoolErr {
        row,
        col,
        xf_index,
        value,
    }))
}

static DECODERS: phf::Map<u16, Decoder<XlsRecord>> = phf_map! {
    0x0809u16 => decode_bof,
    0x000Au16 => decode_eof,
    0x0042u16 => decode_codepage,
    0x0022u16 => decode_date1904,
    0x0085u16 => decode_boundsheet,
    0x00FCu16 => decode_sst,
    0x003Cu16 => decode_continue,
    0x002Fu16 => decode_filepass,
    0x0200u16 => decode_dimensions,
    0x0201u16 => decode_blank,
    0x0203u16 => decode_number,
    0x027Eu16 => decode_rk_record,
    0x00BDu16 => decode_mulrk,
    0x00FDu16 => decode_labelsst,
    0x0205u16 => decode_boolerr,
};

impl RecordFamily for XlsRecord {
    const LAYOUT: HeaderLayout = HeaderLayout::Biff;
    const CONTINUATION_TAG: Option<u16> = Some(tags::CONTINUE);

    fn decoder(header: &RecordHeader) -> Option<Decoder<Self>> {
        DECODERS.get(&header.tag).copied()
    }

    fn unsupported(record: UnsupportedRecord) -> Self {
        XlsRecord::Unsupported(record)
    }

    fn merges_continuations(tag: u16) -> bool {
        tag == tags::SST
    }
}

#[cfg(test)]
pub(crate) fn biff(tag: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}
