//! Workbook reader for XLS files.

use super::records::{
    BoolErrValue, Bof, BoundSheet, CellRecord, Dimensions, SharedStringTable, SheetType,
    SubstreamType, XlsRecord, tags,
};
use crate::common::error::{Error, Result};
use crate::ole::OleFile;
use crate::ole::cfb::VirtualStream;
use crate::ole::context::{BiffVersion, ParseContext};
use crate::ole::reader::VirtualStreamReader;
use crate::ole::record::{RecordCursor, UnsupportedRecord};

/// Stream name used by Excel 97 and later
pub const WORKBOOK_STREAM: &str = "Workbook";
/// Stream name used by Excel 5.0/95
pub const BOOK_STREAM: &str = "Book";

type Cursor<'r> = RecordCursor<'r, XlsRecord, VirtualStream>;

/// Value of a cell after shared-string resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// BIFF error code (`0x07` is `#DIV/0!`, `0x2A` is `#N/A`, ...)
    Error(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
    pub xf_index: u16,
    pub value: CellValue,
}

/// One sheet of the workbook.
///
/// Only worksheets have their cells decoded; chart, macro and module sheets
/// keep their BOUNDSHEET8 metadata only.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    pub info: BoundSheet,
    pub dimensions: Option<Dimensions>,
    pub cells: Vec<Cell>,
}

impl Worksheet {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }
}

/// A decoded XLS workbook.
///
/// # Example
///
/// ```no_run
/// use oleparse::ole::OleFile;
/// use oleparse::ole::xls::Workbook;
///
/// let ole = OleFile::open_path("book.xls")?;
/// let workbook = Workbook::open(&ole)?;
/// for sheet in workbook.sheets() {
///     println!("{}: {} cells", sheet.name(), sheet.cells.len());
/// }
/// # Ok::<(), oleparse::common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Workbook {
    biff_version: BiffVersion,
    codepage: u16,
    date1904: bool,
    sst: SharedStringTable,
    sheets: Vec<Worksheet>,
    unsupported: Vec<UnsupportedRecord>,
}

#[derive(Default)]
struct Globals {
    date1904: bool,
    sst: SharedStringTable,
    bound_sheets: Vec<BoundSheet>,
}

impl Workbook {
    /// Decode the `Workbook` (or `Book`) stream of `ole`.
    pub fn open(ole: &OleFile) -> Result<Self> {
        let name = [WORKBOOK_STREAM, BOOK_STREAM]
            .into_iter()
            .find(|name| ole.exists(&[*name]))
            .ok_or_else(|| Error::StreamNotFound(WORKBOOK_STREAM.to_string()))?;
        let mut reader = VirtualStreamReader::new(ole.open_stream(&[name])?)?;
        let mut ctx = ParseContext::new();
        let mut cursor = RecordCursor::new(&mut reader, &mut ctx);

        let globals = read_globals(&mut cursor)?;
        let stream_len = cursor.reader().len();

        let mut sheets = Vec::with_capacity(globals.bound_sheets.len());
        for info in globals.bound_sheets {
            if info.position as u64 >= stream_len {
                return Err(Error::InvalidFormat(format!(
                    "sheet '{}' starts at {} beyond the {}-byte workbook stream",
                    info.name, info.position, stream_len
                )));
            }
            if info.sheet_type != SheetType::WorkSheet {
                log::debug!("skipping {:?} '{}'", info.sheet_type, info.name);
                sheets.push(Worksheet {
                    info,
                    dimensions: None,
                    cells: Vec::new(),
                });
                continue;
            }

            cursor.reader().seek_to(info.position as u64)?;
            let (dimensions, records) = read_sheet(&mut cursor)?;
            let cells = records
                .into_iter()
                .map(|record| resolve(record, &globals.sst))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect();
            sheets.push(Worksheet {
                info,
                dimensions,
                cells,
            });
        }

        let unsupported = cursor.take_unsupported();
        log::debug!(
            "decoded {} sheets, {} shared strings, {} opaque records",
            sheets.len(),
            globals.sst.len(),
            unsupported.len()
        );

        Ok(Self {
            biff_version: ctx.biff_version,
            codepage: ctx.codepage,
            date1904: globals.date1904,
            sst: globals.sst,
            sheets,
            unsupported,
        })
    }

    pub fn biff_version(&self) -> BiffVersion {
        self.biff_version
    }

    /// Codepage from the CODEPAGE record, or the default.
    pub fn codepage(&self) -> u16 {
        self.codepage
    }

    /// Whether dates count from 1904-01-01 instead of 1900-01-01.
    pub fn is_1904_date_system(&self) -> bool {
        self.date1904
    }

    pub fn shared_strings(&self) -> &SharedStringTable {
        &self.sst
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Worksheet::name).collect()
    }

    /// Records without a decoder, in stream order.
    pub fn unsupported_records(&self) -> &[UnsupportedRecord] {
        &self.unsupported
    }
}

fn expect_bof(record: XlsRecord) -> Result<Bof> {
    match record {
        XlsRecord::Bof(bof) => Ok(bof),
        other => Err(Error::InvalidFormat(format!("expected BOF, decoded {:?}", other))),
    }
}

/// `BOF [FILEPASS] *record EOF`
fn read_globals(cursor: &mut Cursor<'_>) -> Result<Globals> {
    let bof = expect_bof(cursor.required(tags::BOF)?)?;
    if bof.substream != SubstreamType::Globals {
        return Err(Error::InvalidFormat(format!(
            "workbook stream starts with a {:?} substream",
            bof.substream
        )));
    }

    let mut globals = Globals::default();
    for record in cursor.repeated_until(|tag| tag == tags::EOF)? {
        match record {
            XlsRecord::FilePass(_) => {
                return Err(Error::Unsupported("encrypted workbooks".to_string()));
            },
            XlsRecord::Date1904(flag) => globals.date1904 = flag,
            XlsRecord::BoundSheet(sheet) => globals.bound_sheets.push(sheet),
            XlsRecord::Sst(sst) => globals.sst = sst,
            XlsRecord::Continue(bytes) => {
                log::warn!("orphan CONTINUE record of {} bytes in globals", bytes.len());
            },
            _ => {},
        }
    }
    cursor.required(tags::EOF)?;
    Ok(globals)
}

/// `BOF *record [DIMENSIONS] *record EOF`
///
/// Embedded substreams (charts on a worksheet) are walked through to their
/// own EOF and ignored.
fn read_sheet(cursor: &mut Cursor<'_>) -> Result<(Option<Dimensions>, Vec<CellRecord>)> {
    let bof = expect_bof(cursor.required(tags::BOF)?)?;
    if bof.substream != SubstreamType::Worksheet {
        return Err(Error::InvalidFormat(format!(
            "worksheet entry points at a {:?} substream",
            bof.substream
        )));
    }

    let mut dimensions = None;
    let mut cells = Vec::new();
    let mut depth = 0usize;
    loop {
        let record = cursor.next()?.ok_or(Error::UnexpectedRecord {
            expected: tags::EOF,
            found: None,
        })?;
        match record {
            XlsRecord::Bof(_) => depth += 1,
            XlsRecord::Eof if depth == 0 => break,
            XlsRecord::Eof => depth -= 1,
            _ if depth > 0 => {},
            XlsRecord::Dimensions(dims) => {
                dimensions.get_or_insert(dims);
            },
            XlsRecord::Cell(cell) => cells.push(cell),
            _ => {},
        }
    }
    Ok((dimensions, cells))
}

fn resolve(record: CellRecord, sst: &SharedStringTable) -> Result<Vec<Cell>> {
    let cell = |row, col, xf_index, value| Cell {
        row,
        col,
        xf_index,
        value,
    };
    let cells = match record {
        CellRecord::Blank { row, col, xf_index } => vec![cell(row, col, xf_index, CellValue::Empty)],
        CellRecord::Number {
            row,
            col,
            xf_index,
            value,
        }
        | CellRecord::Rk {
            row,
            col,
            xf_index,
            value,
        } => vec![cell(row, col, xf_index, CellValue::Number(value))],
        CellRecord::BoolErr {
            row,
            col,
            xf_index,
            value,
        } => {
            let value = match value {
                BoolErrValue::Bool(b) => CellValue::Bool(b),
                BoolErrValue::Error(code) => CellValue::Error(code),
            };
            vec![cell(row, col, xf_index, value)]
        },
        CellRecord::MulRk {
            row,
            first_col,
            values,
        } => values
            .into_iter()
            .enumerate()
            .map(|(i, (xf_index, value))| {
                cell(row, first_col + i as u16, xf_index, CellValue::Number(value))
            })
            .collect(),
        CellRecord::LabelSst {
            row,
            col,
            xf_index,
            sst_index,
        } => {
            let text = sst.get(sst_index).ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "cell ({}, {}) references shared string {} of {}",
                    row,
                    col,
                    sst_index,
                    sst.len()
                ))
            })?;
            vec![cell(row, col, xf_index, CellValue::Text(text.to_string()))]
        },
    };
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::cfb::test_image::ImageBuilder;
    use crate::ole::xls::records::biff;

    fn bof(substream: u16) -> Vec<u8> {
        let mut payload = 0x0600u16.to_le_bytes().to_vec();
        payload.extend_from_slice(&substream.to_le_bytes());
        payload.extend_from_slice(&[0; 12]);
        biff(tags::BOF, &payload)
    }

    fn boundsheet(position: u32, sheet_type: u8, name: &str) -> Vec<u8> {
        let mut payload = position.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0, sheet_type, name.len() as u8, 0]);
        payload.extend_from_slice(name.as_bytes());
        biff(tags::BOUNDSHEET, &payload)
    }

    fn sst(strings: &[&str]) -> Vec<u8> {
        let mut payload = (strings.len() as u32).to_le_bytes().to_vec();
        payload.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        for s in strings {
            payload.extend_from_slice(&(s.len() as u16).to_le_bytes());
            payload.push(0);
            payload.extend_from_slice(s.as_bytes());
        }
        biff(tags::SST, &payload)
    }

    fn cell_header(row: u16, col: u16) -> Vec<u8> {
        let mut payload = row.to_le_bytes().to_vec();
        payload.extend_from_slice(&col.to_le_bytes());
        payload.extend_from_slice(&15u16.to_le_bytes());
        payload
    }

    fn globals(sheet_pos: u32, extra: &[u8]) -> Vec<u8> {
        let mut out = bof(0x0005);
        out.extend(extra);
        out.extend(biff(tags::CODEPAGE, &1200u16.to_le_bytes()));
        out.extend(biff(tags::DATE1904, &1u16.to_le_bytes()));
        out.extend(boundsheet(sheet_pos, 0, "Data"));
        out.extend(boundsheet(0, 2, "Chart1"));
        out.extend(sst(&["alpha", "beta"]));
        out.extend(biff(tags::EOF, &[]));
        out
    }

    fn worksheet(sst_index: u32) -> Vec<u8> {
        let mut out = bof(0x0010);
        let mut dims = 0u32.to_le_bytes().to_vec();
        dims.extend_from_slice(&3u32.to_le_bytes());
        dims.extend_from_slice(&[0, 0, 4, 0, 0, 0]);
        out.extend(biff(tags::DIMENSIONS, &dims));

        let mut label = cell_header(0, 0);
        label.extend_from_slice(&sst_index.to_le_bytes());
        out.extend(biff(tags::LABELSST, &label));

        let mut number = cell_header(1, 0);
        number.extend_from_slice(&3.5f64.to_le_bytes());
        out.extend(biff(tags::NUMBER, &number));

        // Formula cells stay opaque.
        out.extend(biff(tags::FORMULA, &[0; 20]));

        // Embedded chart substream.
        out.extend(bof(0x0020));
        let mut hidden = cell_header(9, 9);
        hidden.extend_from_slice(&1.0f64.to_le_bytes());
        out.extend(biff(tags::NUMBER, &hidden));
        out.extend(biff(tags::EOF, &[]));

        let mut rk = cell_header(2, 1);
        rk.extend_from_slice(&((7u32 << 2) | 2).to_le_bytes());
        out.extend(biff(tags::RK, &rk));

        let mut boolerr = cell_header(2, 2);
        boolerr.extend_from_slice(&[1, 0]);
        out.extend(biff(tags::BOOLERR, &boolerr));

        out.extend(biff(tags::BLANK, &cell_header(2, 3)));
        out.extend(biff(tags::EOF, &[]));
        out
    }

    fn stream(extra_globals: &[u8], sst_index: u32) -> Vec<u8> {
        let pos = globals(0, extra_globals).len() as u32;
        let mut data = globals(pos, extra_globals);
        data.extend(worksheet(sst_index));
        data
    }

    fn open(name: &str, data: &[u8]) -> Result<Workbook> {
        let image = ImageBuilder::new(512).stream(name, data).build();
        Workbook::open(&OleFile::from_bytes(image)?)
    }

    #[test]
    fn test_open_workbook() {
        let workbook = open(WORKBOOK_STREAM, &stream(&[], 1)).unwrap();
        assert_eq!(workbook.biff_version(), BiffVersion::Biff8);
        assert_eq!(workbook.codepage(), 1200);
        assert!(workbook.is_1904_date_system());
        assert_eq!(workbook.sheet_names(), vec!["Data", "Chart1"]);
        assert_eq!(workbook.shared_strings().strings, vec!["alpha", "beta"]);

        let sheet = workbook.sheet("Data").unwrap();
        assert_eq!(sheet.dimensions.map(|d| d.last_row), Some(3));
        assert_eq!(sheet.cells.len(), 5);
        assert_eq!(sheet.cell(0, 0).unwrap().value, CellValue::Text("beta".to_string()));
        assert_eq!(sheet.cell(1, 0).unwrap().value, CellValue::Number(3.5));
        assert_eq!(sheet.cell(2, 1).unwrap().value, CellValue::Number(7.0));
        assert_eq!(sheet.cell(2, 2).unwrap().value, CellValue::Bool(true));
        assert_eq!(sheet.cell(2, 3).unwrap().value, CellValue::Empty);
        assert!(sheet.cell(9, 9).is_none());

        assert!(workbook.sheet("Chart1").unwrap().cells.is_empty());
        let opaque: Vec<u16> = workbook
            .unsupported_records()
            .iter()
            .map(UnsupportedRecord::tag)
            .collect();
        assert_eq!(opaque, vec![tags::FORMULA]);
    }

    #[test]
    fn test_book_stream_fallback() {
        let workbook = open(BOOK_STREAM, &stream(&[], 0)).unwrap();
        assert_eq!(
            workbook.sheet("Data").unwrap().cell(0, 0).unwrap().value,
            CellValue::Text("alpha".to_string())
        );
    }

    #[test]
    fn test_filepass_is_unsupported() {
        let filepass = biff(tags::FILEPASS, &[0, 0, 0, 0, 0, 0]);
        assert!(matches!(
            open(WORKBOOK_STREAM, &stream(&filepass, 0)),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_bad_sst_index() {
        assert!(matches!(
            open(WORKBOOK_STREAM, &stream(&[], 2)),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_sheet_offset_out_of_bounds() {
        let data = globals(0x10000, &[]);
        assert!(matches!(
            open(WORKBOOK_STREAM, &data),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_sheet_eof() {
        let mut data = stream(&[], 0);
        data.truncate(data.len() - 4);
        assert!(matches!(
            open(WORKBOOK_STREAM, &data),
            Err(Error::UnexpectedRecord {
                expected: tags::EOF,
                found: None
            })
        ));
    }

    #[test]
    fn test_missing_workbook_stream() {
        let image = ImageBuilder::new(512).stream("Other", &[0; 8]).build();
        let ole = OleFile::from_bytes(image).unwrap();
        assert!(matches!(Workbook::open(&ole), Err(Error::StreamNotFound(_))));
    }
}
