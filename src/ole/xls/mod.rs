//! Legacy Excel (.xls) workbook reader
//!
//! Workbooks are a single `Workbook` stream (`Book` before Excel 97) of BIFF
//! records: a globals substream with the shared string table and one
//! BOUNDSHEET8 per sheet, followed by one substream per sheet located by the
//! absolute offsets those records carry.

/// BIFF record family and decoders
pub mod records;

/// BIFF8 string structures
pub mod strings;

/// Workbook parsing implementation
pub mod workbook;

pub use records::{SharedStringTable, XlsRecord, decode_rk};
pub use workbook::{Cell, CellValue, Workbook, Worksheet};
