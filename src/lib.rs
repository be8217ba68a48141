//! oleparse - structural decoding of legacy Microsoft Office binary files
//!
//! Legacy Office files (.doc, .xls, .ppt) are OLE2 compound files: a small
//! FAT-style file system holding named streams. This crate reads that
//! container and the record structures the three formats build on top of it.
//!
//! # Features
//!
//! - **Compound files**: sector chains, mini stream, directory tree, seekable streams
//! - **Record engine**: BIFF and Office record headers, continuation merging,
//!   grammar slots with one-record lookahead, opaque capture of unknown records
//! - **Word property modifiers**: SPRM decoding and property exception resolution
//! - **DOC**: File Information Block, PLCs, formatted disk pages, sections
//! - **XLS**: workbook globals, shared strings, worksheet cells
//! - **PPT**: incremental-save resolution, document and slide containers, slide text
//!
//! # Example - Low-level OLE access
//!
//! ```no_run
//! use oleparse::ole::OleFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ole = OleFile::open_path("document.doc")?;
//!
//! for path in ole.list_streams() {
//!     println!("Stream: {}", path.join("/"));
//! }
//!
//! let data = ole.read_stream(&["WordDocument"])?;
//! println!("Stream size: {} bytes", data.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading a workbook
//!
//! ```no_run
//! use oleparse::ole::OleFile;
//! use oleparse::ole::xls::{CellValue, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let workbook = Workbook::open(&OleFile::open_path("book.xls")?)?;
//! for sheet in workbook.sheets() {
//!     for cell in &sheet.cells {
//!         if let CellValue::Text(text) = &cell.value {
//!             println!("{}!R{}C{}: {}", sheet.name(), cell.row + 1, cell.col + 1, text);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Error type and slice-level binary helpers
pub mod common;

/// OLE2 compound files and the record formats stored in them
pub mod ole;

pub use common::{Error, Result};
pub use ole::{OleFile, is_ole_file};
