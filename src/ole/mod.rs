/// Constants for OLE file format
pub mod consts;

/// Compound file structures: header, allocation tables, directory, streams
pub mod cfb;

/// Main OLE file parsing implementation
mod file;

/// Typed reads over streams and record payloads
pub mod reader;

/// Per-document parse state
pub mod context;

/// Windows codepage decoding
pub mod codepage;

/// Tagged-record engine shared by the BIFF and PowerPoint parsers
pub mod record;

/// Word property modifiers
pub mod sprm;

/// Word property modifier opcodes
pub mod sprm_operations;

/// Legacy Word document (.doc) reader
#[cfg(feature = "doc")]
pub mod doc;

/// Legacy Excel workbook (.xls) reader
#[cfg(feature = "xls")]
pub mod xls;

/// Legacy PowerPoint presentation (.ppt) reader
#[cfg(feature = "ppt")]
pub mod ppt;

// Re-export public types for convenient access
pub use cfb::{DirectoryEntry, EntryKind, VirtualStream};
pub use context::ParseContext;
pub use file::{OleFile, is_ole_file};
pub use reader::{PayloadReader, VirtualStreamReader};
