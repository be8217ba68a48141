//! Unified error type for structural decoding.
//!
//! Every fault except an unsupported record aborts the parse of the current
//! document: later structures are located through offsets computed from
//! earlier ones, so continuing past a fault would yield wrong data.
use thiserror::Error;

/// Main error type for oleparse operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad signature, sector size, out-of-range sector or broken directory
    #[error("Corrupted container: {0}")]
    ContainerCorrupt(String),

    /// A sector chain revisits a sector it already walked through
    #[error("Cyclic sector chain starting at sector {start}: sector {sector} revisited")]
    CyclicSectorChain { start: u32, sector: u32 },

    /// No stream exists at the requested path
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Fewer bytes remain than a read requested
    #[error("Truncated stream: requested {requested} bytes, {available} available")]
    TruncatedStream { requested: u64, available: u64 },

    /// A record decoder consumed a different number of bytes than the header declared
    #[error("Record 0x{tag:04X} declared {declared} bytes but the decoder consumed {consumed}")]
    RecordLengthMismatch {
        tag: u16,
        declared: u64,
        consumed: u64,
    },

    /// A required grammar slot did not find its record
    #[error("Unexpected record: expected 0x{expected:04X}, found {}", display_tag(.found))]
    UnexpectedRecord { expected: u16, found: Option<u16> },

    /// The operand size class of a property modifier has no size
    #[error("Unknown operand size for SPRM 0x{opcode:04X}")]
    OperandSizeUnknown { opcode: u16 },

    /// The target kind bits of a property modifier are out of range
    #[error("Invalid SPRM opcode 0x{opcode:04X}")]
    InvalidSprm { opcode: u16 },

    /// A FIB (offset, length) pair points outside its stream
    #[error(
        "FIB pointer {pointer} (offset {offset}, length {length}) exceeds stream length {stream_len}"
    )]
    FibPointerOutOfBounds {
        pointer: &'static str,
        offset: u32,
        length: u32,
        stream_len: u64,
    },

    /// Format-level validation failure
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

fn display_tag(tag: &Option<u16>) -> String {
    match tag {
        Some(tag) => format!("0x{:04X}", tag),
        None => "end of stream".to_string(),
    }
}

impl Error {
    /// Shorthand for a truncation fault.
    #[inline]
    pub(crate) fn truncated(requested: u64, available: u64) -> Self {
        Error::TruncatedStream {
            requested,
            available,
        }
    }
}

/// Result type for oleparse operations.
pub type Result<T> = std::result::Result<T, Error>;
