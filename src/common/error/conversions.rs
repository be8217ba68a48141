//! Error conversion implementations.
//!
//! This module contains From trait implementations between the slice-level
//! binary errors, the unified Error type and `std::io::Error`.

use super::types::Error;
use crate::common::binary::BinaryError;
use std::io;

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        match err {
            BinaryError::InsufficientData {
                expected,
                available,
            } => Error::truncated(expected as u64, available as u64),
        }
    }
}

// `Read`/`Seek` implementations must speak `io::Error`; the original error is
// kept as the source so callers can downcast it back.
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::TruncatedStream { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
