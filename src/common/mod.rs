//! Common types and utilities shared across formats.
//!
//! This module provides the unified error type and the slice-level binary
//! helpers used by every layer of the decoder.

// Submodule declarations
pub mod binary;
pub mod error;

// Re-exports for convenience
pub use error::{Error, Result};
