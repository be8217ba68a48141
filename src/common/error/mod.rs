//! Unified error types for oleparse.
//!
//! This module provides the single error type shared by the container reader,
//! the record engine and the format parsers.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
