//! Per-document parse state.

use super::codepage::DEFAULT_CODEPAGE;
use crate::common::error::{Error, Result};

/// Deepest container nesting a record decoder may enter.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// BIFF version announced by the BOF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiffVersion {
    /// BIFF5 (Excel 5.0/95)
    Biff5,
    /// BIFF8 (Excel 97 and later)
    #[default]
    Biff8,
}

/// Mutable state threaded through one document's decode.
///
/// Record decoders read the codepage from here and allocate object ids
/// through [`ParseContext::allocate_id`]; nothing is shared between
/// documents, so independent documents can be parsed on separate threads.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Codepage for 8-bit strings (CODEPAGE record or document default)
    pub codepage: u16,
    pub biff_version: BiffVersion,
    next_id: u32,
    depth: u32,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseContext {
    pub fn new() -> Self {
        Self::with_id_seed(1)
    }

    /// Start id allocation at `seed`.
    pub fn with_id_seed(seed: u32) -> Self {
        Self {
            codepage: DEFAULT_CODEPAGE,
            biff_version: BiffVersion::default(),
            next_id: seed,
            depth: 0,
        }
    }

    /// Hand out the next object id of this document.
    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Enter a nested container; fails past [`MAX_NESTING_DEPTH`].
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(Error::InvalidFormat(format!(
                "containers nested deeper than {}",
                MAX_NESTING_DEPTH
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}
