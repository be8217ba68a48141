//! Compound File Binary container internals.
//!
//! The layers build on each other: [`header`] locates the allocation tables,
//! [`sector`] turns them into successor tables, [`directory`] links the
//! directory entries into a tree, and [`stream`] reads a chain as one
//! seekable byte stream.

pub mod directory;
pub mod header;
pub mod sector;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_image;

pub use directory::{DirectoryEntry, DirectoryTree, EntryKind};
pub use header::Header;
pub use sector::{ChainKind, ChainWalk, SectorTable};
pub use stream::VirtualStream;
