use super::cfb::{
    ChainKind, DirectoryEntry, DirectoryTree, Header, SectorTable, VirtualStream,
};
use super::consts::*;
use crate::common::error::{Error, Result};
use bytes::Bytes;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// An opened OLE2 structured storage file.
///
/// The header, allocation tables and directory are parsed once at open time
/// and never change afterwards. Streams are materialized lazily by
/// [`OleFile::open_stream`]; every stream keeps the container bytes alive on
/// its own, so the file may be dropped while streams are still being read.
///
/// # Example
///
/// ```no_run
/// use oleparse::ole::OleFile;
/// use std::io::Read;
///
/// # fn main() -> oleparse::common::Result<()> {
/// let ole = OleFile::open_path("document.doc")?;
/// let mut stream = ole.open_stream(&["WordDocument"])?;
/// let mut fib = [0u8; 32];
/// stream.read_exact(&mut fib)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OleFile {
    data: Bytes,
    header: Header,
    table: Arc<SectorTable>,
    directory: Arc<DirectoryTree>,
}

impl OleFile {
    /// Read an entire container from `reader` and parse it.
    pub fn open<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Open the container at `path`.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Parse a container held in memory.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let data: Bytes = data.into();
        let header = Header::parse(&data)?;
        let mut table = SectorTable::load(&data, &header)?;

        let dir_data = table.read_chain(&data, header.first_dir_sector)?;
        let directory = DirectoryTree::parse(&dir_data, header.sector_size)?;

        let root = directory.root();
        if root.start_sector != ENDOFCHAIN && root.size > 0 {
            table.attach_mini_stream(root.start_sector, root.size)?;
        }

        Ok(Self {
            data,
            header,
            table: Arc::new(table),
            directory: Arc::new(directory),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Sector size in bytes (512 or 4096).
    pub fn sector_size(&self) -> usize {
        self.header.sector_size
    }

    /// Total container size in bytes.
    pub fn file_size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The root storage entry.
    pub fn root(&self) -> &DirectoryEntry {
        self.directory.root()
    }

    pub fn directory(&self) -> &DirectoryTree {
        &self.directory
    }

    /// Directory entry at `path`; the empty path is the root.
    pub fn entry(&self, path: &[&str]) -> Result<&DirectoryEntry> {
        self.directory
            .resolve(path)
            .ok_or_else(|| Error::StreamNotFound(path.join("/")))
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> bool {
        self.directory.resolve(path).is_some()
    }

    /// List all streams in the OLE file
    ///
    /// Returns a list of stream paths (as vectors of storage/stream names)
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        self.directory.stream_paths()
    }

    /// Direct children of the storage at `path`.
    pub fn list_entries(&self, path: &[&str]) -> Result<Vec<&DirectoryEntry>> {
        let storage = self.entry(path)?;
        if !storage.is_storage() {
            return Err(Error::StreamNotFound(format!(
                "{} is not a storage",
                path.join("/")
            )));
        }
        Ok(self.directory.children(storage).collect())
    }

    /// Open the stream at `path` as an independent seekable view.
    ///
    /// Streams shorter than the mini stream cutoff are read from the mini
    /// stream when the container has one; everything else uses regular
    /// sectors. The chain is validated before the stream is returned.
    pub fn open_stream(&self, path: &[&str]) -> Result<VirtualStream> {
        let entry = self.entry(path)?;
        if !entry.is_stream() {
            return Err(Error::StreamNotFound(format!(
                "{} is not a stream",
                path.join("/")
            )));
        }

        let kind = if entry.size < MINI_STREAM_CUTOFF && self.table.has_mini_stream() {
            ChainKind::Mini
        } else {
            ChainKind::Regular
        };
        let start = if entry.size == 0 {
            ENDOFCHAIN
        } else {
            entry.start_sector
        };

        VirtualStream::open(
            self.data.clone(),
            Arc::clone(&self.table),
            kind,
            start,
            entry.size,
        )
    }

    /// Open a stream by a `/`-separated path such as `"ObjectPool/_1/Ole"`.
    pub fn open_stream_by_name(&self, name: &str) -> Result<VirtualStream> {
        let path: Vec<&str> = name
            .split(['/', '\\'])
            .filter(|part| !part.is_empty())
            .collect();
        self.open_stream(&path)
    }

    /// Read a whole stream into memory.
    pub fn read_stream(&self, path: &[&str]) -> Result<Vec<u8>> {
        self.open_stream(path)?.read_to_vec()
    }
}

/// Check if a file/data is an OLE file by checking magic bytes
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && &data[0..8] == MAGIC
}
