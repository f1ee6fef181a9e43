//! Entry records and their payload state.

use crate::codec::EntryStat;
use crate::{EntryName, Result, Timestamp};

/// Where an entry's bytes currently live.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Payload {
    /// Only in the backing archive; nothing is held in memory.
    #[default]
    Unloaded,
    /// Extracted from the backing archive and cached, still unchanged.
    Loaded(Vec<u8>),
    /// Set by the caller; must be compressed on save.
    Modified(Vec<u8>),
}

impl Payload {
    pub(crate) fn state(&self) -> PayloadState {
        match self {
            Payload::Unloaded => PayloadState::Unloaded,
            Payload::Loaded(_) => PayloadState::Loaded,
            Payload::Modified(_) => PayloadState::Modified,
        }
    }

    /// Returns the in-memory bytes, if any.
    pub(crate) fn bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Unloaded => None,
            Payload::Loaded(data) | Payload::Modified(data) => Some(data),
        }
    }
}

/// Public view of an entry's payload state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadState {
    /// Data is only in the backing archive.
    Unloaded,
    /// Data has been read into memory and is unchanged.
    Loaded,
    /// Data was replaced in memory and will be recompressed on save.
    Modified,
}

/// One entry of the table.
#[derive(Debug, Clone)]
pub(crate) struct EntryRecord {
    pub(crate) index: u64,
    pub(crate) name: EntryName,
    pub(crate) is_directory: bool,
    pub(crate) is_encrypted: bool,
    pub(crate) is_supported: bool,
    pub(crate) compressed_size: Option<u64>,
    pub(crate) uncompressed_size: u64,
    pub(crate) crc32: Option<u32>,
    pub(crate) timestamp: Timestamp,
    pub(crate) comment: String,
    pub(crate) payload: Payload,
    /// Position of the record in the backing archive's central directory.
    pub(crate) source: Option<usize>,
}

impl EntryRecord {
    /// Creates an empty record that exists only in memory.
    pub(crate) fn fresh(index: u64, name: EntryName) -> Self {
        Self {
            index,
            is_directory: name.is_directory(),
            name,
            is_encrypted: false,
            is_supported: true,
            compressed_size: None,
            uncompressed_size: 0,
            crc32: Some(0),
            timestamp: Timestamp::now(),
            comment: String::new(),
            payload: Payload::Modified(Vec::new()),
            source: None,
        }
    }

    /// Creates a record backed by the central directory entry `stat`.
    ///
    /// `index` is the record's ordinal in the stored central directory.
    pub(crate) fn from_stat(index: u64, stat: EntryStat) -> Result<Self> {
        let name = EntryName::try_from(stat.name)?;
        Ok(Self {
            index,
            is_directory: stat.is_directory || name.is_directory(),
            name,
            is_encrypted: stat.is_encrypted,
            is_supported: stat.is_supported,
            compressed_size: Some(stat.compressed_size),
            uncompressed_size: stat.uncompressed_size,
            crc32: Some(stat.crc32),
            timestamp: stat.modified.unwrap_or_default(),
            comment: stat.comment,
            payload: Payload::Unloaded,
            source: Some(stat.position),
        })
    }

    /// Replaces the payload with caller-provided bytes.
    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.uncompressed_size = data.len() as u64;
        self.compressed_size = None;
        self.crc32 = Some(crc32fast::hash(&data));
        self.payload = Payload::Modified(data);
    }

    /// Returns true if save must copy this record from the backing archive.
    pub(crate) fn needs_raw_copy(&self) -> bool {
        !matches!(self.payload, Payload::Modified(_))
    }

    pub(crate) fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            index: self.index,
            name: self.name.as_str().to_string(),
            is_directory: self.is_directory,
            is_encrypted: self.is_encrypted,
            is_supported: self.is_supported,
            compressed_size: self.compressed_size,
            uncompressed_size: self.uncompressed_size,
            crc32: self.crc32,
            timestamp: self.timestamp,
            comment: self.comment.clone(),
            state: self.payload.state(),
        }
    }
}

/// A snapshot of an entry's declared fields.
///
/// Taking a snapshot never reads entry data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Record index, unique within the session.
    pub index: u64,
    /// Entry name.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Whether the stored data is encrypted.
    pub is_encrypted: bool,
    /// Whether the stored data can be extracted by this build.
    pub is_supported: bool,
    /// Compressed size on disk, unknown for data set in memory.
    pub compressed_size: Option<u64>,
    /// Size of the data in bytes.
    pub uncompressed_size: u64,
    /// CRC-32 of the data, if known.
    pub crc32: Option<u32>,
    /// Modification time.
    pub timestamp: Timestamp,
    /// Entry comment, empty if none.
    pub comment: String,
    /// Payload state at the time of the snapshot.
    pub state: PayloadState,
}

impl EntryMetadata {
    /// Returns the ratio of compressed to uncompressed size, if known.
    pub fn compression_ratio(&self) -> Option<f64> {
        match (self.compressed_size, self.uncompressed_size) {
            (Some(_), 0) => Some(1.0),
            (Some(packed), size) => Some(packed as f64 / size as f64),
            (None, _) => None,
        }
    }
}
