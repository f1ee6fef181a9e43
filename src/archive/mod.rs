//! The archive session.
//!
//! An [`Archive`] owns one open zip file and the in-memory table of its
//! entries. Changes made through it (adding, deleting, renaming and
//! rewriting entries) only touch the table until [`Archive::save`] writes a
//! complete replacement file and swaps it in.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──open()/create()──▶ open ──close()/drop──▶ closed
//!                              │ ▲
//!                              └─┘ save(): rewrite, swap, reopen
//! ```
//!
//! Every query or mutation on a closed session fails with
//! [`Error::NotOpen`].
//!
//! # Example
//!
//! ```rust,no_run
//! use zipedit::{Archive, EntryKinds};
//!
//! let mut archive = Archive::new();
//! archive.open("site.zip")?;
//!
//! archive.add_entry_with_data("css/site.css", "body { margin: 0 }")?;
//! archive.delete_entry("css/old.css")?;
//!
//! let index = archive.entry("index.html")?;
//! archive.set_name(index, "home.html")?;
//!
//! for name in archive.entry_names_in("css/", EntryKinds::Files)? {
//!     println!("{}", name);
//! }
//!
//! archive.save()?;
//! # Ok::<(), zipedit::Error>(())
//! ```

mod query;
mod save;

pub use save::SaveReport;

use std::path::{Path, PathBuf};

use crate::codec::{self, ZipReader, ZipWriter};
use crate::entry::{
    EntryHandle, EntryMetadata, EntryMut, EntryRecord, EntryTable, OwnedEntry, Payload,
    PayloadState,
};
use crate::{ArchiveOptions, EntryName, Error, Result};

/// State that exists only while an archive is open.
struct OpenState {
    path: PathBuf,
    reader: ZipReader,
    table: EntryTable,
}

/// A session over one zip archive.
///
/// `Archive` is move-only: it cannot be cloned, because it owns an open file
/// handle. Moving it out with [`take`](Self::take) leaves a closed session
/// behind. Dropping an archive closes it without saving.
pub struct Archive {
    state: Option<OpenState>,
    options: ArchiveOptions,
    /// Generation the next entry table starts at.
    generation: u64,
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Archive");
        match &self.state {
            Some(state) => s
                .field("path", &state.path)
                .field("entries", &state.table.len()),
            None => s.field("open", &false),
        };
        s.field("options", &self.options).finish()
    }
}

impl Drop for Archive {
    fn drop(&mut self) {
        self.close();
    }
}

impl Archive {
    /// Creates a closed session with default options.
    pub fn new() -> Self {
        Self::with_options(ArchiveOptions::default())
    }

    /// Creates a closed session with the given options.
    pub fn with_options(options: ArchiveOptions) -> Self {
        Self {
            state: None,
            options,
            generation: 0,
        }
    }

    /// Opens the archive at `path`, creating an empty one there if no file
    /// exists.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_or_create_with_options(path, ArchiveOptions::default())
    }

    /// Like [`open_or_create`](Self::open_or_create), with session options.
    pub fn open_or_create_with_options(
        path: impl AsRef<Path>,
        options: ArchiveOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut archive = Self::with_options(options);
        if path.exists() {
            archive.open(path)?;
        } else {
            archive.create(path)?;
        }
        Ok(archive)
    }

    /// Returns the session options.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Replaces the session options.
    ///
    /// Takes effect for the next save.
    pub fn set_options(&mut self, options: ArchiveOptions) {
        self.options = options;
    }

    /// Writes an empty archive to `path` and opens it.
    ///
    /// Any archive open in this session is closed first, discarding unsaved
    /// changes. An existing file at `path` is overwritten.
    pub fn create(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.close();

        ZipWriter::create(path)?.finish()?;
        codec::validate_file(path)?;
        log::debug!("created empty archive '{}'", path.display());

        self.open(path)
    }

    /// Opens the archive at `path` and loads its entry table.
    ///
    /// Any archive open in this session is closed first, discarding unsaved
    /// changes. Duplicate names in the central directory collapse to their
    /// last occurrence, and a directory entry is synthesized for every
    /// parent directory that is implied by an entry name but not stored.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.close();

        let mut reader = ZipReader::open(path)?;
        let central = reader.central_directory()?;
        let mut records = Vec::with_capacity(central.len());
        for stored in central {
            let mut record = EntryRecord::from_stat(stored.ordinal, reader.stat(stored.position)?)?;
            if stored.is_shadowed {
                record.source = None;
            }
            records.push(record);
        }
        let (table, summary) = EntryTable::from_records(records, self.generation)?;

        log::debug!(
            "opened '{}': {} entries ({} duplicates dropped, {} directories synthesized)",
            path.display(),
            summary.records,
            summary.duplicates,
            summary.synthesized
        );

        self.state = Some(OpenState {
            path: path.to_path_buf(),
            reader,
            table,
        });
        Ok(())
    }

    /// Closes the archive, discarding unsaved changes.
    ///
    /// Closing a closed session does nothing.
    pub fn close(&mut self) {
        if let Some(state) = self.state.take() {
            self.generation = state.table.generation().wrapping_add(1);
            log::debug!("closed '{}'", state.path.display());
        }
    }

    /// Returns true while an archive is open.
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the path of the open archive.
    pub fn path(&self) -> Option<&Path> {
        self.state.as_ref().map(|s| s.path.as_path())
    }

    /// Moves the session out, leaving this one closed.
    pub fn take(&mut self) -> Archive {
        std::mem::take(self)
    }

    fn state(&self, operation: &'static str) -> Result<&OpenState> {
        self.state.as_ref().ok_or_else(|| Error::not_open(operation))
    }

    fn state_mut(&mut self, operation: &'static str) -> Result<&mut OpenState> {
        self.state.as_mut().ok_or_else(|| Error::not_open(operation))
    }

    /// Adds an empty entry named `name`.
    ///
    /// An existing entry with the same name is replaced in place: it keeps
    /// its position but gets a fresh index and an empty payload. Missing
    /// parent directories are added after it. All previously issued handles
    /// become stale.
    pub fn add_entry(&mut self, name: &str) -> Result<EntryHandle> {
        let state = self.state_mut("add_entry")?;
        let name = EntryName::new(name)?;
        let handle = state.table.add(name);
        log::trace!("added entry with index {}", handle.index());
        Ok(handle)
    }

    /// Adds an entry named `name` holding `data`.
    pub fn add_entry_with_data(
        &mut self,
        name: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<EntryHandle> {
        let handle = self.add_entry(name)?;
        self.set_data(handle, data)?;
        Ok(handle)
    }

    /// Adds a copy of an entry taken from this or another archive.
    ///
    /// The data, timestamp and comment are taken over; the entry gets a
    /// fresh index.
    pub fn insert_owned(&mut self, entry: OwnedEntry) -> Result<EntryHandle> {
        let (name, data, metadata) = entry.into_parts();
        let state = self.state_mut("insert_owned")?;
        let handle = state.table.add(name);
        let record = state.table.resolve_mut(handle)?;
        if !record.is_directory {
            record.set_data(data);
        }
        record.timestamp = metadata.timestamp;
        record.comment = metadata.comment;
        Ok(handle)
    }

    /// Removes every entry named `name`.
    ///
    /// Removing a name that does not exist is not an error. Returns the
    /// number of entries removed.
    pub fn delete_entry(&mut self, name: &str) -> Result<usize> {
        let state = self.state_mut("delete_entry")?;
        let removed = state.table.remove(name);
        if removed > 0 {
            log::trace!("deleted '{}'", name);
        }
        Ok(removed)
    }

    /// Returns a handle to the entry named `name`.
    pub fn entry(&self, name: &str) -> Result<EntryHandle> {
        self.state("entry")?.table.find(name)
    }

    /// Returns a mutable view of the entry named `name`.
    pub fn entry_mut(&mut self, name: &str) -> Result<EntryMut<'_>> {
        let handle = self.entry(name)?;
        Ok(EntryMut::new(self, handle))
    }

    /// Returns a mutable view of the entry behind `handle`.
    pub fn view(&mut self, handle: EntryHandle) -> Result<EntryMut<'_>> {
        self.state("view")?.table.resolve(handle)?;
        Ok(EntryMut::new(self, handle))
    }

    /// Renames the entry behind `handle`.
    ///
    /// If another entry already carries `new_name` it is removed first, which
    /// makes all other handles stale. Index, timestamp and data of the renamed
    /// entry are unchanged. Returns a handle that is valid after the rename.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if `new_name` would turn a file
    /// into a directory or the other way round. Nothing changes in that case.
    pub fn set_name(&mut self, handle: EntryHandle, new_name: &str) -> Result<EntryHandle> {
        let state = self.state_mut("set_name")?;
        let new_name = EntryName::new(new_name)?;
        state.table.rename(handle, new_name)
    }

    /// Returns a copy of the entry's data.
    ///
    /// Data that is not in memory yet is extracted from the backing archive
    /// without being cached, so reading never changes the entry's state.
    /// Directories always yield an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the extracted data does not have
    /// the declared size, or a codec error if extraction fails.
    pub fn data(&mut self, handle: EntryHandle) -> Result<Vec<u8>> {
        let state = self.state_mut("data")?;
        let record = state.table.resolve(handle)?;
        if let Some(bytes) = record.payload.bytes() {
            return Ok(bytes.to_vec());
        }
        if record.is_directory {
            return Ok(Vec::new());
        }
        extract(&mut state.reader, record)
    }

    /// Reads the entry's data into memory.
    ///
    /// The entry becomes [`Loaded`](PayloadState::Loaded): later reads are
    /// served from memory, and save still copies the stored bytes verbatim.
    /// Entries that already hold data are left alone.
    pub fn load(&mut self, handle: EntryHandle) -> Result<()> {
        let state = self.state_mut("load")?;
        let record = state.table.resolve(handle)?;
        if record.payload != Payload::Unloaded {
            return Ok(());
        }
        let data = if record.is_directory {
            Vec::new()
        } else {
            extract(&mut state.reader, record)?
        };
        state.table.resolve_mut(handle)?.payload = Payload::Loaded(data);
        Ok(())
    }

    /// Replaces the entry's data.
    ///
    /// The entry becomes [`Modified`](PayloadState::Modified) and will be
    /// compressed from memory on save.
    pub fn set_data(&mut self, handle: EntryHandle, data: impl Into<Vec<u8>>) -> Result<()> {
        let state = self.state_mut("set_data")?;
        state.table.resolve_mut(handle)?.set_data(data.into());
        Ok(())
    }

    /// Returns a snapshot of the entry's metadata.
    pub fn metadata(&self, handle: EntryHandle) -> Result<EntryMetadata> {
        Ok(self.state("metadata")?.table.resolve(handle)?.metadata())
    }

    /// Returns where the entry's data currently lives.
    pub fn payload_state(&self, handle: EntryHandle) -> Result<PayloadState> {
        Ok(self
            .state("payload_state")?
            .table
            .resolve(handle)?
            .payload
            .state())
    }
}

fn extract(reader: &mut ZipReader, record: &EntryRecord) -> Result<Vec<u8>> {
    match record.source {
        Some(position) => reader
            .extract_to_vec(position, record.uncompressed_size)
            .map_err(|e| match e {
                Error::SizeMismatch {
                    expected, actual, ..
                } => Error::SizeMismatch {
                    name: record.name.to_string(),
                    expected,
                    actual,
                },
                other => other,
            }),
        // unbacked records always hold a payload
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_empty() -> (tempfile::TempDir, Archive) {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = Archive::new();
        archive.create(dir.path().join("test.zip")).unwrap();
        (dir, archive)
    }

    #[test]
    fn test_closed_session_rejects_operations() {
        let mut archive = Archive::new();
        assert!(!archive.is_open());
        assert!(matches!(
            archive.add_entry("a"),
            Err(Error::NotOpen { operation: "add_entry" })
        ));
        assert!(matches!(archive.entry("a"), Err(Error::NotOpen { .. })));
        assert!(matches!(archive.delete_entry("a"), Err(Error::NotOpen { .. })));
        assert!(archive.path().is_none());
    }

    #[test]
    fn test_create_opens_empty() {
        let (_dir, archive) = open_empty();
        assert!(archive.is_open());
        assert_eq!(archive.state("test").unwrap().table.len(), 0);
    }

    #[test]
    fn test_close_is_idempotent_and_stales_handles() {
        let (dir, mut archive) = open_empty();
        let handle = archive.add_entry("a.txt").unwrap();
        archive.close();
        archive.close();
        assert!(!archive.is_open());

        archive.open(dir.path().join("test.zip")).unwrap();
        archive.add_entry("a.txt").unwrap();
        assert!(matches!(
            archive.metadata(handle),
            Err(Error::StaleHandle { .. })
        ));
    }

    #[test]
    fn test_take_leaves_closed() {
        let (_dir, mut archive) = open_empty();
        let moved = archive.take();
        assert!(moved.is_open());
        assert!(!archive.is_open());
    }

    #[test]
    fn test_data_of_fresh_entry_is_empty() {
        let (_dir, mut archive) = open_empty();
        let handle = archive.add_entry("blank.txt").unwrap();
        assert!(archive.data(handle).unwrap().is_empty());
        assert_eq!(
            archive.payload_state(handle).unwrap(),
            PayloadState::Modified
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_dir, mut archive) = open_empty();
        assert!(matches!(
            archive.add_entry(""),
            Err(Error::InvalidEntryName { .. })
        ));
        let handle = archive.add_entry("x").unwrap();
        assert!(matches!(
            archive.set_name(handle, ""),
            Err(Error::InvalidEntryName { .. })
        ));
    }

    #[test]
    fn test_declared_size_mismatch() {
        let (_dir, mut archive) = open_empty();
        archive.add_entry_with_data("x.txt", "twelve bytes").unwrap();
        archive.save().unwrap();

        let handle = archive.entry("x.txt").unwrap();
        let state = archive.state_mut("test").unwrap();
        state.table.resolve_mut(handle).unwrap().uncompressed_size = 99;

        match archive.data(handle).unwrap_err() {
            Error::SizeMismatch {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "x.txt");
                assert_eq!(expected, 99);
                assert_eq!(actual, 12);
            }
            e => panic!("expected SizeMismatch, got {:?}", e),
        }
        assert!(archive.load(handle).is_err());
        assert_eq!(
            archive.payload_state(handle).unwrap(),
            PayloadState::Unloaded
        );
    }

    #[test]
    fn test_directory_data_skips_codec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dirs.zip");
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        writer
            .add_directory("d/", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.finish().unwrap();

        let mut archive = Archive::new();
        archive.open(&path).unwrap();
        let handle = archive.entry("d/").unwrap();
        assert_eq!(
            archive.payload_state(handle).unwrap(),
            PayloadState::Unloaded
        );
        assert!(archive.data(handle).unwrap().is_empty());
        archive.load(handle).unwrap();
        assert_eq!(archive.payload_state(handle).unwrap(), PayloadState::Loaded);
    }

    #[test]
    fn test_insert_owned_keeps_timestamp() {
        let (_dir, mut archive) = open_empty();
        archive.add_entry_with_data("src.txt", "payload").unwrap();
        let owned = archive.entry_mut("src.txt").unwrap().to_owned_entry().unwrap();
        assert_eq!(owned.data(), b"payload");

        archive.delete_entry("src.txt").unwrap();
        let handle = archive.insert_owned(owned.clone()).unwrap();
        let meta = archive.metadata(handle).unwrap();
        assert_eq!(meta.name, "src.txt");
        assert_eq!(meta.timestamp, owned.metadata().timestamp);
        assert!(meta.index > owned.metadata().index);
        assert_eq!(archive.data(handle).unwrap(), b"payload");
    }
}
