//! Entry handles and the borrowed entry view.

use crate::{Archive, EntryMetadata, EntryName, Error, PayloadState, Result};

/// A token naming one live record of an open archive.
///
/// Handles are cheap to copy and hold no borrow of the archive. Every
/// operation that takes a handle checks it first: once the entry table has
/// been structurally changed (an entry added or deleted, a rename that
/// displaced another entry, a save or a close) older handles are refused
/// with [`Error::StaleHandle`] instead of silently pointing at a different
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    pub(crate) position: usize,
    pub(crate) index: u64,
    pub(crate) generation: u64,
}

impl EntryHandle {
    /// Returns the index of the record this handle was issued for.
    pub fn index(&self) -> u64 {
        self.index
    }
}

/// A mutable view of one entry, borrowed from an [`Archive`].
///
/// Obtained from [`Archive::entry_mut`]. While the view is alive the archive
/// cannot be changed through any other path, so the view never goes stale
/// except through its own [`set_name`](Self::set_name), which refreshes it.
///
/// # Example
///
/// ```rust,no_run
/// use zipedit::Archive;
///
/// let mut archive = Archive::open_or_create("notes.zip")?;
/// archive.add_entry_with_data("todo.txt", "buy milk")?;
///
/// let mut entry = archive.entry_mut("todo.txt")?;
/// assert!(entry.matches(b"buy milk")?);
/// entry.set_data("buy oat milk")?;
/// entry.set_name("shopping.txt")?;
///
/// archive.save()?;
/// # Ok::<(), zipedit::Error>(())
/// ```
#[derive(Debug)]
pub struct EntryMut<'a> {
    archive: &'a mut Archive,
    handle: EntryHandle,
}

impl<'a> EntryMut<'a> {
    pub(crate) fn new(archive: &'a mut Archive, handle: EntryHandle) -> Self {
        Self { archive, handle }
    }

    /// Returns the handle of the viewed entry.
    pub fn handle(&self) -> EntryHandle {
        self.handle
    }

    /// Returns the entry name.
    pub fn name(&self) -> Result<String> {
        Ok(self.archive.metadata(self.handle)?.name)
    }

    /// Returns a copy of the entry data, extracting it if necessary.
    pub fn data(&mut self) -> Result<Vec<u8>> {
        self.archive.data(self.handle)
    }

    /// Returns the entry data collected into any byte container.
    pub fn data_as<C: FromIterator<u8>>(&mut self) -> Result<C> {
        Ok(self.data()?.into_iter().collect())
    }

    /// Returns the entry data as a UTF-8 string.
    pub fn data_to_string(&mut self) -> Result<String> {
        let data = self.data()?;
        String::from_utf8(data).map_err(|_| Error::NonUtf8Data {
            name: self.name().unwrap_or_default(),
        })
    }

    /// Compares the entry data with `other`.
    pub fn matches(&mut self, other: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.data()? == other.as_ref())
    }

    /// Reads the entry data into memory without marking it modified.
    pub fn load(&mut self) -> Result<()> {
        self.archive.load(self.handle)
    }

    /// Replaces the entry data.
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        self.archive.set_data(self.handle, data)
    }

    /// Renames the entry, replacing any other entry with that name.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.handle = self.archive.set_name(self.handle, name)?;
        Ok(())
    }

    /// Returns a snapshot of the entry's metadata.
    pub fn metadata(&self) -> Result<EntryMetadata> {
        self.archive.metadata(self.handle)
    }

    /// Returns the payload state.
    pub fn payload_state(&self) -> Result<PayloadState> {
        self.archive.payload_state(self.handle)
    }

    /// Copies the entry into a value detached from the archive.
    pub fn to_owned_entry(&mut self) -> Result<OwnedEntry> {
        let data = self.data()?;
        let metadata = self.metadata()?;
        Ok(OwnedEntry {
            name: EntryName::new(&metadata.name)?,
            data,
            metadata,
        })
    }
}

/// An entry copied out of an archive.
///
/// Holds the name, the data and a metadata snapshot. It can be inserted into
/// any open archive with [`Archive::insert_owned`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedEntry {
    name: EntryName,
    data: Vec<u8>,
    metadata: EntryMetadata,
}

impl OwnedEntry {
    /// Returns the entry name.
    pub fn name(&self) -> &EntryName {
        &self.name
    }

    /// Returns the entry data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the metadata captured when the entry was copied.
    pub fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    /// Splits the entry into its name, data and metadata.
    pub fn into_parts(self) -> (EntryName, Vec<u8>, EntryMetadata) {
        (self.name, self.data, self.metadata)
    }
}

impl PartialEq<[u8]> for OwnedEntry {
    fn eq(&self, other: &[u8]) -> bool {
        self.data == other
    }
}
