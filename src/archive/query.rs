//! Read-only queries over the entry table.

use super::Archive;
use crate::entry::{EntryKinds, EntryMetadata};
use crate::Result;

impl Archive {
    /// Returns the names of all entries of the given kinds, in table order.
    pub fn entry_names(&self, kinds: EntryKinds) -> Result<Vec<String>> {
        self.entry_names_in("", kinds)
    }

    /// Returns the names of entries of the given kinds below `prefix`.
    ///
    /// `prefix` is matched as a plain string prefix and the entry named
    /// exactly `prefix` is not included. An empty prefix selects all
    /// entries.
    ///
    /// ```rust,no_run
    /// use zipedit::{Archive, EntryKinds};
    ///
    /// let archive = Archive::open_or_create("photos.zip")?;
    /// let albums = archive.entry_names_in("2024/", EntryKinds::Directories)?;
    /// # Ok::<(), zipedit::Error>(())
    /// ```
    pub fn entry_names_in(&self, prefix: &str, kinds: EntryKinds) -> Result<Vec<String>> {
        Ok(self
            .state("entry_names")?
            .table
            .select(prefix, kinds)
            .map(|r| r.name.to_string())
            .collect())
    }

    /// Returns the number of entries of the given kinds.
    pub fn entry_count(&self, kinds: EntryKinds) -> Result<usize> {
        self.entry_count_in("", kinds)
    }

    /// Returns the number of entries of the given kinds below `prefix`.
    pub fn entry_count_in(&self, prefix: &str, kinds: EntryKinds) -> Result<usize> {
        Ok(self
            .state("entry_count")?
            .table
            .select(prefix, kinds)
            .count())
    }

    /// Returns true if an entry named exactly `name` exists.
    pub fn has_entry(&self, name: &str) -> Result<bool> {
        Ok(self.state("has_entry")?.table.contains(name))
    }

    /// Returns metadata snapshots of all entries of the given kinds.
    pub fn entries_metadata(&self, kinds: EntryKinds) -> Result<Vec<EntryMetadata>> {
        self.entries_metadata_in("", kinds)
    }

    /// Returns metadata snapshots of entries of the given kinds below `prefix`.
    pub fn entries_metadata_in(
        &self,
        prefix: &str,
        kinds: EntryKinds,
    ) -> Result<Vec<EntryMetadata>> {
        Ok(self
            .state("entries_metadata")?
            .table
            .select(prefix, kinds)
            .map(|r| r.metadata())
            .collect())
    }

    /// Returns the highest record index issued so far, if any.
    pub fn max_index(&self) -> Result<Option<u64>> {
        Ok(self.state("max_index")?.table.max_index())
    }
}
