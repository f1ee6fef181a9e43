//! The ordered table of live entries.

use super::handle::EntryHandle;
use super::names;
use super::record::EntryRecord;
use super::EntryKinds;
use crate::{EntryName, Error, Result};

/// What happened while building a table from an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LoadSummary {
    pub(crate) records: usize,
    pub(crate) duplicates: usize,
    pub(crate) synthesized: usize,
}

/// Ordered entry records plus the bookkeeping that keeps handles honest.
///
/// `generation` changes on every structural mutation; handles carry the
/// generation they were issued in and are refused once it moves on.
#[derive(Debug)]
pub(crate) struct EntryTable {
    records: Vec<EntryRecord>,
    generation: u64,
    max_index: Option<u64>,
}

impl EntryTable {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            records: Vec::new(),
            generation,
            max_index: None,
        }
    }

    /// Builds a table from records in central directory order.
    ///
    /// Duplicate names collapse to their last occurrence and directory
    /// records are synthesized for every implied parent that is missing.
    pub(crate) fn from_records(
        records: Vec<EntryRecord>,
        generation: u64,
    ) -> Result<(Self, LoadSummary)> {
        let max_index = records.iter().map(|r| r.index).max();
        let (records, duplicates) = names::dedup_last_wins(records);
        let missing = names::missing_directories(&records)?;

        let mut table = Self::new(generation);
        table.records = records;
        table.max_index = max_index;
        let synthesized = missing.len();
        for name in missing {
            let index = table.mint_index();
            table.records.push(EntryRecord::fresh(index, name));
        }

        let summary = LoadSummary {
            records: table.records.len(),
            duplicates,
            synthesized,
        };
        Ok((table, summary))
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidates every outstanding handle.
    pub(crate) fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Returns the highest index any record of this table has carried.
    pub(crate) fn max_index(&self) -> Option<u64> {
        self.max_index
    }

    fn mint_index(&mut self) -> u64 {
        let index = self.max_index.map_or(0, |max| max + 1);
        self.max_index = Some(index);
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn records(&self) -> &[EntryRecord] {
        &self.records
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name == name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn handle_at(&self, position: usize) -> EntryHandle {
        EntryHandle {
            position,
            index: self.records[position].index,
            generation: self.generation,
        }
    }

    /// Returns a handle to the record named `name`.
    pub(crate) fn find(&self, name: &str) -> Result<EntryHandle> {
        self.position(name)
            .map(|pos| self.handle_at(pos))
            .ok_or_else(|| Error::entry_not_found(name))
    }

    fn check(&self, handle: EntryHandle) -> Result<usize> {
        let live = handle.generation == self.generation
            && self
                .records
                .get(handle.position)
                .is_some_and(|r| r.index == handle.index);
        if live {
            Ok(handle.position)
        } else {
            Err(Error::StaleHandle {
                index: handle.index,
            })
        }
    }

    pub(crate) fn resolve(&self, handle: EntryHandle) -> Result<&EntryRecord> {
        let pos = self.check(handle)?;
        Ok(&self.records[pos])
    }

    pub(crate) fn resolve_mut(&mut self, handle: EntryHandle) -> Result<&mut EntryRecord> {
        let pos = self.check(handle)?;
        Ok(&mut self.records[pos])
    }

    /// Adds a blank record named `name`, replacing any record of that name
    /// in place, then appends records for missing parent directories.
    pub(crate) fn add(&mut self, name: EntryName) -> EntryHandle {
        let index = self.mint_index();
        let position = match self.position(name.as_str()) {
            Some(pos) => {
                self.records[pos] = EntryRecord::fresh(index, name);
                pos
            }
            None => {
                self.records.push(EntryRecord::fresh(index, name));
                self.records.len() - 1
            }
        };

        let parents: Vec<EntryName> = self.records[position]
            .name
            .ancestors()
            .filter(|prefix| !self.contains(prefix))
            .filter_map(|prefix| EntryName::new(prefix).ok())
            .collect();
        for parent in parents {
            let index = self.mint_index();
            self.records.push(EntryRecord::fresh(index, parent));
        }

        self.invalidate();
        self.handle_at(position)
    }

    /// Removes every record named `name`, returning how many were removed.
    pub(crate) fn remove(&mut self, name: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.name != name);
        let removed = before - self.records.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Renames the record behind `handle`.
    ///
    /// Another record already carrying `new_name` is removed first; only
    /// then do outstanding handles become stale. Returns a handle that is
    /// valid after the rename.
    pub(crate) fn rename(&mut self, handle: EntryHandle, new_name: EntryName) -> Result<EntryHandle> {
        let mut pos = self.check(handle)?;
        if self.records[pos].name == new_name {
            return Ok(handle);
        }
        if new_name.is_directory() != self.records[pos].is_directory {
            let reason = if self.records[pos].is_directory {
                "a directory cannot be renamed to a file name"
            } else {
                "a file cannot be renamed to a directory name"
            };
            return Err(Error::InvalidEntryName {
                name: new_name.as_str().to_string(),
                reason: reason.to_string(),
            });
        }

        if let Some(other) = self.position(new_name.as_str()) {
            self.records.remove(other);
            if other < pos {
                pos -= 1;
            }
            self.invalidate();
        }

        self.records[pos].name = new_name;
        Ok(self.handle_at(pos))
    }

    /// Iterates records of the requested kinds below `prefix`.
    ///
    /// An empty prefix selects every record.
    pub(crate) fn select<'a>(
        &'a self,
        prefix: &'a str,
        kinds: EntryKinds,
    ) -> impl Iterator<Item = &'a EntryRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| kinds.includes(r.is_directory) && r.name.is_below(prefix))
    }
}
