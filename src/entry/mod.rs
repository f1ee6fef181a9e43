//! Entry records, the entry table and handles into it.
//!
//! An open [`Archive`](crate::Archive) keeps one [`EntryTable`](table::EntryTable):
//! an ordered list of records, one per live name. Records loaded from disk
//! start out [`Unloaded`](PayloadState::Unloaded) and only pull their bytes
//! through the codec when read; records created in memory start out
//! [`Modified`](PayloadState::Modified) with an empty payload.

mod handle;
pub(crate) mod names;
mod record;
pub(crate) mod table;

pub use handle::{EntryHandle, EntryMut, OwnedEntry};
pub use record::{EntryMetadata, PayloadState};

pub(crate) use record::{EntryRecord, Payload};
pub(crate) use table::EntryTable;

/// Which kinds of entries a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryKinds {
    /// Regular files only.
    Files,
    /// Directory records only.
    Directories,
    /// Files and directories.
    #[default]
    All,
}

impl EntryKinds {
    /// Returns true if an entry with the given directory flag is selected.
    pub fn includes(self, is_directory: bool) -> bool {
        match self {
            EntryKinds::Files => !is_directory,
            EntryKinds::Directories => is_directory,
            EntryKinds::All => true,
        }
    }
}
