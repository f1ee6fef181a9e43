//! # zipedit
//!
//! In-memory entry management for zip archives, with crash-safe saving.
//!
//! An [`Archive`] loads the central directory of a zip file into a table of
//! entries. Entries can be added, deleted, renamed and rewritten freely; none
//! of that touches the file until [`Archive::save`] writes a complete new
//! archive next to it and renames it into place. Entry data is only read when
//! asked for, and entries that were not changed are copied into the new
//! archive without being decompressed.
//!
//! ## Quick Start
//!
//! ### Editing an Archive
//!
//! ```rust,no_run
//! use zipedit::{Archive, EntryKinds, Result};
//!
//! fn main() -> Result<()> {
//!     // Open the file, or create an empty archive if there is none
//!     let mut archive = Archive::open_or_create("project.zip")?;
//!
//!     // Parent directories are added automatically
//!     archive.add_entry_with_data("src/main.rs", "fn main() {}")?;
//!     archive.delete_entry("Makefile")?;
//!
//!     for name in archive.entry_names(EntryKinds::Files)? {
//!         println!("{}", name);
//!     }
//!
//!     // Nothing is written until here
//!     let report = archive.save()?;
//!     println!(
//!         "{} entries copied, {} compressed",
//!         report.entries_copied, report.entries_compressed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Reading Entry Data
//!
//! ```rust,no_run
//! use zipedit::{Archive, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Archive::new();
//!     archive.open("data.zip")?;
//!
//!     let mut entry = archive.entry_mut("config.toml")?;
//!     let text = entry.data_to_string()?;
//!     entry.set_data(text.replace("debug = true", "debug = false"))?;
//!
//!     archive.save()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Entry Handles
//!
//! [`Archive::entry`] returns an [`EntryHandle`], a small copyable token.
//! Handles do not borrow the archive, but they are checked on every use: a
//! handle issued before a structural change (add, delete, a rename onto an
//! existing name, save, close) is refused with [`Error::StaleHandle`].
//!
//! ## Saving
//!
//! Saving writes to a temporary file in the same directory, validates it,
//! then renames it over the original. Until the rename, the original is
//! untouched; if any step fails the session keeps its unsaved changes. See
//! [`Archive::save_as`] for the full protocol and [`ArchiveOptions`] for the
//! knobs.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust,no_run
//! use zipedit::{Archive, CodecErrorKind, Error};
//!
//! fn inspect(path: &str) -> zipedit::Result<()> {
//!     let mut archive = Archive::new();
//!     match archive.open(path) {
//!         Ok(()) => Ok(()),
//!         Err(e) if e.is_corruption() => {
//!             eprintln!("damaged archive: {}", e);
//!             Err(e)
//!         }
//!         Err(Error::Codec { kind: CodecErrorKind::FileNotFound, .. }) => {
//!             eprintln!("no such archive");
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `debug` for open, save and
//! close, `trace` per entry, and `warn` for dropped duplicates and failed
//! renames. No logger is installed.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive;
pub mod codec;
pub mod entry;
pub mod entry_name;
pub mod error;
pub mod options;
pub mod timestamp;

pub use archive::{Archive, SaveReport};
pub use entry::{
    EntryHandle, EntryKinds, EntryMetadata, EntryMut, OwnedEntry, PayloadState,
};
pub use entry_name::EntryName;
pub use error::{CodecErrorKind, Error, Result};
pub use options::{ArchiveOptions, CompressionLevel};
pub use timestamp::{DosDateTime, Timestamp};
