//! Atomic rewrite of the open archive.
//!
//! Saving never edits the archive in place. A complete new archive is
//! written to a temporary file in the target's directory, checked, and then
//! renamed over the target. The rename is the only step that changes the
//! target; a failure at any earlier point leaves it exactly as it was and
//! the temporary file is removed.

use std::path::Path;

use super::{Archive, OpenState};
use crate::codec::{self, ZipReader, ZipWriter};
use crate::entry::EntryTable;
use crate::options::{ArchiveOptions, TEMP_SUFFIX};
use crate::{Error, Result};

/// Summary of a completed save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Entries copied verbatim from the previous archive.
    pub entries_copied: usize,
    /// Entries compressed from memory.
    pub entries_compressed: usize,
    /// Directory entries, which are not written.
    pub directories_skipped: usize,
    /// Size of the new archive in bytes.
    pub archive_bytes: u64,
}

impl SaveReport {
    /// Returns the number of entries written to the new archive.
    pub fn entries_written(&self) -> usize {
        self.entries_copied + self.entries_compressed
    }
}

impl Archive {
    /// Writes the entry table back to the archive's own path.
    ///
    /// See [`save_as`](Self::save_as) for the protocol. All handles issued
    /// before the call are stale afterwards, since the table is reloaded
    /// from the new file.
    pub fn save(&mut self) -> Result<SaveReport> {
        let path = self.state("save")?.path.clone();
        self.save_to(&path)
    }

    /// Writes the entry table to `path` and continues the session there.
    ///
    /// 1. A temporary file is created next to `path`.
    /// 2. Entries are written in table order. Directories are skipped.
    ///    Entries whose data was not replaced are copied from the open
    ///    archive without recompression, under their current names; replaced
    ///    data is compressed at the configured level.
    /// 3. The new archive is finished and, unless disabled in the options,
    ///    validated by reading back every entry.
    /// 4. The open archive is released and the temporary file, given the
    ///    permissions of the file it replaces (or of the open archive when
    ///    `path` is new), is renamed over `path`.
    /// 5. `path` is opened, rebuilding the entry table from disk.
    ///
    /// If anything fails before the rename, neither `path` nor the session
    /// change. If the rename itself fails, the session stays open on its
    /// previous file with its unsaved changes intact.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<SaveReport> {
        self.state("save_as")?;
        self.save_to(path.as_ref())
    }

    fn save_to(&mut self, target: &Path) -> Result<SaveReport> {
        let options = self.options.clone();
        let state = self.state_mut("save")?;

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(options.temp_file_prefix())
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        log::debug!(
            "saving '{}' via '{}'",
            target.display(),
            temp.path().display()
        );

        let mut report = write_table(&state.table, &mut state.reader, temp.as_file_mut(), &options)?;
        temp.as_file().sync_all()?;
        report.archive_bytes = temp.as_file().metadata()?.len();

        // temp files are created private; carry over the mode being replaced
        if let Ok(meta) = std::fs::metadata(target).or_else(|_| std::fs::metadata(&state.path)) {
            temp.as_file().set_permissions(meta.permissions())?;
        }

        if options.validates_on_save() {
            codec::validate_file(temp.path())?;
        }

        // release the reader before replacing the file under it
        let Some(OpenState {
            path: old_path,
            reader,
            mut table,
        }) = self.state.take()
        else {
            return Err(Error::not_open("save"));
        };
        drop(reader);

        if let Err(e) = temp.persist(target) {
            log::warn!(
                "could not replace '{}': {}; keeping '{}' open",
                target.display(),
                e.error,
                old_path.display()
            );
            let reader = ZipReader::open(&old_path)?;
            table.invalidate();
            self.state = Some(OpenState {
                path: old_path,
                reader,
                table,
            });
            return Err(Error::Io(e.error));
        }

        self.generation = table.generation().wrapping_add(1);
        self.open(target)?;

        log::debug!(
            "saved '{}': {} copied, {} compressed, {} bytes",
            target.display(),
            report.entries_copied,
            report.entries_compressed,
            report.archive_bytes
        );
        Ok(report)
    }
}

/// Writes every file entry of `table` into a new archive in `sink`.
fn write_table(
    table: &EntryTable,
    reader: &mut ZipReader,
    sink: &mut std::fs::File,
    options: &ArchiveOptions,
) -> Result<SaveReport> {
    let mut report = SaveReport::default();
    let mut writer = ZipWriter::new(sink);

    for record in table.records() {
        if record.is_directory {
            report.directories_skipped += 1;
            continue;
        }
        let name = record.name.as_str();
        match (record.needs_raw_copy(), record.source) {
            (true, Some(position)) => {
                writer.add_from_reader(reader, position, name)?;
                report.entries_copied += 1;
            }
            _ => {
                let data = record.payload.bytes().unwrap_or_default();
                writer.add_bytes(name, data, options.level(), record.timestamp)?;
                report.entries_compressed += 1;
            }
        }
    }

    writer.finish()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntryKinds, PayloadState};

    #[test]
    fn test_save_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.zip");
        let mut archive = Archive::new();
        archive.create(&path).unwrap();
        archive.add_entry_with_data("a/one.txt", "1").unwrap();
        archive.add_entry_with_data("two.txt", "22").unwrap();

        let report = archive.save().unwrap();
        assert_eq!(report.entries_compressed, 2);
        assert_eq!(report.entries_copied, 0);
        assert_eq!(report.directories_skipped, 1);
        assert_eq!(report.entries_written(), 2);
        assert_eq!(report.archive_bytes, std::fs::metadata(&path).unwrap().len());

        // second save copies everything raw
        let handle = archive.entry("two.txt").unwrap();
        assert_eq!(archive.payload_state(handle).unwrap(), PayloadState::Unloaded);
        let report = archive.save().unwrap();
        assert_eq!(report.entries_copied, 2);
        assert_eq!(report.entries_compressed, 0);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.zip");
        let mut archive = Archive::new();
        archive.create(&path).unwrap();
        archive.add_entry_with_data("x", "y").unwrap();
        archive.save().unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(TEMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "leftover temp files: {:?}", leftovers);
    }

    #[test]
    fn test_save_as_moves_session() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.zip");
        let second = dir.path().join("second.zip");
        let mut archive = Archive::new();
        archive.create(&first).unwrap();
        archive.add_entry_with_data("k.txt", "v").unwrap();

        archive.save_as(&second).unwrap();
        assert_eq!(archive.path(), Some(second.as_path()));
        assert_eq!(archive.entry_count(EntryKinds::All).unwrap(), 1);

        // the original file was never rewritten
        let mut original = Archive::new();
        original.open(&first).unwrap();
        assert_eq!(original.entry_count(EntryKinds::All).unwrap(), 0);
    }

    #[test]
    fn test_save_closed_session() {
        let mut archive = Archive::new();
        assert!(matches!(
            archive.save(),
            Err(Error::NotOpen { operation: "save" })
        ));
    }
}
