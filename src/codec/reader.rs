//! Reading side of the codec: open, stat and extract by index.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use zip::{CompressionMethod, ZipArchive};

use super::central;
use super::errors::{CodecOp, map_io_error, map_zip_error};
use crate::timestamp::{DosDateTime, Timestamp};
use crate::{Error, Result};

/// Upper bound for buffer preallocation when extracting.
///
/// Declared sizes come from the archive and are not trusted until the data
/// has actually been inflated.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Central directory information for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStat {
    /// Position of the record in the central directory.
    pub position: usize,
    /// Stored name, verbatim.
    pub name: String,
    /// Whether the stored name denotes a directory.
    pub is_directory: bool,
    /// Whether the record's data is encrypted.
    pub is_encrypted: bool,
    /// Whether this build can extract the record.
    pub is_supported: bool,
    /// Size of the stored (compressed) data in bytes.
    pub compressed_size: u64,
    /// Size of the data after decompression in bytes.
    pub uncompressed_size: u64,
    /// Stored CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Stored modification time, if it is a valid MS-DOS date.
    pub modified: Option<Timestamp>,
    /// Per-entry comment.
    pub comment: String,
}

/// One stored central directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralRecord {
    /// Zero-based position in the stored central directory.
    pub ordinal: u64,
    /// Position of the record's name in the codec, see [`ZipReader::stat`].
    pub position: usize,
    /// Whether a later record with the same name hides this one. The data
    /// of a shadowed record cannot be reached through the codec.
    pub is_shadowed: bool,
}

/// An open zip archive that records can be read from by position.
pub struct ZipReader {
    path: PathBuf,
    pub(super) archive: ZipArchive<BufReader<File>>,
}

impl std::fmt::Debug for ZipReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipReader")
            .field("path", &self.path)
            .field("len", &self.archive.len())
            .finish_non_exhaustive()
    }
}

impl ZipReader {
    /// Opens the archive at `path` and parses its central directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let context = format!("opening '{}'", path.display());
        let file = File::open(path).map_err(|e| map_io_error(CodecOp::Open, e, &context))?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| map_zip_error(CodecOp::Open, e, &context))?;
        log::trace!(
            "opened '{}' with {} records",
            path.display(),
            archive.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Returns the path the reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records in the central directory.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns true if the archive has no records.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Lists every stored central directory record, duplicates included.
    ///
    /// The codec exposes one position per distinct name, carrying the data
    /// of the last record with that name. This maps each stored record onto
    /// those positions and marks all but the last record of a name as
    /// shadowed. If the central directory cannot be walked independently,
    /// the codec's positions are returned as they are.
    pub fn central_directory(&mut self) -> Result<Vec<CentralRecord>> {
        let context = format!("reading central directory of '{}'", self.path.display());
        let len = self.archive.len();
        let mut positions: HashMap<Vec<u8>, usize> = HashMap::with_capacity(len);
        for position in 0..len {
            let file = self
                .archive
                .by_index_raw(position)
                .map_err(|e| map_zip_error(CodecOp::Stat, e, &context))?;
            positions.insert(file.name_raw().to_vec(), position);
        }

        let as_exposed = || -> Vec<CentralRecord> {
            (0..len)
                .map(|position| CentralRecord {
                    ordinal: position as u64,
                    position,
                    is_shadowed: false,
                })
                .collect()
        };

        let names = match central::raw_names(&self.path) {
            Ok(Some(names)) => names,
            Ok(None) => {
                log::debug!("{}: layout not walkable, using codec order", context);
                return Ok(as_exposed());
            }
            Err(e) => return Err(map_io_error(CodecOp::Stat, e, &context)),
        };

        let mut last: HashMap<&[u8], usize> = HashMap::with_capacity(names.len());
        for (ordinal, name) in names.iter().enumerate() {
            last.insert(name.as_slice(), ordinal);
        }
        if last.len() != positions.len() || !last.keys().all(|n| positions.contains_key(*n)) {
            log::debug!("{}: names disagree with the codec, using codec order", context);
            return Ok(as_exposed());
        }

        let mut records = Vec::with_capacity(names.len());
        for (ordinal, name) in names.iter().enumerate() {
            let Some(&position) = positions.get(name.as_slice()) else {
                return Ok(as_exposed());
            };
            records.push(CentralRecord {
                ordinal: ordinal as u64,
                position,
                is_shadowed: last.get(name.as_slice()) != Some(&ordinal),
            });
        }
        Ok(records)
    }

    /// Reads the central directory information of the record at `position`.
    pub fn stat(&mut self, position: usize) -> Result<EntryStat> {
        let context = format!("reading record {} of '{}'", position, self.path.display());
        let file = self
            .archive
            .by_index_raw(position)
            .map_err(|e| map_zip_error(CodecOp::Stat, e, &context))?;

        let is_encrypted = file.encrypted();
        let modified = file.last_modified().and_then(|dt| {
            Timestamp::from_dos(DosDateTime {
                year: dt.year(),
                month: dt.month(),
                day: dt.day(),
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
            })
        });

        Ok(EntryStat {
            position,
            name: file.name().to_string(),
            is_directory: file.is_dir(),
            is_encrypted,
            is_supported: !is_encrypted && method_supported(file.compression()),
            compressed_size: file.compressed_size(),
            uncompressed_size: file.size(),
            crc32: file.crc32(),
            modified,
            comment: file.comment().to_string(),
        })
    }

    /// Inflates the record at `position` into memory.
    ///
    /// The number of bytes produced must equal `expected_len`; otherwise
    /// [`Error::SizeMismatch`] is returned. The codec checks the CRC-32
    /// while reading.
    pub fn extract_to_vec(&mut self, position: usize, expected_len: u64) -> Result<Vec<u8>> {
        let context = format!(
            "extracting record {} of '{}'",
            position,
            self.path.display()
        );
        let mut file = self
            .archive
            .by_index(position)
            .map_err(|e| map_zip_error(CodecOp::Extract, e, &context))?;
        let name = file.name().to_string();

        let mut data = Vec::with_capacity(expected_len.min(MAX_PREALLOCATION) as usize);
        file.read_to_end(&mut data)
            .map_err(|e| map_io_error(CodecOp::Extract, e, &context))?;

        if data.len() as u64 != expected_len {
            return Err(Error::SizeMismatch {
                name,
                expected: expected_len,
                actual: data.len() as u64,
            });
        }
        log::trace!("extracted '{}' ({} bytes)", name, data.len());
        Ok(data)
    }
}

/// Returns true if this build can decompress entries stored with `method`.
pub(crate) fn method_supported(method: CompressionMethod) -> bool {
    #[cfg(feature = "deflate")]
    if method == CompressionMethod::Deflated {
        return true;
    }
    method == CompressionMethod::Stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecErrorKind;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_fixture(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_stat_and_extract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.zip");
        write_fixture(&path, &[("docs/", b""), ("docs/a.txt", b"alpha")]);

        let mut reader = ZipReader::open(&path).unwrap();
        assert_eq!(reader.len(), 2);

        let dir_stat = reader.stat(0).unwrap();
        assert_eq!(dir_stat.name, "docs/");
        assert!(dir_stat.is_directory);

        let file_stat = reader.stat(1).unwrap();
        assert_eq!(file_stat.name, "docs/a.txt");
        assert_eq!(file_stat.uncompressed_size, 5);
        assert_eq!(file_stat.crc32, crc32fast::hash(b"alpha"));
        assert!(file_stat.is_supported);
        assert!(!file_stat.is_encrypted);
        assert!(file_stat.modified.is_some());

        assert_eq!(reader.extract_to_vec(1, 5).unwrap(), b"alpha");
    }

    #[test]
    fn test_extract_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.zip");
        write_fixture(&path, &[("a.txt", b"alpha")]);

        let mut reader = ZipReader::open(&path).unwrap();
        let err = reader.extract_to_vec(0, 9).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                expected: 9,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ZipReader::open(dir.path().join("absent.zip")).unwrap_err();
        assert_eq!(err.codec_kind(), Some(CodecErrorKind::FileNotFound));
    }

    #[test]
    fn test_open_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.zip");
        std::fs::write(&path, vec![0x42u8; 512]).unwrap();
        let err = ZipReader::open(&path).unwrap_err();
        assert!(err.is_codec_error());
    }

    #[test]
    fn test_central_directory_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.zip");
        write_fixture(&path, &[("a.txt", b"1"), ("b.txt", b"2")]);

        let mut reader = ZipReader::open(&path).unwrap();
        let records = reader.central_directory().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_shadowed));
        assert_eq!(records[1].ordinal, 1);
        assert_eq!(records[1].position, 1);
    }

    #[test]
    fn test_central_directory_marks_shadowed_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dups.zip");
        write_fixture(&path, &[("a.txt", b"FIRST"), ("m.txt", b"middle"), ("b.txt", b"LAST!")]);
        // rename the third record to collide with the first
        let mut bytes = std::fs::read(&path).unwrap();
        let mut pos = 0;
        while let Some(found) = bytes[pos..].windows(5).position(|w| w == b"b.txt") {
            bytes[pos + found..pos + found + 5].copy_from_slice(b"a.txt");
            pos += found + 5;
        }
        std::fs::write(&path, bytes).unwrap();

        let mut reader = ZipReader::open(&path).unwrap();
        assert_eq!(reader.len(), 2);
        let records = reader.central_directory().unwrap();
        assert_eq!(records.len(), 3);

        let a = reader.stat(records[0].position).unwrap();
        assert_eq!(a.name, "a.txt");
        assert!(records[0].is_shadowed);
        assert!(!records[1].is_shadowed);
        assert!(!records[2].is_shadowed);
        assert_eq!(records[2].position, records[0].position);
        assert_eq!(
            reader.extract_to_vec(records[2].position, 5).unwrap(),
            b"LAST!"
        );
    }

    #[test]
    fn test_stat_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.zip");
        write_fixture(&path, &[("a.txt", b"alpha")]);
        let mut reader = ZipReader::open(&path).unwrap();
        assert!(reader.stat(5).is_err());
    }
}
