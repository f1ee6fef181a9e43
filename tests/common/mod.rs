//! Shared test utilities for integration tests.
//!
//! Fixture archives are written with the `zip` crate directly, so tests can
//! start from files that this crate did not produce.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zipedit::{Archive, EntryKinds};

/// Creates a scratch directory and the path of an archive inside it.
pub fn scratch(file_name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(file_name);
    (dir, path)
}

/// Writes a zip file at `path` containing `entries`, uncompressed.
///
/// Names ending in `/` become directory records.
pub fn write_fixture(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).expect("create fixture"));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(data).expect("write data");
        }
    }
    writer.finish().expect("finish fixture");
}

/// Creates a fresh empty archive at `path` and returns the open session.
pub fn create_archive(path: &Path) -> Archive {
    let mut archive = Archive::new();
    archive.create(path).expect("create archive");
    archive
}

/// Opens the archive at `path` in a new session.
pub fn reopen(path: &Path) -> Archive {
    let mut archive = Archive::new();
    archive.open(path).expect("open archive");
    archive
}

/// Reads the data of `name` from an open archive.
pub fn read_entry(archive: &mut Archive, name: &str) -> Vec<u8> {
    let handle = archive.entry(name).expect("entry exists");
    archive.data(handle).expect("read entry data")
}

/// Returns all entry names, files and directories, in table order.
pub fn all_names(archive: &Archive) -> Vec<String> {
    archive.entry_names(EntryKinds::All).expect("list names")
}

/// Returns `len` bytes of reproducible pseudo-random data.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.r#gen::<u8>()).collect()
}

/// Returns highly compressible data of length `len`.
pub fn compressible_data(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Flips one byte of the first occurrence of `needle` in the file at `path`.
pub fn corrupt_first_occurrence(path: &Path, needle: &[u8]) {
    let mut bytes = std::fs::read(path).expect("read archive");
    let offset = bytes
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("needle present in archive");
    bytes[offset] ^= 0xFF;
    std::fs::write(path, bytes).expect("write corrupted archive");
}

/// Returns names of temporary save files left in `dir`.
pub fn leftover_temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".tmp"))
        .collect()
}

/// Replaces every occurrence of `from` in the file at `path` with `to`.
///
/// Both must have the same length so no offsets inside the archive move.
pub fn replace_all(path: &Path, from: &[u8], to: &[u8]) {
    assert_eq!(from.len(), to.len(), "replacement must keep the length");
    let mut bytes = std::fs::read(path).expect("read archive");
    let mut found = 0;
    let mut i = 0;
    while i + from.len() <= bytes.len() {
        if &bytes[i..i + from.len()] == from {
            bytes[i..i + from.len()].copy_from_slice(to);
            found += 1;
            i += from.len();
        } else {
            i += 1;
        }
    }
    assert!(found > 0, "pattern present in archive");
    std::fs::write(path, bytes).expect("write patched archive");
}
