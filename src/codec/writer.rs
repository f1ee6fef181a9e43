//! Writing side of the codec: add from memory, raw copy, finalize.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime};

use super::errors::{CodecOp, map_io_error, map_zip_error};
use super::reader::ZipReader;
use crate::options::CompressionLevel;
use crate::timestamp::Timestamp;
use crate::Result;

/// Sizes at or above this need zip64 extra fields.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// A zip archive under construction.
pub struct ZipWriter<W: Write + Seek> {
    inner: zip::ZipWriter<W>,
    entries: usize,
}

impl<W: Write + Seek> std::fmt::Debug for ZipWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipWriter")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl ZipWriter<File> {
    /// Creates (or truncates) the file at `path` and starts an archive in it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            map_io_error(CodecOp::Create, e, &format!("creating '{}'", path.display()))
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Seek> ZipWriter<W> {
    /// Starts an archive in `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            inner: zip::ZipWriter::new(sink),
            entries: 0,
        }
    }

    /// Returns the number of entries added so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Compresses `data` and appends it under `name`.
    pub fn add_bytes(
        &mut self,
        name: &str,
        data: &[u8],
        level: CompressionLevel,
        modified: Timestamp,
    ) -> Result<()> {
        let context = format!("adding '{}'", name);
        let options = file_options(level, modified, data.len() as u64);
        self.inner
            .start_file(name, options)
            .map_err(|e| map_zip_error(CodecOp::Write, e, &context))?;
        self.inner
            .write_all(data)
            .map_err(|e| map_io_error(CodecOp::Write, e, &context))?;
        self.entries += 1;
        log::trace!("compressed '{}' ({} bytes)", name, data.len());
        Ok(())
    }

    /// Copies the record at `position` of `reader` verbatim, storing it
    /// under `name`.
    ///
    /// The compressed bytes are not touched, so no decompression or
    /// recompression takes place. `name` may differ from the stored name.
    pub fn add_from_reader(
        &mut self,
        reader: &mut ZipReader,
        position: usize,
        name: &str,
    ) -> Result<()> {
        let context = format!(
            "copying record {} of '{}' as '{}'",
            position,
            reader.path().display(),
            name
        );
        let file = reader
            .archive
            .by_index_raw(position)
            .map_err(|e| map_zip_error(CodecOp::Copy, e, &context))?;
        self.inner
            .raw_copy_file_rename(file, name)
            .map_err(|e| map_zip_error(CodecOp::Copy, e, &context))?;
        self.entries += 1;
        log::trace!("copied record {} as '{}'", position, name);
        Ok(())
    }

    /// Writes the central directory and returns the sink.
    pub fn finish(self) -> Result<W> {
        self.inner
            .finish()
            .map_err(|e| map_zip_error(CodecOp::Finish, e, "finishing archive"))
    }
}

fn file_options(level: CompressionLevel, modified: Timestamp, size: u64) -> SimpleFileOptions {
    let options = SimpleFileOptions::default().large_file(size >= ZIP64_THRESHOLD);
    let options = match to_zip_datetime(modified) {
        Some(dt) => options.last_modified_time(dt),
        None => options,
    };
    match level {
        CompressionLevel::Stored => options.compression_method(CompressionMethod::Stored),
        CompressionLevel::Default => compressed(options, None),
        CompressionLevel::Level(level) => compressed(options, Some(level as i64)),
    }
}

#[cfg(feature = "deflate")]
fn compressed(options: SimpleFileOptions, level: Option<i64>) -> SimpleFileOptions {
    options
        .compression_method(CompressionMethod::Deflated)
        .compression_level(level)
}

#[cfg(not(feature = "deflate"))]
fn compressed(options: SimpleFileOptions, _level: Option<i64>) -> SimpleFileOptions {
    options.compression_method(CompressionMethod::Stored)
}

fn to_zip_datetime(ts: Timestamp) -> Option<DateTime> {
    let dos = ts.to_dos();
    DateTime::from_date_and_time(dos.year, dos.month, dos.day, dos.hour, dos.minute, dos.second)
        .ok()
}
