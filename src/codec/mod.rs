//! Zip codec primitives.
//!
//! Everything that touches archive bytes goes through this module, which
//! wraps the [`zip`] crate behind a small set of operations:
//!
//! - [`ZipReader::open`], [`ZipReader::len`],
//!   [`ZipReader::central_directory`], [`ZipReader::stat`] and
//!   [`ZipReader::extract_to_vec`] on the reading side
//! - [`ZipWriter::create`], [`ZipWriter::add_bytes`],
//!   [`ZipWriter::add_from_reader`] and [`ZipWriter::finish`] on the
//!   writing side
//! - [`validate_file`] to check a finished archive end to end
//!
//! Failures are reported as [`Error::Codec`](crate::Error::Codec) with a
//! [`CodecErrorKind`](crate::CodecErrorKind) chosen from the zip crate's
//! error and the operation that failed.

mod central;
mod errors;
mod reader;
mod writer;

pub use reader::{CentralRecord, EntryStat, ZipReader};
pub use writer::ZipWriter;

use std::io;
use std::path::Path;

use errors::{CodecOp, map_io_error};

/// Reads every record of the archive at `path`, checking sizes and CRCs.
///
/// Records this build cannot decode are only checked for a readable header.
/// Returns the number of records checked. Any failure is reported as
/// [`CodecErrorKind::ValidationFailed`](crate::CodecErrorKind::ValidationFailed).
pub fn validate_file(path: impl AsRef<Path>) -> crate::Result<usize> {
    let path = path.as_ref();
    let context = format!("validating '{}'", path.display());
    let mut reader = ZipReader::open(path).map_err(|e| validation_error(&context, e))?;

    for position in 0..reader.len() {
        let stat = reader
            .stat(position)
            .map_err(|e| validation_error(&context, e))?;
        // encrypted or foreign-method records can only be checked for a
        // readable header
        if stat.is_directory || !stat.is_supported {
            continue;
        }
        let data = reader
            .extract_to_vec(position, stat.uncompressed_size)
            .map_err(|e| validation_error(&context, e))?;
        if crc32fast::hash(&data) != stat.crc32 {
            return Err(map_io_error(
                CodecOp::Validate,
                io::Error::new(io::ErrorKind::InvalidData, "CRC-32 mismatch"),
                &format!("{}: record '{}'", context, stat.name),
            ));
        }
    }

    log::debug!("validated '{}' ({} records)", path.display(), reader.len());
    Ok(reader.len())
}

fn validation_error(context: &str, err: crate::Error) -> crate::Error {
    crate::Error::codec(
        crate::CodecErrorKind::ValidationFailed,
        format!("{}: {}", context, err),
    )
}
