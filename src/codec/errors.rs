//! Translation of zip crate failures into [`CodecErrorKind`] categories.
//!
//! The zip crate reports failures as a handful of coarse variants plus a
//! message. The category is picked from the variant, the message and the
//! operation that was running, so that e.g. an I/O failure while opening
//! reads as "file open failed" and the same failure while finishing a writer
//! reads as "file write failed".

use std::io;

use zip::result::ZipError;

use crate::{CodecErrorKind, Error};

/// The codec primitive that was running when a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodecOp {
    Open,
    Create,
    Stat,
    Extract,
    Write,
    Copy,
    Finish,
    Validate,
}

impl CodecOp {
    /// Category for an I/O failure that carries no more specific signal.
    fn io_kind(self) -> CodecErrorKind {
        match self {
            CodecOp::Open => CodecErrorKind::FileOpenFailed,
            CodecOp::Create => CodecErrorKind::FileCreateFailed,
            CodecOp::Stat => CodecErrorKind::FileStatFailed,
            CodecOp::Extract => CodecErrorKind::FileReadFailed,
            CodecOp::Write | CodecOp::Copy | CodecOp::Finish => CodecErrorKind::FileWriteFailed,
            CodecOp::Validate => CodecErrorKind::ValidationFailed,
        }
    }
}

/// Maps a zip crate error to a crate error.
///
/// `context` describes what was being attempted, e.g. `opening 'a.zip'`.
pub(crate) fn map_zip_error(op: CodecOp, err: ZipError, context: &str) -> Error {
    let (kind, detail) = match err {
        ZipError::Io(e) => return map_io_error(op, e, context),
        ZipError::InvalidArchive(msg) => {
            let msg = msg.to_string();
            (invalid_archive_kind(op, &msg), msg)
        }
        ZipError::UnsupportedArchive(msg) => {
            let msg = msg.to_string();
            (unsupported_kind(&msg), msg)
        }
        ZipError::FileNotFound => (CodecErrorKind::FileNotFound, "file not found".to_string()),
        ZipError::InvalidPassword => (
            CodecErrorKind::UnsupportedEncryption,
            "invalid password".to_string(),
        ),
        other => (CodecErrorKind::Undefined, other.to_string()),
    };
    let kind = if op == CodecOp::Validate {
        CodecErrorKind::ValidationFailed
    } else {
        kind
    };
    Error::codec(kind, format!("{}: {}", context, detail))
}

/// Maps an I/O error raised inside a codec primitive to a crate error.
pub(crate) fn map_io_error(op: CodecOp, err: io::Error, context: &str) -> Error {
    let kind = if op == CodecOp::Validate {
        CodecErrorKind::ValidationFailed
    } else {
        io_kind(op, &err)
    };
    Error::codec(kind, format!("{}: {}", context, err))
}

fn io_kind(op: CodecOp, err: &io::Error) -> CodecErrorKind {
    let msg = err.to_string().to_ascii_lowercase();
    if msg.contains("checksum") || msg.contains("crc") {
        return CodecErrorKind::CrcCheckFailed;
    }
    match (op, err.kind()) {
        (CodecOp::Open, io::ErrorKind::NotFound) => CodecErrorKind::FileNotFound,
        (CodecOp::Extract, io::ErrorKind::InvalidData) => CodecErrorKind::DecompressionFailed,
        (CodecOp::Extract, io::ErrorKind::UnexpectedEof) => CodecErrorKind::DecompressionFailed,
        (CodecOp::Open, io::ErrorKind::UnexpectedEof) => CodecErrorKind::NotAnArchive,
        (_, io::ErrorKind::OutOfMemory) => CodecErrorKind::AllocFailed,
        _ => op.io_kind(),
    }
}

fn invalid_archive_kind(op: CodecOp, msg: &str) -> CodecErrorKind {
    let msg = msg.to_ascii_lowercase();
    if msg.contains("central directory") {
        if op == CodecOp::Open && msg.contains("end") {
            CodecErrorKind::FailedFindingCentralDir
        } else {
            CodecErrorKind::InvalidHeaderOrCorrupted
        }
    } else if msg.contains("multi") && msg.contains("disk") {
        CodecErrorKind::UnsupportedMultidisk
    } else if msg.contains("checksum") || msg.contains("crc") {
        CodecErrorKind::CrcCheckFailed
    } else if msg.contains("too many") {
        CodecErrorKind::TooManyFiles
    } else if msg.contains("duplicate") || msg.contains("filename") {
        CodecErrorKind::InvalidFilename
    } else if msg.contains("too large") || msg.contains("large file") {
        CodecErrorKind::FileTooLarge
    } else {
        CodecErrorKind::InvalidHeaderOrCorrupted
    }
}

fn unsupported_kind(msg: &str) -> CodecErrorKind {
    let msg = msg.to_ascii_lowercase();
    if msg.contains("password") || msg.contains("encrypt") {
        CodecErrorKind::UnsupportedEncryption
    } else if msg.contains("disk") {
        CodecErrorKind::UnsupportedMultidisk
    } else if msg.contains("method") || msg.contains("compression") {
        CodecErrorKind::UnsupportedMethod
    } else {
        CodecErrorKind::UnsupportedFeature
    }
}
