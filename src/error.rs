//! Error types for zip entry management.
//!
//! This module provides the [`Error`] enum which represents every failure
//! mode of an [`Archive`](crate::Archive) session, together with the
//! [`CodecErrorKind`] categories reported by the zip codec and a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Categories
//!
//! Errors fall into two broad groups:
//!
//! | Group | Variants | Typical Cause |
//! |-------|----------|---------------|
//! | Logic | [`NotOpen`][Error::NotOpen], [`EntryNotFound`][Error::EntryNotFound], [`InvalidEntryName`][Error::InvalidEntryName], [`StaleHandle`][Error::StaleHandle] | Caller misuse |
//! | Codec | [`Codec`][Error::Codec], [`CodecOther`][Error::CodecOther], [`SizeMismatch`][Error::SizeMismatch] | Damaged or unsupported archive data |
//! | I/O | [`Io`][Error::Io] | File system operations outside the codec |
//!
//! Logic errors are never worth retrying. Codec errors carry the category
//! reported by the codec plus a description of what was being attempted.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipedit::{Archive, CodecErrorKind, Error};
//!
//! fn open_or_report(path: &str) -> zipedit::Result<Archive> {
//!     let mut archive = Archive::new();
//!     match archive.open(path) {
//!         Ok(()) => Ok(archive),
//!         Err(Error::Codec { kind: CodecErrorKind::FileNotFound, .. }) => {
//!             eprintln!("no archive at {}", path);
//!             Archive::open_or_create(path)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::fmt;
use std::io;

/// Category of a failure reported by the zip codec.
///
/// Each category has a stable numeric code (see [`code`](Self::code) and
/// [`from_code`](Self::from_code)) so failures can be reported across FFI or
/// logging boundaries without losing their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecErrorKind {
    /// The codec reported a failure without a more specific category.
    Undefined,
    /// The archive holds more entries than the format allows.
    TooManyFiles,
    /// A single entry is too large for the format.
    FileTooLarge,
    /// An entry uses a compression method this build cannot handle.
    UnsupportedMethod,
    /// An entry is encrypted.
    UnsupportedEncryption,
    /// The archive uses a format feature that is not supported.
    UnsupportedFeature,
    /// The end of central directory record could not be located.
    FailedFindingCentralDir,
    /// The file is not a zip archive.
    NotAnArchive,
    /// A local or central header is invalid or corrupted.
    InvalidHeaderOrCorrupted,
    /// The archive spans multiple disks.
    UnsupportedMultidisk,
    /// Inflating an entry failed.
    DecompressionFailed,
    /// Deflating an entry failed.
    CompressionFailed,
    /// The inflated size differs from the size declared in the header.
    UnexpectedDecompressedSize,
    /// The CRC-32 of inflated data does not match the stored value.
    CrcCheckFailed,
    /// The central directory size is not supported.
    UnsupportedCdirSize,
    /// A memory allocation failed.
    AllocFailed,
    /// The archive file could not be opened.
    FileOpenFailed,
    /// The archive file could not be created.
    FileCreateFailed,
    /// Writing to the archive file failed.
    FileWriteFailed,
    /// Reading from the archive file failed.
    FileReadFailed,
    /// Closing the archive file failed.
    FileCloseFailed,
    /// Seeking within the archive file failed.
    FileSeekFailed,
    /// Querying the archive file's status failed.
    FileStatFailed,
    /// A parameter passed to the codec was invalid.
    InvalidParameter,
    /// An entry name was rejected by the codec.
    InvalidFilename,
    /// A caller-provided buffer was too small.
    BufferTooSmall,
    /// The codec hit an internal inconsistency.
    InternalError,
    /// The requested file does not exist.
    FileNotFound,
    /// The archive is too large for the format.
    ArchiveTooLarge,
    /// A finished archive failed validation.
    ValidationFailed,
    /// A write callback reported failure.
    WriteCallbackFailed,
}

impl CodecErrorKind {
    const ALL: [CodecErrorKind; 31] = [
        Self::Undefined,
        Self::TooManyFiles,
        Self::FileTooLarge,
        Self::UnsupportedMethod,
        Self::UnsupportedEncryption,
        Self::UnsupportedFeature,
        Self::FailedFindingCentralDir,
        Self::NotAnArchive,
        Self::InvalidHeaderOrCorrupted,
        Self::UnsupportedMultidisk,
        Self::DecompressionFailed,
        Self::CompressionFailed,
        Self::UnexpectedDecompressedSize,
        Self::CrcCheckFailed,
        Self::UnsupportedCdirSize,
        Self::AllocFailed,
        Self::FileOpenFailed,
        Self::FileCreateFailed,
        Self::FileWriteFailed,
        Self::FileReadFailed,
        Self::FileCloseFailed,
        Self::FileSeekFailed,
        Self::FileStatFailed,
        Self::InvalidParameter,
        Self::InvalidFilename,
        Self::BufferTooSmall,
        Self::InternalError,
        Self::FileNotFound,
        Self::ArchiveTooLarge,
        Self::ValidationFailed,
        Self::WriteCallbackFailed,
    ];

    /// Returns the stable numeric code of this category.
    ///
    /// Codes start at 1; 0 is reserved for "no error".
    pub fn code(self) -> u32 {
        // ALL is ordered by code
        Self::ALL
            .iter()
            .position(|k| *k == self)
            .map_or(0, |pos| pos as u32 + 1)
    }

    /// Looks up the category for a numeric code.
    ///
    /// Returns `None` for 0 ("no error") and for codes outside the known range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zipedit::CodecErrorKind;
    ///
    /// assert_eq!(CodecErrorKind::from_code(14), Some(CodecErrorKind::CrcCheckFailed));
    /// assert_eq!(CodecErrorKind::from_code(0), None);
    /// assert_eq!(CodecErrorKind::from_code(999), None);
    /// ```
    pub fn from_code(code: u32) -> Option<Self> {
        let pos = code.checked_sub(1)? as usize;
        Self::ALL.get(pos).copied()
    }

    /// Returns a short human-readable description of the category.
    pub fn description(self) -> &'static str {
        match self {
            Self::Undefined => "undefined error",
            Self::TooManyFiles => "too many files",
            Self::FileTooLarge => "file too large",
            Self::UnsupportedMethod => "unsupported method",
            Self::UnsupportedEncryption => "unsupported encryption",
            Self::UnsupportedFeature => "unsupported feature",
            Self::FailedFindingCentralDir => "failed finding central directory",
            Self::NotAnArchive => "not a ZIP archive",
            Self::InvalidHeaderOrCorrupted => "invalid header or archive is corrupted",
            Self::UnsupportedMultidisk => "unsupported multidisk archive",
            Self::DecompressionFailed => "decompression failed or archive is corrupted",
            Self::CompressionFailed => "compression failed",
            Self::UnexpectedDecompressedSize => "unexpected decompressed size",
            Self::CrcCheckFailed => "CRC-32 check failed",
            Self::UnsupportedCdirSize => "unsupported central directory size",
            Self::AllocFailed => "allocation failed",
            Self::FileOpenFailed => "file open failed",
            Self::FileCreateFailed => "file create failed",
            Self::FileWriteFailed => "file write failed",
            Self::FileReadFailed => "file read failed",
            Self::FileCloseFailed => "file close failed",
            Self::FileSeekFailed => "file seek failed",
            Self::FileStatFailed => "file stat failed",
            Self::InvalidParameter => "invalid parameter",
            Self::InvalidFilename => "invalid filename",
            Self::BufferTooSmall => "buffer too small",
            Self::InternalError => "internal error",
            Self::FileNotFound => "file not found",
            Self::ArchiveTooLarge => "archive is too large",
            Self::ValidationFailed => "validation failed",
            Self::WriteCallbackFailed => "write callback failed",
        }
    }

    /// Returns `true` if this category means the archive data is damaged.
    pub fn is_corruption(self) -> bool {
        matches!(
            self,
            Self::InvalidHeaderOrCorrupted
                | Self::CrcCheckFailed
                | Self::DecompressionFailed
                | Self::UnexpectedDecompressedSize
                | Self::FailedFindingCentralDir
                | Self::NotAnArchive
        )
    }
}

impl fmt::Display for CodecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The main error type for archive sessions.
///
/// This enum represents all errors that can occur while opening, querying,
/// mutating or saving an archive. Each variant includes enough context to
/// produce a useful message through its [`Display`](std::fmt::Display)
/// implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An operation that needs an open archive was called on a closed session.
    ///
    /// Call [`Archive::open`](crate::Archive::open) or
    /// [`Archive::create`](crate::Archive::create) first.
    #[error("{operation}: archive is invalid or not open")]
    NotOpen {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// No live entry carries the requested name.
    #[error("entry '{name}' does not exist")]
    EntryNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// An entry name was rejected.
    ///
    /// Entry names must be non-empty, must not contain NUL bytes and must fit
    /// in the 16-bit name length field of a zip header.
    #[error("invalid entry name '{name}': {reason}")]
    InvalidEntryName {
        /// The rejected name (possibly truncated for display).
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// An [`EntryHandle`](crate::EntryHandle) was used after the entry table
    /// was structurally changed by someone else.
    ///
    /// Handles are invalidated by adding or deleting entries, by renames that
    /// displace another entry, by `save` and by `close`. Look the entry up
    /// again by name to get a fresh handle.
    #[error("entry handle for index {index} is stale")]
    StaleHandle {
        /// The record index the handle was issued for.
        index: u64,
    },

    /// The codec reported a failure.
    #[error("{kind}: {context}")]
    Codec {
        /// Category reported by the codec.
        kind: CodecErrorKind,
        /// What was being attempted, including the codec's own message.
        context: String,
    },

    /// A numeric codec code that maps to no known category.
    ///
    /// The bundled codec always reports a category, so this only appears
    /// for codes passed to [`Error::from_code`], for example ones read back
    /// from logs or received from another process.
    #[error("codec error {code}: {context}")]
    CodecOther {
        /// The original numeric code.
        code: u32,
        /// What was being attempted.
        context: String,
    },

    /// Extracted data does not have the size declared in the entry's metadata.
    #[error("entry '{name}': expected {expected} bytes after decompression, got {actual}")]
    SizeMismatch {
        /// The entry name.
        name: String,
        /// Declared uncompressed size.
        expected: u64,
        /// Number of bytes actually produced.
        actual: u64,
    },

    /// An entry's data was requested as text but is not valid UTF-8.
    #[error("entry '{name}' does not contain valid UTF-8")]
    NonUtf8Data {
        /// The entry name.
        name: String,
    },

    /// An invalid compression level was provided.
    ///
    /// Compression levels must be in the range 0-9.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zipedit::{ArchiveOptions, Error};
    ///
    /// assert!(ArchiveOptions::new().compression_level(6).is_ok());
    /// let result = ArchiveOptions::new().compression_level(15);
    /// assert!(matches!(result, Err(Error::InvalidCompressionLevel { level: 15 })));
    /// ```
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },

    /// An I/O error occurred outside the codec, e.g. while creating or
    /// renaming the temporary file during save.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Creates a codec error from a numeric code.
    ///
    /// Known codes map onto [`Error::Codec`]; unknown codes (including 0) fall
    /// back to [`Error::CodecOther`] carrying the original code. Together with
    /// [`CodecErrorKind::code`] this turns a reported failure into a number and
    /// back again.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zipedit::{CodecErrorKind, Error};
    ///
    /// let err = Error::from_code(30, "checking temporary archive");
    /// assert_eq!(err.codec_kind(), Some(CodecErrorKind::ValidationFailed));
    ///
    /// let err = Error::from_code(4242, "something odd");
    /// assert!(matches!(err, Error::CodecOther { code: 4242, .. }));
    /// ```
    pub fn from_code(code: u32, context: impl Into<String>) -> Self {
        match CodecErrorKind::from_code(code) {
            Some(kind) => Error::Codec {
                kind,
                context: context.into(),
            },
            None => Error::CodecOther {
                code,
                context: context.into(),
            },
        }
    }

    /// Creates a codec error of the given category.
    pub fn codec(kind: CodecErrorKind, context: impl Into<String>) -> Self {
        Error::Codec {
            kind,
            context: context.into(),
        }
    }

    /// Creates a not-open error for the named operation.
    pub(crate) fn not_open(operation: &'static str) -> Self {
        Error::NotOpen { operation }
    }

    /// Creates an entry-not-found error.
    pub(crate) fn entry_not_found(name: impl Into<String>) -> Self {
        Error::EntryNotFound { name: name.into() }
    }

    /// Returns `true` for errors caused by the caller rather than by the data.
    ///
    /// Logic errors are never resolved by retrying the same call.
    pub fn is_logic_error(&self) -> bool {
        matches!(
            self,
            Error::NotOpen { .. }
                | Error::EntryNotFound { .. }
                | Error::InvalidEntryName { .. }
                | Error::StaleHandle { .. }
                | Error::InvalidCompressionLevel { .. }
        )
    }

    /// Returns `true` if the error originated in the codec.
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Error::Codec { .. } | Error::CodecOther { .. } | Error::SizeMismatch { .. }
        )
    }

    /// Returns `true` if this error indicates damaged archive data.
    pub fn is_corruption(&self) -> bool {
        match self {
            Error::Codec { kind, .. } => kind.is_corruption(),
            Error::SizeMismatch { .. } => true,
            _ => false,
        }
    }

    /// Returns the codec category, if this is a categorized codec error.
    ///
    /// A [`SizeMismatch`](Error::SizeMismatch) reports
    /// [`CodecErrorKind::UnexpectedDecompressedSize`].
    pub fn codec_kind(&self) -> Option<CodecErrorKind> {
        match self {
            Error::Codec { kind, .. } => Some(*kind),
            Error::SizeMismatch { .. } => Some(CodecErrorKind::UnexpectedDecompressedSize),
            _ => None,
        }
    }

    /// Returns the entry name associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::EntryNotFound { name } => Some(name),
            Error::InvalidEntryName { name, .. } => Some(name),
            Error::SizeMismatch { name, .. } => Some(name),
            Error::NonUtf8Data { name } => Some(name),
            _ => None,
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_covers_every_kind() {
        for (pos, kind) in CodecErrorKind::ALL.iter().enumerate() {
            let code = kind.code();
            assert_eq!(code, pos as u32 + 1);
            assert_eq!(CodecErrorKind::from_code(code), Some(*kind));
        }
    }

    #[test]
    fn test_from_code_out_of_range() {
        assert_eq!(CodecErrorKind::from_code(0), None);
        assert_eq!(CodecErrorKind::from_code(32), None);
        assert_eq!(CodecErrorKind::from_code(u32::MAX), None);
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(CodecErrorKind::Undefined.code(), 1);
        assert_eq!(CodecErrorKind::CrcCheckFailed.code(), 14);
        assert_eq!(CodecErrorKind::FileOpenFailed.code(), 17);
        assert_eq!(CodecErrorKind::ValidationFailed.code(), 30);
        assert_eq!(CodecErrorKind::WriteCallbackFailed.code(), 31);
    }

    #[test]
    fn test_error_from_code_unmapped() {
        let err = Error::from_code(77, "mystery");
        match &err {
            Error::CodecOther { code, context } => {
                assert_eq!(*code, 77);
                assert_eq!(context, "mystery");
            }
            e => panic!("expected CodecOther, got {:?}", e),
        }
        assert!(err.is_codec_error());
        assert_eq!(err.codec_kind(), None);
        assert_eq!(err.to_string(), "codec error 77: mystery");
    }

    #[test]
    fn test_codec_display() {
        let err = Error::codec(CodecErrorKind::FileOpenFailed, "opening 'a.zip'");
        assert_eq!(err.to_string(), "file open failed: opening 'a.zip'");
    }

    #[test]
    fn test_not_open_display() {
        let err = Error::not_open("add_entry");
        assert_eq!(err.to_string(), "add_entry: archive is invalid or not open");
        assert!(err.is_logic_error());
        assert!(!err.is_codec_error());
    }

    #[test]
    fn test_entry_not_found() {
        let err = Error::entry_not_found("missing.txt");
        assert_eq!(err.to_string(), "entry 'missing.txt' does not exist");
        assert_eq!(err.entry_name(), Some("missing.txt"));
    }

    #[test]
    fn test_size_mismatch_is_corruption() {
        let err = Error::SizeMismatch {
            name: "a.bin".into(),
            expected: 10,
            actual: 4,
        };
        assert!(err.is_corruption());
        assert!(err.is_codec_error());
        assert_eq!(
            err.codec_kind(),
            Some(CodecErrorKind::UnexpectedDecompressedSize)
        );
        assert_eq!(
            err.to_string(),
            "entry 'a.bin': expected 10 bytes after decompression, got 4"
        );
    }

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_logic_error());
    }

    #[test]
    fn test_corruption_kinds() {
        assert!(CodecErrorKind::CrcCheckFailed.is_corruption());
        assert!(CodecErrorKind::NotAnArchive.is_corruption());
        assert!(!CodecErrorKind::FileOpenFailed.is_corruption());
        assert!(!CodecErrorKind::UnsupportedEncryption.is_corruption());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
