//! Session configuration.
//!
//! [`ArchiveOptions`] controls how an [`Archive`](crate::Archive) writes
//! entries back to disk. The defaults reproduce the codec's own defaults:
//! deflate at the default level, validation of every rewritten archive, and
//! hidden `.~$*.tmp` temporary files next to the target.
//!
//! # Example
//!
//! ```rust
//! use zipedit::{ArchiveOptions, CompressionLevel};
//!
//! let options = ArchiveOptions::new()
//!     .compression_level(9)?
//!     .temp_prefix(".zipedit-");
//! assert_eq!(options.level(), CompressionLevel::Level(9));
//! # Ok::<(), zipedit::Error>(())
//! ```

use crate::{Error, Result};

/// Default prefix for temporary files created during save.
pub const DEFAULT_TEMP_PREFIX: &str = ".~$";

/// Suffix for temporary files created during save.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Compression level used for entries whose data was set in memory.
///
/// Entries that are copied unchanged from the source archive keep their
/// original compressed bytes and are not affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// The codec's default trade-off between speed and size.
    #[default]
    Default,
    /// Store without compression.
    Stored,
    /// An explicit deflate level, 1-9.
    Level(u32),
}

impl CompressionLevel {
    /// Converts a numeric level (0-9) into a `CompressionLevel`.
    ///
    /// Level 0 means [`Stored`](Self::Stored).
    pub fn from_level(level: u32) -> Result<Self> {
        match level {
            0 => Ok(Self::Stored),
            1..=9 => Ok(Self::Level(level)),
            _ => Err(Error::InvalidCompressionLevel { level }),
        }
    }
}

/// Options for an archive session.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    level: CompressionLevel,
    validate_on_save: bool,
    temp_prefix: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            level: CompressionLevel::Default,
            validate_on_save: true,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

impl ArchiveOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level (0-9) for modified entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if level is greater than 9.
    pub fn compression_level(mut self, level: u32) -> Result<Self> {
        self.level = CompressionLevel::from_level(level)?;
        Ok(self)
    }

    /// Sets the compression level, clamping values above 9.
    pub fn compression_level_clamped(mut self, level: u32) -> Self {
        self.level = match level {
            0 => CompressionLevel::Stored,
            l => CompressionLevel::Level(l.min(9)),
        };
        self
    }

    /// Sets the compression level directly.
    pub fn level_with(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Controls whether the rewritten archive is validated before it
    /// replaces the original. Enabled by default.
    ///
    /// Turning validation off skips one full read of the new archive. The
    /// replacement is still atomic, but a codec bug would go unnoticed.
    pub fn validate_on_save(mut self, validate: bool) -> Self {
        self.validate_on_save = validate;
        self
    }

    /// Sets the file name prefix for temporary files created during save.
    pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Returns the configured compression level.
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Returns whether saves are validated.
    pub fn validates_on_save(&self) -> bool {
        self.validate_on_save
    }

    /// Returns the temporary file prefix.
    pub fn temp_file_prefix(&self) -> &str {
        &self.temp_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ArchiveOptions::default();
        assert_eq!(options.level(), CompressionLevel::Default);
        assert!(options.validates_on_save());
        assert_eq!(options.temp_file_prefix(), ".~$");
    }

    #[test]
    fn test_compression_level_valid_range() {
        for level in 1..=9 {
            let options = ArchiveOptions::new().compression_level(level).unwrap();
            assert_eq!(options.level(), CompressionLevel::Level(level));
        }
        let stored = ArchiveOptions::new().compression_level(0).unwrap();
        assert_eq!(stored.level(), CompressionLevel::Stored);
    }

    #[test]
    fn test_compression_level_invalid() {
        for level in [10, 15, 100, u32::MAX] {
            let result = ArchiveOptions::new().compression_level(level);
            assert!(matches!(
                result,
                Err(Error::InvalidCompressionLevel { level: l }) if l == level
            ));
        }
    }

    #[test]
    fn test_compression_level_clamped() {
        assert_eq!(
            ArchiveOptions::new().compression_level_clamped(42).level(),
            CompressionLevel::Level(9)
        );
        assert_eq!(
            ArchiveOptions::new().compression_level_clamped(0).level(),
            CompressionLevel::Stored
        );
    }

    #[test]
    fn test_builder_chain() {
        let options = ArchiveOptions::new()
            .validate_on_save(false)
            .temp_prefix("tmp-")
            .level_with(CompressionLevel::Stored);
        assert!(!options.validates_on_save());
        assert_eq!(options.temp_file_prefix(), "tmp-");
        assert_eq!(options.level(), CompressionLevel::Stored);
    }
}
