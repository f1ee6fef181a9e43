//! Entry name type with validation against the zip format's limits.

use crate::{Error, Result};
use std::fmt;

/// Maximum length of an entry name in bytes.
///
/// Zip local and central headers store the name length in a 16-bit field.
pub const MAX_NAME_LENGTH: usize = u16::MAX as usize;

/// Number of characters of a rejected name echoed back in error messages.
const ERROR_ECHO_CHARS: usize = 64;

/// A validated entry name.
///
/// `EntryName` is a dynamically sized string that is checked once on
/// construction:
/// - it must not be empty
/// - it must not contain NUL bytes
/// - it must fit in a zip header's 16-bit name length field
///
/// Names are compared by exact string match. A trailing `/` marks a
/// directory record. Unlike extraction-oriented path types, names are not
/// normalized: whatever the archive stores is kept verbatim so it can be
/// written back unchanged.
///
/// # Examples
///
/// ```
/// use zipedit::EntryName;
///
/// let name = EntryName::new("docs/readme.txt").unwrap();
/// assert!(!name.is_directory());
/// assert_eq!(name.file_name(), "readme.txt");
/// assert_eq!(name.ancestors().collect::<Vec<_>>(), vec!["docs/"]);
///
/// assert!(EntryName::new("").is_err());
/// assert!(EntryName::new("docs/").unwrap().is_directory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryName(String);

impl EntryName {
    /// Creates a new `EntryName`, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if the name is empty, contains a
    /// NUL byte, or is longer than [`MAX_NAME_LENGTH`] bytes. Over-long names
    /// are rejected rather than truncated.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        let reject = |reason: String| Error::InvalidEntryName {
            name: s.chars().take(ERROR_ECHO_CHARS).collect(),
            reason,
        };

        if s.is_empty() {
            return Err(reject("entry name must not be empty".into()));
        }

        if s.contains('\0') {
            return Err(reject("contains NUL byte".into()));
        }

        if s.len() > MAX_NAME_LENGTH {
            return Err(reject(format!(
                "name is {} bytes, exceeds maximum length of {} bytes",
                s.len(),
                MAX_NAME_LENGTH
            )));
        }

        Ok(())
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this name denotes a directory (ends with `/`).
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Returns the last non-empty segment of the name.
    ///
    /// For directories the trailing slash is ignored, so `a/b/` yields `b`.
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Returns the directory prefixes implied by this name, shortest first.
    ///
    /// Every prefix ends with `/`. The name itself is never included, even
    /// when it is a directory.
    ///
    /// ```
    /// use zipedit::EntryName;
    ///
    /// let name = EntryName::new("a/b/c.txt").unwrap();
    /// assert_eq!(name.ancestors().collect::<Vec<_>>(), vec!["a/", "a/b/"]);
    ///
    /// let dir = EntryName::new("a/b/").unwrap();
    /// assert_eq!(dir.ancestors().collect::<Vec<_>>(), vec!["a/"]);
    /// ```
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        let s = self.0.as_str();
        s.match_indices('/')
            .map(move |(pos, _)| &s[..=pos])
            .filter(move |prefix| prefix.len() < s.len())
    }

    /// Returns true if this name lies below `prefix`.
    ///
    /// This is a plain string prefix match that excludes the prefix itself:
    /// `dir/a.txt` is below `dir/`, `dir/` is not below `dir/`. An empty
    /// prefix matches everything.
    pub fn is_below(&self, prefix: &str) -> bool {
        prefix.is_empty() || (self.0.starts_with(prefix) && self.0 != prefix)
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EntryName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntryName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for EntryName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}
