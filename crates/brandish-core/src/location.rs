//! Source locations.
//!
//! A [`Location`] names a file plus an inclusive line range and column range.
//! Every token and node carries one. Locations are immutable; combining two
//! of them with [`Location::union`] builds a new value spanning both.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// File name used when no source file is known.
pub const ANONYMOUS_FILE: &str = "<anon>";

/// Errors produced when combining locations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("cannot union locations from different files (`{left}` and `{right}`)")]
    FileMismatch { left: String, right: String },
}

/// A non-empty `first..=last` range of lines or columns.
///
/// Construction normalizes the bounds, so `first <= last` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    first: u32,
    last: u32,
}

impl Bounds {
    pub fn new(first: u32, last: u32) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    pub fn single(value: u32) -> Self {
        Self {
            first: value,
            last: value,
        }
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    /// Tightest bounds enclosing both operands.
    pub fn cover(self, other: Bounds) -> Bounds {
        Bounds {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }

    fn is_single(&self) -> bool {
        self.first == self.last
    }
}

impl From<u32> for Bounds {
    fn from(value: u32) -> Self {
        Self::single(value)
    }
}

impl From<Range<u32>> for Bounds {
    fn from(range: Range<u32>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// A position in a source file.
///
/// Lines are 1-based. Columns are 0-based character offsets from the start of
/// the line; a token covering `[s, e)` has column bounds `s..e`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    file: Arc<str>,
    line: Bounds,
    column: Bounds,
}

impl Location {
    pub fn new(file: impl Into<Arc<str>>, line: impl Into<Bounds>, column: impl Into<Bounds>) -> Self {
        Self {
            file: file.into(),
            line: line.into(),
            column: column.into(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Shared handle to the file name; cloning it does not allocate.
    pub fn file_handle(&self) -> &Arc<str> {
        &self.file
    }

    pub fn line(&self) -> Bounds {
        self.line
    }

    pub fn column(&self) -> Bounds {
        self.column
    }

    pub fn same_file(&self, other: &Location) -> bool {
        self.file == other.file
    }

    /// Combines this location with another from the same file.
    pub fn union(&self, other: &Location) -> Result<Location, LocationError> {
        if !self.same_file(other) {
            return Err(LocationError::FileMismatch {
                left: self.file.to_string(),
                right: other.file.to_string(),
            });
        }
        Ok(Location {
            file: Arc::clone(&self.file),
            line: self.line.cover(other.line),
            column: self.column.cover(other.column),
        })
    }

    /// Folds every location in `locations` into one.
    ///
    /// Returns `Ok(None)` for an empty sequence.
    pub fn union_all<'a>(
        locations: impl IntoIterator<Item = &'a Location>,
    ) -> Result<Option<Location>, LocationError> {
        let mut iter = locations.into_iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        iter.try_fold(first.clone(), |acc, next| acc.union(next))
            .map(Some)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(ANONYMOUS_FILE, 1, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.file, self.line, self.column)
    }
}
