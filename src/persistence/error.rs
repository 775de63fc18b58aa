//! Restore failures.
//!
//! A restore is all-or-nothing: every failure surfaces as one of these and the
//! caller keeps its current state.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Nothing has been saved in the requested place.
    NoSave,
    /// The save exists but is not a readable envelope.
    Corrupt(String),
    /// The envelope was written by an incompatible version.
    UnsupportedVersion {
        /// Version found in the envelope.
        found: u64,
        /// Version this build reads.
        expected: u32,
    },
    /// The snapshot parsed but describes an impossible world.
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NoSave => write!(f, "no saved game present"),
            LoadError::Corrupt(reason) => write!(f, "saved game is corrupt: {}", reason),
            LoadError::UnsupportedVersion { found, expected } => write!(
                f,
                "unsupported save version {} (expected {})",
                found, expected
            ),
            LoadError::Invalid(reason) => write!(f, "saved game is invalid: {}", reason),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Corrupt(err.to_string())
    }
}
