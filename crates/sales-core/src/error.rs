//! Errors for the few boundary operations that can reject input.
//!
//! Everything else in this crate degrades to a default instead of failing.

use thiserror::Error;

/// A user-supplied month key was not of the form `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month '{input}': expected YYYY-MM (e.g. 2025-06)")]
pub struct MonthKeyError {
    pub input: String,
}

/// A row of the upstream payload could not be read as a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("row is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },
}
