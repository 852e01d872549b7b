//! Error types for expression handling.

use thiserror::Error;

/// Why an expression failed to parse or execute. These never escape the
/// engine as panics; callers either score the expression 0 or surface the
/// failure as a typed test outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty expression")]
    Empty,

    #[error("parse error at offset {at}: {reason}")]
    Parse { at: usize, reason: String },
}
