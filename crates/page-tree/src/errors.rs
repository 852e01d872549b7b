//! Error types for tree construction.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TreeError {
    /// The snapshot payload could not be decoded into a tree.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
