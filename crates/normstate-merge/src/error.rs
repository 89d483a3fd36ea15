//! Error types for the merge crate.

use normstate_types::TypeError;

/// Errors that can occur during a merge.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    /// A method, add mode or output mode tag could not be parsed.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
