use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown method tag: {0}")]
    UnknownMethod(String),

    #[error("unknown add mode: {0} (expected \"append\" or \"prepend\")")]
    UnknownAddMode(String),

    #[error("unknown output mode: {0} (expected \"legacy\" or \"resolved\")")]
    UnknownOutputMode(String),

    #[error("expected a record object, got {0}")]
    NotAnObject(String),
}
