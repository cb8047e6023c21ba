//! Common result and error types for the mpl toolkit.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in mpl), not a
/// user-facing error. User errors are reported through the diagnostic sink
/// or the per-crate error enums (`ConfigError`, `PlaceError`).
pub type MplResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in mpl, not a user input problem.
///
/// These errors should never occur during normal operation. If one does
/// occur, it means an invariant of the placement data model was violated.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
