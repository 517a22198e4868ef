//! Common result and error types for the fabric backend.

/// The standard result type for operations that can hit a structural invariant violation.
///
/// `Err` indicates a programming or database-integrity error (for example a
/// dedicated-net search that exhausts its queue without reaching the
/// driver), not an expected miss. Expected misses such as unknown names are
/// modelled with `Option` instead.
pub type FabricResult<T> = Result<T, InternalError>;

/// An internal error indicating a violated structural invariant.
///
/// These should never occur with a well-formed device database and a
/// correctly driven context. When one does, the current operation stops.
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
