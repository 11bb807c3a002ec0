/// An error type for engine failures which abort a run.
///
/// Per-candidate rejections (no path, lifetime limit, swap policy) are not errors:
/// they are reason codes carried inside the assignment log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// An input entity is malformed: the message names the offending row.
    InvalidInput(String),

    /// An internal invariant was violated: the message carries a diagnostic dump.
    Internal(String),
}

/// A type alias for result type with `EngineError`.
pub type EngineResult<T> = Result<T, EngineError>;

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EngineError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
