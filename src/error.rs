use std::fmt;

/// Error surface for the exact-cover core.
///
/// `Unsatisfiable` is deliberately not a variant here: the absence of a
/// solution is an ordinary search outcome (`None` from `solve_first`, no
/// sink calls from `solve_all`), not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DlxError {
    /// The compressed matrix passed to `build_matrix` was malformed: an
    /// out-of-range constraint index, a duplicate index within one option,
    /// or a count that doesn't fit the arena's index type.
    InvalidInput(String),
    /// The search was aborted via a `SolveOptions` abort flag before it
    /// completed.
    Cancelled,
    /// The search did not complete before its `SolveOptions` deadline.
    DeadlineExceeded,
}

impl fmt::Display for DlxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DlxError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            DlxError::Cancelled => write!(f, "search was cancelled"),
            DlxError::DeadlineExceeded => write!(f, "search exceeded its deadline"),
        }
    }
}

impl std::error::Error for DlxError {}
