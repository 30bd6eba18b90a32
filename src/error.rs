//! Error types shared by the formula compiler and the solver backends

use thiserror::Error;

/// Fatal conditions raised while building or solving a puzzle.
///
/// An unsatisfiable puzzle is not an error: it shows up as an empty
/// solution list and a model count of zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// The puzzle description itself is inconsistent (detected before solving)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value, object index or bit bundle is outside its declared range
    #[error("domain error: {0}")]
    Domain(String),

    /// The SAT backend reported a failure
    #[error("solver error: {0}")]
    Solver(String),
}

impl PuzzleError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub fn solver(message: impl Into<String>) -> Self {
        Self::Solver(message.into())
    }
}

pub type PuzzleResult<T> = std::result::Result<T, PuzzleError>;
