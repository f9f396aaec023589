//! Error type shared by the whole crate.
//!
//! Infeasibility is an error, never an approximation: callers can always tell
//! an empty polygon or an unsolvable distribution apart from a zero result.
//! Contract violations (wrong matrix shapes, invalid contact parameters) are
//! not represented here; they panic at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No feasible wrench, polygon or QP solution exists.
    #[error("infeasible: {0}")]
    Infeasible(String),
    /// The requested set is not bounded (e.g. a polygon missing constraints).
    #[error("unbounded: {0}")]
    Unbounded(String),
    /// The numerical backend stopped without a usable answer.
    #[error("solver failure: {0}")]
    Solver(String),
    /// A persisted contact record does not describe a valid contact.
    #[error("invalid contact record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("no path to save the contact feed to")]
    MissingPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Error::Infeasible(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
