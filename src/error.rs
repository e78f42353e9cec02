//! Engine error types
//!
//! Every fallible operation validates its inputs before touching any
//! container, so an `Err` always leaves the engine exactly as it was.

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the particle engine
#[derive(Debug, Error)]
pub enum SimError {
    /// Integration divides by mass, so a zero or non-finite mass cannot be stepped.
    #[error("non-integrable particle: mass {mass}")]
    NonIntegrable { mass: f64 },

    /// An owner produced a NaN or infinite force.
    #[error("non-finite force ({x}, {y})")]
    NonFiniteForce { x: f64, y: f64 },

    /// Commit/rewind periods must be finite numbers.
    #[error("invalid period: {0}")]
    InvalidPeriod(f64),

    /// An imported plain-data record carried a non-finite value.
    #[error("malformed particle record #{index}: field `{field}` is not finite")]
    MalformedRecord { index: usize, field: &'static str },

    /// World or grid configuration rejected by validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings or snapshot JSON failed to (de)serialize.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
