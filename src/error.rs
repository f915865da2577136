//! Error taxonomy for thin-film stack computations.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! one of three kinds:
//! - [`TmmError::Validation`]: malformed stack geometry or inconsistent inputs
//! - [`TmmError::PhysicalAmbiguity`]: gain media or an unresolvable propagation branch
//! - [`TmmError::Geometry`]: out-of-range position queries or infinite thicknesses
//!   where finite ones are required
//!
//! Validation always happens before numeric work, so an error is never returned
//! alongside a partial result.

use num_complex::Complex64;
use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, TmmError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TmmError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("ambiguous propagation direction for n = {n}, theta = {theta}: {reason}")]
    PhysicalAmbiguity {
        n: Complex64,
        theta: Complex64,
        reason: String,
    },

    #[error("position cannot be resolved: {0}")]
    Geometry(String),
}

impl TmmError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        TmmError::Validation(msg.into())
    }

    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        TmmError::Geometry(msg.into())
    }

    pub(crate) fn ambiguity(n: Complex64, theta: Complex64, reason: impl Into<String>) -> Self {
        TmmError::PhysicalAmbiguity {
            n,
            theta,
            reason: reason.into(),
        }
    }
}
