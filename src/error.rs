//! Error types for CAT computations

use thiserror::Error;

/// Result alias used throughout the crate
pub type CatResult<T> = Result<T, CatError>;

/// Errors raised while building cash flows or solving for the periodic rate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatError {
    /// The cash-flow series has no entries at all
    #[error("cash-flow series is empty")]
    EmptySeries,

    /// The series never changes sign, so no rate can zero its NPV
    #[error("cash-flow series has no sign change (needs both a receipt and a payment)")]
    NoSignChange,

    /// The plain Newton path hit a flat NPV curve
    #[error("NPV derivative is zero at rate {rate} (iteration {iteration})")]
    ZeroDerivative {
        /// Rate at which the derivative vanished
        rate: f64,
        /// Iteration index (0-based)
        iteration: u32,
    },

    /// A Newton step produced NaN or an infinite rate
    #[error("solver produced a non-finite rate at iteration {iteration}")]
    NonFiniteRate {
        /// Iteration index (0-based)
        iteration: u32,
    },

    /// Credit terms that cannot describe a real product
    #[error("invalid credit terms: {reason}")]
    InvalidTerms {
        /// Human-readable description of the offending input
        reason: String,
    },
}

impl CatError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            reason: reason.into(),
        }
    }
}
