//! Error types for the ivsurf library.
//!
//! Pricing misuse is loud and propagates with `?`. A quote whose implied
//! volatility cannot be recovered is routine and is dropped by batch callers.
//! "No data" at a query point is not an error at all: queries return
//! [`Option`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, IvSurfError>;

/// Errors that can occur while pricing, solving, or building a surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IvSurfError {
    /// The pricing model was called with non-positive or non-finite spot,
    /// strike, expiry, or volatility. Indicates a caller bug.
    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// Configuration or market context is invalid.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// No implied volatility reproduces the observed price.
    #[error("no implied volatility solution: {reason}")]
    NoSolution { reason: NoSolutionReason },

    /// Too few usable points to interpolate a surface.
    #[error("insufficient data: {message}")]
    InsufficientData { message: String },
}

/// Why an implied volatility could not be recovered for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSolutionReason {
    /// Non-positive (or non-finite) price or time to expiry.
    DegenerateInput,
    /// The objective has no sign change across the volatility bracket.
    NoBracket,
    /// The root finder hit its iteration limit.
    NoConvergence,
}

impl fmt::Display for NoSolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DegenerateInput => "degenerate input",
            Self::NoBracket => "price not bracketed by the volatility interval",
            Self::NoConvergence => "root finder did not converge",
        };
        f.write_str(s)
    }
}

impl IvSurfError {
    /// Whether this error is the routine per-quote failure that batch
    /// callers drop instead of propagating.
    pub fn is_no_solution(&self) -> bool {
        matches!(self, Self::NoSolution { .. })
    }
}
