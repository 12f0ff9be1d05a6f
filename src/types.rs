//! Core value types.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes**: a solved or interpolated volatility comes back as
//! [`Vol`] so it can't be confused with a price or a strike. **Inputs use bare
//! `f64`**, named by parameter.
//!
//! [`Vol`] wraps `f64`, so it derives `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// A vol of 0.20 represents 20% annualized volatility.
///
/// # Examples
/// ```
/// use ivsurf::types::Vol;
/// let vol = Vol(0.20);
/// assert_eq!(vol.0, 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// First-order sensitivities of a European call, plus theta.
///
/// Units are raw: theta is per year, vega per unit of volatility (not per
/// vol point), rho per unit of rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂t (calendar time, per year)
    pub theta: f64,
    /// ∂V/∂σ
    pub vega: f64,
    /// ∂V/∂r
    pub rho: f64,
}
