//! Black-Scholes pricing of European calls with a continuous dividend yield.
//!
//! # Formula
//! ```text
//! C = S·e^{-qT}·Φ(d1) − K·e^{-rT}·Φ(d2)
//! d1 = [ln(S/K) + (r − q + σ²/2)·T] / (σ√T)
//! d2 = d1 − σ√T
//! ```
//!
//! Market-wide inputs (spot, rate, dividend yield) live in [`MarketContext`],
//! which is fixed for a batch. Per-point inputs (strike, expiry, vol) are
//! passed separately so the two can't be swapped positionally.

use std::f64::consts::{PI, SQRT_2};

use serde::Serialize;
use statrs::function::erf::erfc;

use crate::conventions::{forward_price, log_moneyness};
use crate::error;
use crate::types::Greeks;
use crate::validate::{require_positive, validate_finite, validate_positive};

/// Market inputs shared by every pricing and implied vol computation in a run.
///
/// Immutable once built. Changing any field means building a new context, and
/// implied vols solved under the old one must be discarded.
///
/// # Examples
/// ```
/// use ivsurf::MarketContext;
///
/// let ctx = MarketContext::new(450.0, 0.015, 0.013)?;
/// assert_eq!(ctx.spot(), 450.0);
/// assert!(MarketContext::new(0.0, 0.015, 0.013).is_err());
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketContext {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
}

impl MarketContext {
    /// Create a context from spot, continuously compounded risk-free rate,
    /// and continuous dividend yield (both as decimals).
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](crate::IvSurfError::InvalidInput)
    /// if spot is not positive and finite, or rate/yield are not finite.
    pub fn new(spot: f64, rate: f64, dividend_yield: f64) -> error::Result<Self> {
        validate_positive(spot, "spot")?;
        validate_finite(rate, "rate")?;
        validate_finite(dividend_yield, "dividend_yield")?;
        Ok(Self {
            spot,
            rate,
            dividend_yield,
        })
    }

    /// Underlying spot price S.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Risk-free rate r.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Dividend yield q.
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Forward price at `expiry`: S · exp((r − q) · T).
    pub fn forward(&self, expiry: f64) -> f64 {
        forward_price(self.spot, self.rate, self.dividend_yield, expiry)
    }
}

/// Standard normal CDF Φ(x).
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF φ(x).
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes `(d1, d2)`.
///
/// Inputs are assumed valid; see [`call_price`] for the checked entry point.
pub fn d1_d2(ctx: &MarketContext, strike: f64, expiry: f64, vol: f64) -> (f64, f64) {
    let sqrt_t = expiry.sqrt();
    let vol_sqrt_t = vol * sqrt_t;
    let d1 = (-log_moneyness(strike, ctx.forward(expiry)) + 0.5 * vol * vol * expiry) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// European call price.
///
/// # Errors
/// Returns [`IvSurfError::InvalidParameters`](crate::IvSurfError::InvalidParameters)
/// if strike, expiry, or vol is not positive and finite. Nothing is clamped.
///
/// # Examples
/// ```
/// use ivsurf::MarketContext;
/// use ivsurf::pricing::call_price;
///
/// let ctx = MarketContext::new(100.0, 0.05, 0.0)?;
/// let c = call_price(&ctx, 100.0, 1.0, 0.20)?;
/// assert!((c - 10.4506).abs() < 1e-4);
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
pub fn call_price(ctx: &MarketContext, strike: f64, expiry: f64, vol: f64) -> error::Result<f64> {
    check_point(strike, expiry, vol)?;
    Ok(call_price_unchecked(ctx, strike, expiry, vol))
}

/// Call price without argument checks, for the implied vol objective.
pub(crate) fn call_price_unchecked(ctx: &MarketContext, strike: f64, expiry: f64, vol: f64) -> f64 {
    let (d1, d2) = d1_d2(ctx, strike, expiry, vol);
    let div_factor = (-ctx.dividend_yield * expiry).exp();
    let df = (-ctx.rate * expiry).exp();
    ctx.spot * div_factor * norm_cdf(d1) - strike * df * norm_cdf(d2)
}

/// Analytic Greeks of a European call.
///
/// # Errors
/// Same conditions as [`call_price`].
pub fn greeks(ctx: &MarketContext, strike: f64, expiry: f64, vol: f64) -> error::Result<Greeks> {
    check_point(strike, expiry, vol)?;

    let (d1, d2) = d1_d2(ctx, strike, expiry, vol);
    let spot = ctx.spot;
    let (r, q) = (ctx.rate, ctx.dividend_yield);
    let sqrt_t = expiry.sqrt();
    let div_factor = (-q * expiry).exp();
    let df = (-r * expiry).exp();
    let pdf_d1 = norm_pdf(d1);
    let cdf_d1 = norm_cdf(d1);
    let cdf_d2 = norm_cdf(d2);

    Ok(Greeks {
        delta: div_factor * cdf_d1,
        gamma: div_factor * pdf_d1 / (spot * vol * sqrt_t),
        theta: -spot * vol * div_factor * pdf_d1 / (2.0 * sqrt_t) - r * strike * df * cdf_d2
            + q * spot * div_factor * cdf_d1,
        vega: spot * div_factor * pdf_d1 * sqrt_t,
        rho: strike * expiry * df * cdf_d2,
    })
}

fn check_point(strike: f64, expiry: f64, vol: f64) -> error::Result<()> {
    require_positive(strike, "strike")?;
    require_positive(expiry, "expiry")?;
    require_positive(vol, "vol")?;
    Ok(())
}
