//! Black-Scholes implied volatility by bracketed root finding.
//!
//! Solves `call_price(σ) − p = 0` for σ in `[VOL_LOWER, VOL_UPPER]`. The call
//! price is strictly increasing in σ, so a sign change across the bracket
//! implies a unique root. Without one the quote has no solution and is dropped.

use serde::{Deserialize, Serialize};

use crate::error::{self, IvSurfError, NoSolutionReason};
use crate::implied::root::{Brent, RootError, RootFinder};
use crate::pricing::{MarketContext, call_price_unchecked};
use crate::quote::OptionQuote;
use crate::types::Vol;
use crate::validate::require_positive;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Lower end of the volatility bracket.
pub const VOL_LOWER: f64 = 1e-6;
/// Upper end of the volatility bracket (500%).
pub const VOL_UPPER: f64 = 5.0;

/// One solved quote: `(time to expiry, strike, implied vol)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolPoint {
    /// Time to expiry in years.
    pub expiry: f64,
    /// Strike price.
    pub strike: f64,
    /// Implied volatility, finite and positive.
    pub vol: f64,
}

/// Number of quotes dropped per [`NoSolutionReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DropCounts {
    /// Non-positive price or time to expiry.
    pub degenerate_input: usize,
    /// Price not reachable within the volatility bracket.
    pub no_bracket: usize,
    /// Root finder hit its iteration limit.
    pub no_convergence: usize,
}

impl DropCounts {
    /// Tally one dropped quote.
    pub fn record(&mut self, reason: NoSolutionReason) {
        match reason {
            NoSolutionReason::DegenerateInput => self.degenerate_input += 1,
            NoSolutionReason::NoBracket => self.no_bracket += 1,
            NoSolutionReason::NoConvergence => self.no_convergence += 1,
        }
    }

    /// Total number of dropped quotes.
    pub fn total(&self) -> usize {
        self.degenerate_input + self.no_bracket + self.no_convergence
    }
}

/// Result of solving a batch of quotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    /// Solved points, in input order.
    pub points: Vec<ImpliedVolPoint>,
    /// Quotes without a solution.
    pub dropped: DropCounts,
}

/// Implied volatility solver for European calls under a fixed [`MarketContext`].
///
/// Generic over the [`RootFinder`]; [`Brent`] by default.
///
/// # Examples
/// ```
/// use ivsurf::{ImpliedVolSolver, MarketContext};
/// use ivsurf::pricing::call_price;
///
/// let ctx = MarketContext::new(450.0, 0.015, 0.013)?;
/// let price = call_price(&ctx, 450.0, 0.5, 0.20)?;
/// let vol = ImpliedVolSolver::new(ctx).solve(price, 450.0, 0.5)?;
/// assert!((vol.0 - 0.20).abs() < 1e-8);
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ImpliedVolSolver<R = Brent> {
    context: MarketContext,
    root_finder: R,
}

impl ImpliedVolSolver<Brent> {
    /// Solver using Brent's method with default tolerances.
    pub fn new(context: MarketContext) -> Self {
        Self::with_root_finder(context, Brent::default())
    }
}

impl<R: RootFinder> ImpliedVolSolver<R> {
    /// Solver using a custom root finder.
    pub fn with_root_finder(context: MarketContext, root_finder: R) -> Self {
        Self {
            context,
            root_finder,
        }
    }

    /// The market context every solve uses.
    pub fn context(&self) -> &MarketContext {
        &self.context
    }

    /// Implied volatility of a call trading at `price`.
    ///
    /// # Errors
    /// - [`IvSurfError::NoSolution`] with [`NoSolutionReason::DegenerateInput`]
    ///   if `price` or `expiry` is not positive and finite.
    /// - [`IvSurfError::NoSolution`] if the bracket holds no root or the root
    ///   finder does not converge.
    /// - [`IvSurfError::InvalidParameters`] if `strike` is not positive.
    pub fn solve(&self, price: f64, strike: f64, expiry: f64) -> error::Result<Vol> {
        if !price.is_finite() || price <= 0.0 || !expiry.is_finite() || expiry <= 0.0 {
            return Err(no_solution(NoSolutionReason::DegenerateInput));
        }
        require_positive(strike, "strike")?;

        let ctx = &self.context;
        let objective = |vol: f64| call_price_unchecked(ctx, strike, expiry, vol) - price;

        let vol = self
            .root_finder
            .find_root(objective, VOL_LOWER, VOL_UPPER)
            .map_err(|e| {
                #[cfg(feature = "logging")]
                tracing::trace!(
                    price,
                    strike,
                    expiry,
                    error = %e,
                    "implied vol root search failed"
                );
                no_solution(match e {
                    RootError::NoBracket { .. } => NoSolutionReason::NoBracket,
                    RootError::NoConvergence { .. } | RootError::NonFinite { .. } => {
                        NoSolutionReason::NoConvergence
                    }
                })
            })?;

        if !vol.is_finite() || !(VOL_LOWER..=VOL_UPPER).contains(&vol) {
            return Err(no_solution(NoSolutionReason::NoConvergence));
        }
        Ok(Vol(vol))
    }

    /// Solve one quote at its mid price.
    ///
    /// # Errors
    /// Same as [`solve`](Self::solve).
    pub fn solve_quote(&self, quote: &OptionQuote) -> error::Result<ImpliedVolPoint> {
        let vol = self.solve(quote.mid(), quote.strike(), quote.time_to_expiry())?;
        Ok(ImpliedVolPoint {
            expiry: quote.time_to_expiry(),
            strike: quote.strike(),
            vol: vol.0,
        })
    }

    /// Solve every quote independently, dropping and counting those without
    /// a solution.
    ///
    /// With the `parallel` feature quotes are solved across the rayon pool;
    /// output order matches input order either way.
    ///
    /// # Errors
    /// Propagates anything other than [`IvSurfError::NoSolution`].
    pub fn solve_batch(&self, quotes: &[OptionQuote]) -> error::Result<SolveReport> {
        #[cfg(feature = "logging")]
        tracing::debug!(n_quotes = quotes.len(), "implied vol batch started");

        #[cfg(feature = "parallel")]
        let results: Vec<error::Result<ImpliedVolPoint>> =
            quotes.par_iter().map(|q| self.solve_quote(q)).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<error::Result<ImpliedVolPoint>> =
            quotes.iter().map(|q| self.solve_quote(q)).collect();

        let mut points = Vec::with_capacity(results.len());
        let mut dropped = DropCounts::default();
        for result in results {
            match result {
                Ok(point) => points.push(point),
                Err(IvSurfError::NoSolution { reason }) => dropped.record(reason),
                Err(e) => return Err(e),
            }
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_solved = points.len(),
            n_dropped = dropped.total(),
            no_bracket = dropped.no_bracket,
            no_convergence = dropped.no_convergence,
            "implied vol batch complete"
        );

        Ok(SolveReport { points, dropped })
    }
}

fn no_solution(reason: NoSolutionReason) -> IvSurfError {
    IvSurfError::NoSolution { reason }
}
