//! Implied volatility extraction from option prices.
//!
//! - [`ImpliedVolSolver`] inverts the Black-Scholes call price one quote at a
//!   time, or a batch at once with per-reason drop counts.
//! - [`RootFinder`] abstracts the bracketing search; [`Brent`] (default) and
//!   [`Bisection`] are provided.

pub mod root;
pub mod solver;

pub use root::{Bisection, Brent, RootError, RootFinder};
pub use solver::{
    DropCounts, ImpliedVolPoint, ImpliedVolSolver, SolveReport, VOL_LOWER, VOL_UPPER,
};
