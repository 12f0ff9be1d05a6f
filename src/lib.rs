//! # ivsurf
//!
//! Implied volatility surfaces from option quotes, with Black-Scholes Greeks
//! at any point on the surface.
//!
//! The pipeline: raw call quotes → quote filter → implied vol per quote →
//! piecewise-linear surface over (time to expiry, strike or moneyness) →
//! volatility and Greeks at arbitrary query points.
//!
//! ## Architecture
//!
//! - **`pricing`**: Black-Scholes call price and analytic Greeks with a
//!   continuous dividend yield
//! - **`implied`**: implied vol by bracketed root finding (Brent, bisection)
//! - **`quote`**: quote validation, mid prices, strike-window and expiry filters
//! - **`surface`**: Delaunay-based linear interpolation, grids, point queries
//! - **`pipeline`**: the whole batch driven by a [`SurfaceConfig`]
//!
//! ## Design
//!
//! - **Newtypes for outputs, bare `f64` for inputs.** Solved and interpolated
//!   volatilities come back as [`Vol`]. Market-wide inputs are bundled in an
//!   immutable [`MarketContext`] so they can't be swapped with per-point
//!   strike and expiry.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Quiet drops, loud misuse.** A quote with no implied vol is dropped and
//!   counted; calling the pricer with a non-positive strike is an error; a
//!   query outside the data is `None`.
//! - **Thread-safe.** Public types are `Send + Sync`; the fitted interpolant
//!   is shared as `Arc<dyn Interpolator>`.
//! - **Serializable.** Config, value types, grids and snapshots implement
//!   Serde traits.
//!
//! ## Features
//!
//! - `logging`: `tracing` events for batch progress and drop counts
//! - `parallel`: solve quotes and evaluate grids on the rayon pool

pub mod config;
pub mod conventions;
pub mod error;
pub mod implied;
pub mod pipeline;
pub mod pricing;
pub mod quote;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use config::SurfaceConfig;
#[doc(inline)]
pub use conventions::StrikeAxis;
#[doc(inline)]
pub use error::{IvSurfError, NoSolutionReason, Result};
#[doc(inline)]
pub use implied::{ImpliedVolPoint, ImpliedVolSolver};
#[doc(inline)]
pub use pipeline::{PipelineOutput, RunStats, SurfacePipeline};
#[doc(inline)]
pub use pricing::MarketContext;
#[doc(inline)]
pub use quote::{OptionQuote, QuoteFilter, RawQuote};
#[doc(inline)]
pub use surface::{Interpolator, SurfaceBuilder, SurfaceGrid, SurfaceQuery, VolSurface};
#[doc(inline)]
pub use types::{Greeks, Vol};
