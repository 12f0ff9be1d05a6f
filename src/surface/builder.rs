//! Builder API for volatility surface construction.
//!
//! ```
//! use ivsurf::{ImpliedVolPoint, MarketContext, SurfaceBuilder};
//!
//! let ctx = MarketContext::new(100.0, 0.05, 0.0)?;
//! let mut points = Vec::new();
//! for expiry in [0.25, 0.5, 1.0] {
//!     for (strike, vol) in [(90.0, 0.24), (100.0, 0.20), (110.0, 0.22)] {
//!         points.push(ImpliedVolPoint { expiry, strike, vol });
//!     }
//! }
//!
//! let surface = SurfaceBuilder::new().resolution(10).build(&ctx, &points)?;
//! assert_eq!(surface.grid().times().len(), 10);
//! assert!(surface.vol_at(0.5, 100.0).is_some());
//! # Ok::<(), ivsurf::IvSurfError>(())
//! ```

use crate::conventions::StrikeAxis;
use crate::error::{self, IvSurfError};
use crate::implied::ImpliedVolPoint;
use crate::pricing::MarketContext;
use crate::surface::grid::{SurfaceGrid, SurfaceSnapshot, linspace};
use crate::surface::interp::InterpolationMethod;
use crate::surface::project_points;
use crate::surface::query::{PointGreeks, SurfaceQuery};
use crate::types::Vol;

/// Grid points per axis unless configured otherwise.
pub const DEFAULT_RESOLUTION: usize = 50;

/// Builder for a [`VolSurface`] from solved implied volatility points.
///
/// Settings are chosen up front; [`build`](Self::build) can then be called
/// for any number of point sets and market contexts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBuilder {
    resolution: usize,
    axis: StrikeAxis,
    rescale: bool,
    method: InterpolationMethod,
}

impl SurfaceBuilder {
    /// Builder with 50 points per axis on the strike axis, linear
    /// interpolation, no rescaling.
    pub fn new() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            axis: StrikeAxis::default(),
            rescale: false,
            method: InterpolationMethod::default(),
        }
    }

    /// Set the number of grid points per axis (at least 2).
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the strike coordinate used for both the grid and queries.
    pub fn axis(mut self, axis: StrikeAxis) -> Self {
        self.axis = axis;
        self
    }

    /// Rescale both axes to [0, 1] before triangulating.
    pub fn rescale(mut self, rescale: bool) -> Self {
        self.rescale = rescale;
        self
    }

    /// Set the interpolation scheme.
    pub fn method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    /// Fit the interpolant and evaluate it on the grid.
    ///
    /// Grid axes span the minimum to maximum expiry and strike coordinate of
    /// `points`.
    ///
    /// # Errors
    /// - [`IvSurfError::InvalidInput`] if the resolution is below 2 or a point
    ///   is not finite.
    /// - [`IvSurfError::InsufficientData`] if fewer than 3 distinct points
    ///   are given, or all lie on one line (for example, a single expiry).
    pub fn build(
        &self,
        context: &MarketContext,
        points: &[ImpliedVolPoint],
    ) -> error::Result<VolSurface> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            n_points = points.len(),
            resolution = self.resolution,
            axis = ?self.axis,
            rescale = self.rescale,
            "surface build started"
        );

        if self.resolution < 2 {
            return Err(IvSurfError::InvalidInput {
                message: format!("resolution must be at least 2, got {}", self.resolution),
            });
        }
        if points.len() < 3 {
            return Err(IvSurfError::InsufficientData {
                message: format!("at least 3 points required, got {}", points.len()),
            });
        }

        let samples = project_points(points, self.axis, context.spot());
        let interpolator = self.method.build(&samples, self.rescale)?;

        let (t_lo, t_hi) = span(samples.iter().map(|s| s.0));
        let (k_lo, k_hi) = span(samples.iter().map(|s| s.1));
        let times = linspace(t_lo, t_hi, self.resolution)?;
        let strikes = linspace(k_lo, k_hi, self.resolution)?;
        let grid = SurfaceGrid::evaluate(self.axis, times, strikes, interpolator.as_ref());

        #[cfg(feature = "logging")]
        tracing::debug!(coverage = grid.coverage(), "surface build complete");

        Ok(VolSurface {
            grid,
            query: SurfaceQuery::from_parts(*context, self.axis, interpolator),
        })
    }
}

impl Default for SurfaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// A fitted surface: the evaluated grid plus a query handle sharing the
/// same interpolant.
#[derive(Debug, Clone)]
pub struct VolSurface {
    grid: SurfaceGrid,
    query: SurfaceQuery,
}

impl VolSurface {
    /// The evaluated grid.
    pub fn grid(&self) -> &SurfaceGrid {
        &self.grid
    }

    /// Point-query handle over the same interpolant.
    pub fn query(&self) -> &SurfaceQuery {
        &self.query
    }

    /// See [`SurfaceQuery::vol_at`].
    pub fn vol_at(&self, expiry: f64, coordinate: f64) -> Option<Vol> {
        self.query.vol_at(expiry, coordinate)
    }

    /// See [`SurfaceQuery::greeks_at`].
    ///
    /// # Errors
    /// Same as [`SurfaceQuery::greeks_at`].
    pub fn greeks_at(
        &self,
        expiry: f64,
        coordinate: f64,
    ) -> error::Result<Option<PointGreeks>> {
        self.query.greeks_at(expiry, coordinate)
    }

    /// Grid snapshot stamped with the current UTC time.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.grid.snapshot()
    }
}
