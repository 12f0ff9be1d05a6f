//! Volatility surface construction and queries.
//!
//! A surface maps (time to expiry, strike coordinate) → implied vol. It is
//! fitted to scattered [`ImpliedVolPoint`]s by piecewise-linear interpolation
//! on their Delaunay triangulation and never extrapolates past the convex
//! hull of the points.
//!
//! - [`SurfaceBuilder`]: settings, then [`VolSurface`] = grid + query
//! - [`SurfaceGrid`]: regular grid with missing nodes, plus [`SurfaceSnapshot`]
//! - [`SurfaceQuery`]: vol and [`PointGreeks`] at any point
//! - [`Interpolator`]: the scattered-data interpolation seam

pub mod builder;
pub(crate) mod delaunay;
pub mod grid;
pub mod interp;
pub mod query;

pub use builder::{DEFAULT_RESOLUTION, SurfaceBuilder, VolSurface};
pub use grid::{SurfaceGrid, SurfaceSnapshot, linspace};
pub use interp::{InterpolationMethod, Interpolator, LinearInterpolator};
pub use query::{PointGreeks, SurfaceQuery};

use crate::conventions::StrikeAxis;
use crate::implied::ImpliedVolPoint;

/// `(expiry, axis coordinate, vol)` samples for the interpolator.
pub(crate) fn project_points(
    points: &[ImpliedVolPoint],
    axis: StrikeAxis,
    spot: f64,
) -> Vec<(f64, f64, f64)> {
    points
        .iter()
        .map(|p| (p.expiry, axis.coordinate(p.strike, spot), p.vol))
        .collect()
}
