//! Scattered-data interpolation over (expiry, strike-axis) coordinates.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error;
use crate::surface::delaunay::Triangulation;

/// Interpolates a value at an arbitrary point from scattered samples.
///
/// Returns `None` wherever the interpolant is undefined (outside the convex
/// hull of the samples, or at a non-finite query). Implementations never
/// extrapolate.
pub trait Interpolator: Send + Sync + fmt::Debug {
    /// Value at `(x, y)`.
    fn interpolate(&self, x: f64, y: f64) -> Option<f64>;

    /// Values at many points, in order.
    fn interpolate_many(&self, points: &[(f64, f64)]) -> Vec<Option<f64>> {
        points.iter().map(|&(x, y)| self.interpolate(x, y)).collect()
    }
}

/// Interpolation scheme used by the surface builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Barycentric interpolation on a Delaunay triangulation.
    #[default]
    Linear,
}

impl InterpolationMethod {
    /// Fit this scheme to `(x, y, value)` samples.
    pub(crate) fn build(
        self,
        samples: &[(f64, f64, f64)],
        rescale: bool,
    ) -> error::Result<Arc<dyn Interpolator>> {
        let interpolator: Arc<dyn Interpolator> = match self {
            Self::Linear => Arc::new(LinearInterpolator::with_rescale(samples, rescale)?),
        };
        Ok(interpolator)
    }
}

/// Piecewise-linear interpolation on the Delaunay triangulation of the
/// samples. Continuous, exact at the samples, `None` outside their hull.
///
/// # Examples
/// ```
/// use ivsurf::surface::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(&[
///     (0.25, 90.0, 0.24),
///     (0.25, 110.0, 0.22),
///     (1.00, 90.0, 0.21),
///     (1.00, 110.0, 0.19),
/// ])?;
/// let v = interp.interpolate(0.25, 100.0).unwrap();
/// assert!((v - 0.23).abs() < 1e-12);
/// assert!(interp.interpolate(2.0, 100.0).is_none());
/// # Ok::<(), ivsurf::IvSurfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    triangulation: Triangulation,
}

impl LinearInterpolator {
    /// Triangulate the samples in their own coordinates.
    ///
    /// # Errors
    /// - [`IvSurfError::InvalidInput`](crate::IvSurfError::InvalidInput) if a
    ///   sample is not finite.
    /// - [`IvSurfError::InsufficientData`](crate::IvSurfError::InsufficientData)
    ///   if fewer than 3 distinct points remain or all are collinear.
    pub fn new(samples: &[(f64, f64, f64)]) -> error::Result<Self> {
        Self::with_rescale(samples, false)
    }

    /// Like [`new`](Self::new), optionally rescaling both axes to [0, 1]
    /// first. Rescaling changes the triangulation (and so the interpolated
    /// values) when the axes have very different spans.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn with_rescale(samples: &[(f64, f64, f64)], rescale: bool) -> error::Result<Self> {
        Ok(Self {
            triangulation: Triangulation::new(samples, rescale)?,
        })
    }

    /// Number of distinct sample points after merging duplicates.
    pub fn num_points(&self) -> usize {
        self.triangulation.num_points()
    }

    /// Number of triangles in the triangulation.
    pub fn num_triangles(&self) -> usize {
        self.triangulation.num_triangles()
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        self.triangulation.interpolate(x, y)
    }
}
