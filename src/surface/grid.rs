//! Regular evaluation grid over (time to expiry, strike axis).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::conventions::StrikeAxis;
use crate::error::{self, IvSurfError};
use crate::surface::interp::Interpolator;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// `n` evenly spaced values from `lo` to `hi`, both endpoints exact.
///
/// # Errors
/// Returns [`IvSurfError::InvalidInput`] if `n < 2`, an endpoint is not
/// finite, or `lo >= hi`.
pub fn linspace(lo: f64, hi: f64, n: usize) -> error::Result<Vec<f64>> {
    if n < 2 || !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(IvSurfError::InvalidInput {
            message: format!("linspace needs n >= 2 and finite lo < hi, got n={n}, [{lo}, {hi}]"),
        });
    }
    let step = (hi - lo) / (n - 1) as f64;
    let mut values: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
    values[n - 1] = hi;
    Ok(values)
}

/// Interpolated volatilities on a rectangular grid.
///
/// `vols[i][j]` is the volatility at `strikes[i]`, `times[j]`, or `None`
/// when that node lies outside the convex hull of the input points. Both
/// axes are strictly increasing. A grid is rebuilt whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceGrid {
    axis: StrikeAxis,
    times: Vec<f64>,
    strikes: Vec<f64>,
    vols: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
    /// Evaluate `interpolator` at every node of `times × strikes`.
    pub(crate) fn evaluate(
        axis: StrikeAxis,
        times: Vec<f64>,
        strikes: Vec<f64>,
        interpolator: &dyn Interpolator,
    ) -> Self {
        let row = |&k: &f64| -> Vec<Option<f64>> {
            times.iter().map(|&t| interpolator.interpolate(t, k)).collect()
        };

        #[cfg(feature = "parallel")]
        let vols: Vec<Vec<Option<f64>>> = strikes.par_iter().map(row).collect();
        #[cfg(not(feature = "parallel"))]
        let vols: Vec<Vec<Option<f64>>> = strikes.iter().map(row).collect();

        Self {
            axis,
            times,
            strikes,
            vols,
        }
    }

    /// Which strike coordinate the grid uses.
    pub fn axis(&self) -> StrikeAxis {
        self.axis
    }

    /// Time-to-expiry axis, in years.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Strike axis, as strike prices or moneyness per [`axis`](Self::axis).
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Volatility matrix, one row per strike.
    pub fn vols(&self) -> &[Vec<Option<f64>>] {
        &self.vols
    }

    /// Volatility at `strikes[strike_idx]`, `times[time_idx]`.
    ///
    /// `None` for a missing node or an out-of-range index.
    pub fn vol(&self, strike_idx: usize, time_idx: usize) -> Option<f64> {
        self.vols.get(strike_idx)?.get(time_idx).copied().flatten()
    }

    /// Points per axis.
    pub fn resolution(&self) -> usize {
        self.times.len()
    }

    /// Fraction of nodes holding a value.
    pub fn coverage(&self) -> f64 {
        let total = self.times.len() * self.strikes.len();
        if total == 0 {
            return 0.0;
        }
        let filled = self.vols.iter().flatten().filter(|v| v.is_some()).count();
        filled as f64 / total as f64
    }

    /// 2-D coordinate arrays `(T, K)`, each shaped like [`vols`](Self::vols),
    /// for renderers that expect a meshgrid.
    pub fn meshgrid(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let t_mesh = self.strikes.iter().map(|_| self.times.clone()).collect();
        let k_mesh = self
            .strikes
            .iter()
            .map(|&k| vec![k; self.times.len()])
            .collect();
        (t_mesh, k_mesh)
    }

    /// Snapshot stamped with the current UTC time.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.snapshot_at(Utc::now())
    }

    /// Snapshot stamped with `taken_at`.
    pub fn snapshot_at(&self, taken_at: DateTime<Utc>) -> SurfaceSnapshot {
        SurfaceSnapshot {
            taken_at,
            grid: self.clone(),
        }
    }
}

/// A grid plus the time it was taken, for the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// The grid at that time.
    pub grid: SurfaceGrid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::interp::LinearInterpolator;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn triangle_grid(n: usize) -> SurfaceGrid {
        // Lower-left half of the unit square.
        let interp =
            LinearInterpolator::new(&[(0.0, 0.0, 0.1), (1.0, 0.0, 0.3), (0.0, 1.0, 0.5)]).unwrap();
        SurfaceGrid::evaluate(
            StrikeAxis::Strike,
            linspace(0.0, 1.0, n).unwrap(),
            linspace(0.0, 1.0, n).unwrap(),
            &interp,
        )
    }

    #[test]
    fn linspace_endpoints_exact() {
        let v = linspace(0.019, 1.63, 50).unwrap();
        assert_eq!(v.len(), 50);
        assert_eq!(v[0], 0.019);
        assert_eq!(v[49], 1.63);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn linspace_rejects_degenerate() {
        assert!(linspace(0.0, 1.0, 1).is_err());
        assert!(linspace(1.0, 1.0, 5).is_err());
        assert!(linspace(2.0, 1.0, 5).is_err());
        assert!(linspace(0.0, f64::INFINITY, 5).is_err());
    }

    #[test]
    fn nodes_outside_hull_are_missing() {
        let grid = triangle_grid(3);
        // strike row 0 (k = 0) is the hull's bottom edge
        assert_abs_diff_eq!(grid.vol(0, 0).unwrap(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.vol(0, 2).unwrap(), 0.3, epsilon = 1e-12);
        // (t = 1, k = 1) is past the hypotenuse
        assert_eq!(grid.vol(2, 2), None);
        assert_eq!(grid.vol(2, 0), Some(0.5));
        assert_eq!(grid.vol(9, 0), None);
        // 6 of 9 nodes lie on or under the hypotenuse
        assert_abs_diff_eq!(grid.coverage(), 6.0 / 9.0, epsilon = 1e-12);
    }

    #[test]
    fn meshgrid_shapes_match_vols() {
        let grid = triangle_grid(4);
        let (t, k) = grid.meshgrid();
        assert_eq!(t.len(), 4);
        assert_eq!(k.len(), 4);
        assert!(t.iter().all(|row| row.len() == 4 && row.as_slice() == grid.times()));
        assert!(k[2].iter().all(|&v| v == grid.strikes()[2]));
        assert_eq!(grid.resolution(), 4);
    }

    #[test]
    fn snapshot_serializes_missing_as_null() {
        let grid = triangle_grid(3);
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 15, 30, 0).unwrap();
        let snap = grid.snapshot_at(at);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["taken_at"], "2025-03-14T15:30:00Z");
        assert_eq!(json["grid"]["axis"], "strike");
        assert!(json["grid"]["vols"][2][2].is_null());
        assert_eq!(json["grid"]["times"].as_array().unwrap().len(), 3);
    }
}
