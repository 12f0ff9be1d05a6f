//! Point queries against a fitted surface.

use std::sync::Arc;

use serde::Serialize;

use crate::conventions::StrikeAxis;
use crate::error;
use crate::implied::ImpliedVolPoint;
use crate::pricing::{self, MarketContext};
use crate::surface::interp::{InterpolationMethod, Interpolator};
use crate::surface::project_points;
use crate::types::{Greeks, Vol};

/// Greeks at a queried surface point, with the inputs that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointGreeks {
    /// Time to expiry in years.
    pub expiry: f64,
    /// Strike price (converted back from moneyness if needed).
    pub strike: f64,
    /// Interpolated volatility.
    pub vol: Vol,
    /// Black-Scholes Greeks at that volatility.
    pub greeks: Greeks,
}

/// Volatility and Greeks at arbitrary `(expiry, axis coordinate)` points.
///
/// Queries go straight to the interpolant over the solved points, not the
/// grid, so a query at a grid node and one between nodes are equally exact.
/// Cheap to clone; the interpolant is shared.
#[derive(Debug, Clone)]
pub struct SurfaceQuery {
    context: MarketContext,
    axis: StrikeAxis,
    interpolator: Arc<dyn Interpolator>,
}

impl SurfaceQuery {
    /// Fit a linear interpolant to `points` on the given axis.
    ///
    /// # Errors
    /// [`IvSurfError::InsufficientData`](crate::IvSurfError::InsufficientData)
    /// if fewer than 3 distinct points remain or all are collinear.
    pub fn new(
        context: MarketContext,
        axis: StrikeAxis,
        points: &[ImpliedVolPoint],
    ) -> error::Result<Self> {
        let samples = project_points(points, axis, context.spot());
        let interpolator = InterpolationMethod::default().build(&samples, false)?;
        Ok(Self::from_parts(context, axis, interpolator))
    }

    pub(crate) fn from_parts(
        context: MarketContext,
        axis: StrikeAxis,
        interpolator: Arc<dyn Interpolator>,
    ) -> Self {
        Self {
            context,
            axis,
            interpolator,
        }
    }

    /// Market context used for Greeks.
    pub fn context(&self) -> &MarketContext {
        &self.context
    }

    /// Strike coordinate of query points.
    pub fn axis(&self) -> StrikeAxis {
        self.axis
    }

    /// The shared interpolant.
    pub fn interpolator(&self) -> &Arc<dyn Interpolator> {
        &self.interpolator
    }

    /// Interpolated volatility at `(expiry, coordinate)`, `None` outside the
    /// convex hull of the input points.
    pub fn vol_at(&self, expiry: f64, coordinate: f64) -> Option<Vol> {
        self.interpolator.interpolate(expiry, coordinate).map(Vol)
    }

    /// Greeks at `(expiry, coordinate)` using the interpolated volatility.
    ///
    /// `Ok(None)` when there is no usable volatility there (outside the hull
    /// or not positive) or the point itself is not priceable (non-positive
    /// expiry or strike).
    ///
    /// # Errors
    /// Propagates pricing errors, which a point that passed the checks above
    /// does not produce.
    pub fn greeks_at(
        &self,
        expiry: f64,
        coordinate: f64,
    ) -> error::Result<Option<PointGreeks>> {
        let Some(vol) = self.vol_at(expiry, coordinate) else {
            return Ok(None);
        };
        let strike = self.axis.strike(coordinate, self.context.spot());
        let priceable = |v: f64| v.is_finite() && v > 0.0;
        if !priceable(vol.0) || !priceable(expiry) || !priceable(strike) {
            return Ok(None);
        }
        let greeks = pricing::greeks(&self.context, strike, expiry, vol.0)?;
        Ok(Some(PointGreeks {
            expiry,
            strike,
            vol,
            greeks,
        }))
    }
}
