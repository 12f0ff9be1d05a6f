//! Coordinate conventions for the surface.
//!
//! The strike axis of a surface is either the raw strike or moneyness
//! (strike / spot). The choice is made once per surface and applied to both
//! construction and queries.

use serde::{Deserialize, Serialize};

/// Representation of the strike axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeAxis {
    /// Absolute strike price.
    #[default]
    Strike,
    /// Simple moneyness K / S.
    Moneyness,
}

impl StrikeAxis {
    /// Map a strike to this axis' coordinate.
    pub fn coordinate(self, strike: f64, spot: f64) -> f64 {
        match self {
            Self::Strike => strike,
            Self::Moneyness => moneyness(strike, spot),
        }
    }

    /// Map an axis coordinate back to a strike.
    pub fn strike(self, coordinate: f64, spot: f64) -> f64 {
        match self {
            Self::Strike => coordinate,
            Self::Moneyness => coordinate * spot,
        }
    }

    /// Human-readable axis label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Strike => "Strike Price",
            Self::Moneyness => "Moneyness",
        }
    }
}

/// Convert a strike to log-moneyness: k = ln(K / F).
pub fn log_moneyness(strike: f64, forward: f64) -> f64 {
    (strike / forward).ln()
}

/// Convert a strike to simple moneyness: m = K / S.
pub fn moneyness(strike: f64, spot: f64) -> f64 {
    strike / spot
}

/// Forward price with continuous carry: F = S · exp((r − q) · T).
pub fn forward_price(spot: f64, rate: f64, dividend_yield: f64, expiry: f64) -> f64 {
    spot * ((rate - dividend_yield) * expiry).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn moneyness_round_trips_through_axis() {
        let spot = 450.0;
        let m = StrikeAxis::Moneyness.coordinate(495.0, spot);
        assert_abs_diff_eq!(m, 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(StrikeAxis::Moneyness.strike(m, spot), 495.0, epsilon = 1e-9);
    }

    #[test]
    fn strike_axis_is_identity() {
        assert_eq!(StrikeAxis::Strike.coordinate(123.0, 99.0), 123.0);
        assert_eq!(StrikeAxis::Strike.strike(123.0, 99.0), 123.0);
    }

    #[test]
    fn forward_with_zero_carry_is_spot() {
        assert_abs_diff_eq!(forward_price(100.0, 0.02, 0.02, 3.0), 100.0, epsilon = 1e-12);
        assert!(log_moneyness(100.0, 100.0).abs() < 1e-15);
    }

    #[test]
    fn axis_deserializes_from_snake_case() {
        let axis: StrikeAxis = serde_json::from_str("\"moneyness\"").unwrap();
        assert_eq!(axis, StrikeAxis::Moneyness);
        assert_eq!(StrikeAxis::default(), StrikeAxis::Strike);
    }
}
