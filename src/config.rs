//! Run configuration.
//!
//! [`SurfaceConfig`] gathers every knob of a surface run in one
//! serde-deserializable struct. Missing fields take their defaults, so an
//! empty JSON object is a valid configuration.
//!
//! ```
//! use ivsurf::SurfaceConfig;
//!
//! let config: SurfaceConfig = serde_json::from_str(r#"{ "resolution": 25 }"#)?;
//! assert_eq!(config.resolution, 25);
//! assert_eq!(config.risk_free_rate, 0.015);
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::conventions::StrikeAxis;
use crate::error::{self, IvSurfError};
use crate::pricing::MarketContext;
use crate::quote::QuoteFilter;
use crate::surface::builder::{DEFAULT_RESOLUTION, SurfaceBuilder};
use crate::validate::validate_finite;

/// Settings for a surface run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SurfaceConfig {
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Lowest strike kept, in percent of spot.
    pub min_strike_pct: f64,
    /// Highest strike kept, in percent of spot.
    pub max_strike_pct: f64,
    /// Fewest calendar days to expiration a quote may have (inclusive).
    pub min_days_to_expiry: i64,
    /// Widest (ask − bid) / mid a quote may have. `None` disables the check.
    pub max_relative_spread: Option<f64>,
    /// Strike coordinate for the grid and queries.
    pub strike_axis: StrikeAxis,
    /// Number of grid points per axis.
    pub resolution: usize,
    /// Rescale both axes to [0, 1] before triangulating.
    pub rescale: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.015,
            dividend_yield: 0.013,
            min_strike_pct: 80.0,
            max_strike_pct: 120.0,
            min_days_to_expiry: 8,
            max_relative_spread: None,
            strike_axis: StrikeAxis::Strike,
            resolution: DEFAULT_RESOLUTION,
            rescale: false,
        }
    }
}

impl SurfaceConfig {
    /// Check every field.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] naming the first bad field.
    pub fn validate(&self) -> error::Result<()> {
        validate_finite(self.risk_free_rate, "risk_free_rate")?;
        validate_finite(self.dividend_yield, "dividend_yield")?;
        self.quote_filter()?;
        if self.resolution < 2 {
            return Err(IvSurfError::InvalidInput {
                message: format!("resolution must be at least 2, got {}", self.resolution),
            });
        }
        Ok(())
    }

    /// Market context for a given spot under this configuration's rates.
    ///
    /// # Errors
    /// Same as [`MarketContext::new`].
    pub fn market_context(&self, spot: f64) -> error::Result<MarketContext> {
        MarketContext::new(spot, self.risk_free_rate, self.dividend_yield)
    }

    /// The quote filter described by this configuration.
    ///
    /// # Errors
    /// Same as [`QuoteFilter::new`].
    pub fn quote_filter(&self) -> error::Result<QuoteFilter> {
        QuoteFilter::new(
            self.min_strike_pct,
            self.max_strike_pct,
            self.min_days_to_expiry,
            self.max_relative_spread,
        )
    }

    /// A surface builder with this configuration's axis, resolution, and
    /// rescale switch.
    pub fn surface_builder(&self) -> SurfaceBuilder {
        SurfaceBuilder::new()
            .resolution(self.resolution)
            .axis(self.strike_axis)
            .rescale(self.rescale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = SurfaceConfig::default();
        assert_eq!(c.risk_free_rate, 0.015);
        assert_eq!(c.dividend_yield, 0.013);
        assert_eq!(c.min_strike_pct, 80.0);
        assert_eq!(c.max_strike_pct, 120.0);
        assert_eq!(c.min_days_to_expiry, 8);
        assert_eq!(c.max_relative_spread, None);
        assert_eq!(c.strike_axis, StrikeAxis::Strike);
        assert_eq!(c.resolution, 50);
        assert!(!c.rescale);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        let c: SurfaceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, SurfaceConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let c: SurfaceConfig = serde_json::from_str(
            r#"{ "strike_axis": "moneyness", "max_relative_spread": 0.4, "rescale": true }"#,
        )
        .unwrap();
        assert_eq!(c.strike_axis, StrikeAxis::Moneyness);
        assert_eq!(c.max_relative_spread, Some(0.4));
        assert!(c.rescale);
        assert_eq!(c.resolution, 50);
    }

    #[test]
    fn json_round_trip() {
        let c = SurfaceConfig {
            resolution: 20,
            ..SurfaceConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: SurfaceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let bad = [
            SurfaceConfig {
                resolution: 1,
                ..SurfaceConfig::default()
            },
            SurfaceConfig {
                min_strike_pct: 130.0,
                ..SurfaceConfig::default()
            },
            SurfaceConfig {
                risk_free_rate: f64::NAN,
                ..SurfaceConfig::default()
            },
            SurfaceConfig {
                min_days_to_expiry: 0,
                ..SurfaceConfig::default()
            },
        ];
        for c in bad {
            assert!(matches!(c.validate(), Err(IvSurfError::InvalidInput { .. })));
        }
    }

    #[test]
    fn market_context_uses_configured_rates() {
        let ctx = SurfaceConfig::default().market_context(450.0).unwrap();
        assert_eq!(ctx.spot(), 450.0);
        assert_eq!(ctx.rate(), 0.015);
        assert_eq!(ctx.dividend_yield(), 0.013);
    }
}
