//! Option quotes and the filters applied before solving.
//!
//! A [`RawQuote`] is what the market-data collaborator delivers: expiration,
//! strike, bid, ask. [`OptionQuote::from_raw`] turns it into an immutable
//! quote with a mid price and an ACT/365 time to expiry, or discards it.
//! [`QuoteFilter`] then applies the configurable strike window, minimum days
//! to expiry, and optional spread limit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{self, IvSurfError};
use crate::validate::validate_positive;

/// Day count denominator for time to expiry.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// A call quote as delivered by the market-data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Strike price.
    pub strike: f64,
    /// Best bid.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
}

impl RawQuote {
    /// Quote from its four fields, unvalidated.
    pub fn new(expiration: NaiveDate, strike: f64, bid: f64, ask: f64) -> Self {
        Self {
            expiration,
            strike,
            bid,
            ask,
        }
    }
}

/// A validated call quote priced at mid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionQuote {
    expiration: NaiveDate,
    strike: f64,
    bid: f64,
    ask: f64,
    days_to_expiry: i64,
}

impl OptionQuote {
    /// Validate a raw quote against `valuation_date`.
    ///
    /// Returns `None` (the quote is discarded) when bid or ask is not
    /// positive and finite, the strike is not positive, or the expiration is
    /// not after the valuation date.
    pub fn from_raw(raw: &RawQuote, valuation_date: NaiveDate) -> Option<Self> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(raw.bid) || !positive(raw.ask) || !positive(raw.strike) {
            return None;
        }
        let days_to_expiry = (raw.expiration - valuation_date).num_days();
        if days_to_expiry <= 0 {
            return None;
        }
        Some(Self {
            expiration: raw.expiration,
            strike: raw.strike,
            bid: raw.bid,
            ask: raw.ask,
            days_to_expiry,
        })
    }

    /// Expiration date.
    pub fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Strike price.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Best bid.
    pub fn bid(&self) -> f64 {
        self.bid
    }

    /// Best ask.
    pub fn ask(&self) -> f64 {
        self.ask
    }

    /// Average of bid and ask.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Whole calendar days from valuation to expiration (always > 0).
    pub fn days_to_expiry(&self) -> i64 {
        self.days_to_expiry
    }

    /// Time to expiry in years, ACT/365.
    pub fn time_to_expiry(&self) -> f64 {
        self.days_to_expiry as f64 / DAYS_PER_YEAR
    }

    /// Bid-ask spread relative to mid.
    pub fn relative_spread(&self) -> f64 {
        (self.ask - self.bid) / self.mid()
    }
}

/// Number of raw quotes rejected, by filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterCounts {
    /// Non-positive bid/ask/strike or expired.
    pub invalid: usize,
    /// Strike outside the percent-of-spot window.
    pub outside_strike_window: usize,
    /// Fewer days to expiration than the minimum.
    pub too_close_to_expiry: usize,
    /// Relative spread above the configured limit.
    pub spread_too_wide: usize,
}

impl FilterCounts {
    /// Total number of rejected quotes.
    pub fn total(&self) -> usize {
        self.invalid + self.outside_strike_window + self.too_close_to_expiry + self.spread_too_wide
    }
}

/// Quotes that passed every filter, plus rejection counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredQuotes {
    /// Surviving quotes, in input order.
    pub quotes: Vec<OptionQuote>,
    /// Rejections by filter.
    pub rejected: FilterCounts,
}

/// Pre-solve quote filter.
///
/// The strike window is inclusive and expressed in percent of spot, so the
/// defaults keep strikes in `[0.8·S, 1.2·S]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuoteFilter {
    min_strike_pct: f64,
    max_strike_pct: f64,
    min_days_to_expiry: i64,
    max_relative_spread: Option<f64>,
}

impl QuoteFilter {
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if the percentages are not
    /// positive, `min_strike_pct >= max_strike_pct`, `min_days_to_expiry < 1`,
    /// or the spread limit is not positive.
    pub fn new(
        min_strike_pct: f64,
        max_strike_pct: f64,
        min_days_to_expiry: i64,
        max_relative_spread: Option<f64>,
    ) -> error::Result<Self> {
        validate_positive(min_strike_pct, "min_strike_pct")?;
        validate_positive(max_strike_pct, "max_strike_pct")?;
        if min_strike_pct >= max_strike_pct {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "empty strike window: {min_strike_pct}% >= {max_strike_pct}%"
                ),
            });
        }
        if min_days_to_expiry < 1 {
            return Err(IvSurfError::InvalidInput {
                message: format!("min_days_to_expiry must be at least 1, got {min_days_to_expiry}"),
            });
        }
        if let Some(spread) = max_relative_spread {
            validate_positive(spread, "max_relative_spread")?;
        }
        Ok(Self {
            min_strike_pct,
            max_strike_pct,
            min_days_to_expiry,
            max_relative_spread,
        })
    }

    /// Strike bounds `(lo, hi)` for a spot price.
    pub fn strike_bounds(&self, spot: f64) -> (f64, f64) {
        (
            spot * self.min_strike_pct / 100.0,
            spot * self.max_strike_pct / 100.0,
        )
    }

    /// Validate and filter raw quotes.
    pub fn apply(&self, raw: &[RawQuote], spot: f64, valuation_date: NaiveDate) -> FilteredQuotes {
        let (lo, hi) = self.strike_bounds(spot);
        let mut rejected = FilterCounts::default();
        let mut quotes = Vec::with_capacity(raw.len());

        for r in raw {
            let Some(quote) = OptionQuote::from_raw(r, valuation_date) else {
                rejected.invalid += 1;
                continue;
            };
            if quote.days_to_expiry() < self.min_days_to_expiry {
                rejected.too_close_to_expiry += 1;
                continue;
            }
            if quote.strike() < lo || quote.strike() > hi {
                rejected.outside_strike_window += 1;
                continue;
            }
            if let Some(max_spread) = self.max_relative_spread
                && quote.relative_spread() > max_spread
            {
                rejected.spread_too_wide += 1;
                continue;
            }
            quotes.push(quote);
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_raw = raw.len(),
            n_kept = quotes.len(),
            invalid = rejected.invalid,
            outside_strike_window = rejected.outside_strike_window,
            too_close_to_expiry = rejected.too_close_to_expiry,
            spread_too_wide = rejected.spread_too_wide,
            "quote filter applied"
        );

        FilteredQuotes { quotes, rejected }
    }
}

impl Default for QuoteFilter {
    fn default() -> Self {
        Self {
            min_strike_pct: 80.0,
            max_strike_pct: 120.0,
            min_days_to_expiry: 8,
            max_relative_spread: None,
        }
    }
}
