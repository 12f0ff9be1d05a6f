//! End-to-end batch: raw quotes → filtered quotes → implied vols → surface.
//!
//! ```
//! use chrono::NaiveDate;
//! use ivsurf::{RawQuote, SurfaceConfig, SurfacePipeline};
//! use ivsurf::pricing::call_price;
//!
//! let config = SurfaceConfig { resolution: 10, ..SurfaceConfig::default() };
//! let pipeline = SurfacePipeline::new(config)?;
//! let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
//! let ctx = pipeline.config().market_context(450.0)?;
//!
//! let mut quotes = Vec::new();
//! for days in [30, 91, 182] {
//!     let expiration = today + chrono::Days::new(days);
//!     for strike in [400.0, 450.0, 500.0] {
//!         let mid = call_price(&ctx, strike, days as f64 / 365.0, 0.2)?;
//!         quotes.push(RawQuote::new(expiration, strike, mid - 0.05, mid + 0.05));
//!     }
//! }
//!
//! let out = pipeline.run(450.0, today, &quotes)?;
//! assert_eq!(out.n_solved, 9);
//! assert!(out.surface.vol_at(0.3, 450.0).is_some());
//! # Ok::<(), ivsurf::IvSurfError>(())
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SurfaceConfig;
use crate::error::{self, IvSurfError};
use crate::implied::{DropCounts, ImpliedVolSolver};
use crate::quote::{FilterCounts, QuoteFilter, RawQuote};
use crate::surface::{SurfaceBuilder, VolSurface};

/// Counts from one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Quotes received.
    pub n_raw: usize,
    /// Quotes rejected before solving.
    pub filtered: FilterCounts,
    /// Quotes without an implied vol.
    pub dropped: DropCounts,
}

/// Output of [`SurfacePipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The fitted surface.
    pub surface: VolSurface,
    /// Quotes that produced an implied vol.
    pub n_solved: usize,
    /// Filter and solver tallies.
    pub stats: RunStats,
}

/// A validated configuration ready to turn quote batches into surfaces.
#[derive(Debug, Clone)]
pub struct SurfacePipeline {
    config: SurfaceConfig,
    filter: QuoteFilter,
    builder: SurfaceBuilder,
}

impl SurfacePipeline {
    /// Validate `config` and prepare the filter and builder it describes.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if the configuration is invalid.
    pub fn new(config: SurfaceConfig) -> error::Result<Self> {
        config.validate()?;
        let filter = config.quote_filter()?;
        let builder = config.surface_builder();
        Ok(Self {
            config,
            filter,
            builder,
        })
    }

    /// The configuration this pipeline was built from.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Run one batch.
    ///
    /// Quotes failing a filter or without an implied vol are dropped and
    /// counted in [`RunStats`]; the batch itself fails only when too little
    /// survives to build a surface.
    ///
    /// # Errors
    /// - [`IvSurfError::InvalidInput`] if `spot` is not positive and finite.
    /// - [`IvSurfError::InsufficientData`] if no quote survives filtering or
    ///   solving, or the survivors cannot span a surface.
    pub fn run(
        &self,
        spot: f64,
        valuation_date: NaiveDate,
        raw: &[RawQuote],
    ) -> error::Result<PipelineOutput> {
        let context = self.config.market_context(spot)?;

        #[cfg(feature = "logging")]
        tracing::debug!(n_raw = raw.len(), spot, %valuation_date, "pipeline run started");

        let filtered = self.filter.apply(raw, spot, valuation_date);
        if filtered.quotes.is_empty() {
            return Err(IvSurfError::InsufficientData {
                message: format!(
                    "no quotes left after filtering {} raw quotes",
                    raw.len()
                ),
            });
        }

        let report = ImpliedVolSolver::new(context).solve_batch(&filtered.quotes)?;
        if report.points.is_empty() {
            return Err(IvSurfError::InsufficientData {
                message: format!(
                    "no implied vol solved for any of {} quotes",
                    filtered.quotes.len()
                ),
            });
        }

        let surface = self.builder.build(&context, &report.points)?;
        let stats = RunStats {
            n_raw: raw.len(),
            filtered: filtered.rejected,
            dropped: report.dropped,
        };

        #[cfg(feature = "logging")]
        tracing::info!(
            n_raw = stats.n_raw,
            n_filtered = stats.filtered.total(),
            n_dropped = stats.dropped.total(),
            n_solved = report.points.len(),
            coverage = surface.grid().coverage(),
            "pipeline run complete"
        );

        Ok(PipelineOutput {
            surface,
            n_solved: report.points.len(),
            stats,
        })
    }
}
