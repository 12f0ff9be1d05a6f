//! Integration tests for the ivsurf pipeline.
//!
//! Exercises the full path from raw quotes through filtering, implied vol
//! extraction, surface construction, point queries, and snapshots.

use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use ivsurf::pricing::{call_price, greeks};
use ivsurf::{
    ImpliedVolPoint, ImpliedVolSolver, IvSurfError, MarketContext, RawQuote, StrikeAxis,
    SurfaceBuilder, SurfaceConfig, SurfacePipeline,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SPOT: f64 = 450.0;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn spy_context() -> MarketContext {
    MarketContext::new(SPOT, 0.015, 0.013).unwrap()
}

/// Skewed smile that flattens with expiry: higher vol on low strikes.
fn skew_vol(expiry: f64, strike: f64) -> f64 {
    let m = strike / SPOT - 1.0;
    0.18 - 0.15 * m / (1.0 + expiry) + 0.3 * m * m
}

/// SPY-like chain: 5 expirations × 9 strikes priced off `skew_vol`, with a
/// 1% bid/ask spread around the model price.
fn spy_chain(ctx: &MarketContext) -> Vec<RawQuote> {
    let mut quotes = Vec::new();
    for days in [21u64, 49, 91, 182, 365] {
        let expiry = days as f64 / 365.0;
        for i in 0..9 {
            let strike = 380.0 + 17.5 * i as f64;
            let mid = call_price(ctx, strike, expiry, skew_vol(expiry, strike)).unwrap();
            let half = 0.005 * mid;
            quotes.push(RawQuote::new(
                today() + Days::new(days),
                strike,
                mid - half,
                mid + half,
            ));
        }
    }
    quotes
}

// ---------------------------------------------------------------------------
// Test 1: Pricing and solver scenario
// ---------------------------------------------------------------------------

#[test]
fn six_month_atm_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let price = call_price(&ctx, 450.0, 0.5, 0.20)?;
    assert_abs_diff_eq!(price, 25.4145, epsilon = 1e-4);

    let vol = ImpliedVolSolver::new(ctx).solve(price, 450.0, 0.5)?;
    assert_abs_diff_eq!(vol.0, 0.20, epsilon = 1e-4);

    let g = greeks(&ctx, 450.0, 0.5, vol.0)?;
    assert!(g.delta > 0.0 && g.delta < (-0.013_f64 * 0.5).exp());
    assert!(g.vega > 0.0);
    Ok(())
}

// ---------------------------------------------------------------------------
// Test 2: End-to-end pipeline
// ---------------------------------------------------------------------------

#[test]
fn pipeline_recovers_generating_smile() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let pipeline = SurfacePipeline::new(SurfaceConfig::default())?;
    let out = pipeline.run(SPOT, today(), &spy_chain(&ctx))?;

    assert_eq!(out.n_solved, 45);
    assert_eq!(out.stats.dropped.total(), 0);

    // exact at a quoted node
    let expiry = 91.0 / 365.0;
    let v = out.surface.vol_at(expiry, 450.0).ok_or("missing vol")?;
    assert_abs_diff_eq!(v.0, skew_vol(expiry, 450.0), epsilon = 1e-6);

    // close between nodes
    let v = out.surface.vol_at(0.4, 440.0).ok_or("missing vol")?;
    assert_abs_diff_eq!(v.0, skew_vol(0.4, 440.0), epsilon = 5e-3);
    Ok(())
}

#[test]
fn pipeline_grid_has_configured_shape() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let config = SurfaceConfig {
        resolution: 30,
        ..SurfaceConfig::default()
    };
    let out = SurfacePipeline::new(config)?.run(SPOT, today(), &spy_chain(&ctx))?;
    let grid = out.surface.grid();

    assert_eq!(grid.times().len(), 30);
    assert_eq!(grid.strikes().len(), 30);
    assert!(grid.times().windows(2).all(|w| w[1] > w[0]));
    assert!(grid.strikes().windows(2).all(|w| w[1] > w[0]));
    assert_abs_diff_eq!(grid.times()[0], 21.0 / 365.0, epsilon = 1e-15);
    assert_abs_diff_eq!(grid.strikes()[29], 520.0, epsilon = 1e-12);
    for row in grid.vols() {
        for v in row.iter().flatten() {
            assert!(v.is_finite() && *v > 0.0);
        }
    }
    Ok(())
}

#[test]
fn strike_window_drops_wings() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let config = SurfaceConfig {
        min_strike_pct: 90.0,
        max_strike_pct: 110.0,
        ..SurfaceConfig::default()
    };
    let out = SurfacePipeline::new(config)?.run(SPOT, today(), &spy_chain(&ctx))?;
    // strikes 380, 397.5 and 502.5, 520 fall outside [405, 495]
    assert_eq!(out.stats.filtered.outside_strike_window, 20);
    assert_eq!(out.n_solved, 25);
    Ok(())
}

// ---------------------------------------------------------------------------
// Test 3: Insufficient data
// ---------------------------------------------------------------------------

#[test]
fn five_points_one_expiry_is_insufficient() {
    let points: Vec<ImpliedVolPoint> = (0..5)
        .map(|i| ImpliedVolPoint {
            expiry: 0.25,
            strike: 420.0 + 15.0 * i as f64,
            vol: 0.2,
        })
        .collect();
    let result = SurfaceBuilder::new().build(&spy_context(), &points);
    assert!(matches!(result, Err(IvSurfError::InsufficientData { .. })));
}

#[test]
fn single_expiry_chain_is_insufficient() {
    let ctx = spy_context();
    let chain: Vec<RawQuote> = spy_chain(&ctx)
        .into_iter()
        .filter(|q| q.expiration == today() + Days::new(91))
        .collect();
    let result = SurfacePipeline::new(SurfaceConfig::default())
        .unwrap()
        .run(SPOT, today(), &chain);
    assert!(matches!(result, Err(IvSurfError::InsufficientData { .. })));
}

// ---------------------------------------------------------------------------
// Test 4: Queries
// ---------------------------------------------------------------------------

#[test]
fn query_outside_hull_is_no_data() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let out = SurfacePipeline::new(SurfaceConfig::default())?.run(SPOT, today(), &spy_chain(&ctx))?;
    assert!(out.surface.vol_at(2.0, 450.0).is_none());
    assert!(out.surface.vol_at(0.5, 300.0).is_none());
    assert!(out.surface.greeks_at(0.01, 450.0)?.is_none());
    Ok(())
}

#[test]
fn moneyness_and_strike_axes_agree() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let chain = spy_chain(&ctx);
    let by_strike = SurfacePipeline::new(SurfaceConfig::default())?.run(SPOT, today(), &chain)?;
    let by_moneyness = SurfacePipeline::new(SurfaceConfig {
        strike_axis: StrikeAxis::Moneyness,
        ..SurfaceConfig::default()
    })?
    .run(SPOT, today(), &chain)?;

    let expiry = 182.0 / 365.0;
    let a = by_strike.surface.greeks_at(expiry, 467.5)?.ok_or("missing")?;
    let b = by_moneyness
        .surface
        .greeks_at(expiry, 467.5 / SPOT)?
        .ok_or("missing")?;
    assert_abs_diff_eq!(b.strike, 467.5, epsilon = 1e-9);
    assert_abs_diff_eq!(a.vol.0, b.vol.0, epsilon = 1e-9);
    assert_abs_diff_eq!(a.greeks.delta, b.greeks.delta, epsilon = 1e-8);
    assert_abs_diff_eq!(a.greeks.vega, b.greeks.vega, epsilon = 1e-6);
    Ok(())
}

#[test]
fn rebuilding_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let mut chain = spy_chain(&ctx);
    let pipeline = SurfacePipeline::new(SurfaceConfig::default())?;
    let first = pipeline.run(SPOT, today(), &chain)?;
    chain.reverse();
    let second = pipeline.run(SPOT, today(), &chain)?;
    assert_eq!(first.surface.grid(), second.surface.grid());
    Ok(())
}

// ---------------------------------------------------------------------------
// Test 5: Snapshot
// ---------------------------------------------------------------------------

#[test]
fn snapshot_serializes_grid_and_timestamp() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let config = SurfaceConfig {
        resolution: 5,
        ..SurfaceConfig::default()
    };
    let out = SurfacePipeline::new(config)?.run(SPOT, today(), &spy_chain(&ctx))?;
    let at = Utc.with_ymd_and_hms(2025, 3, 3, 21, 0, 0).unwrap();
    let json = serde_json::to_value(out.surface.grid().snapshot_at(at))?;

    assert_eq!(json["taken_at"], "2025-03-03T21:00:00Z");
    assert_eq!(json["grid"]["vols"].as_array().ok_or("vols")?.len(), 5);
    assert_eq!(json["grid"]["strikes"].as_array().ok_or("strikes")?.len(), 5);
    Ok(())
}

// ---------------------------------------------------------------------------
// Test 6: Concurrent queries from multiple threads
// ---------------------------------------------------------------------------

#[test]
fn concurrent_surface_queries() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = spy_context();
    let out = SurfacePipeline::new(SurfaceConfig::default())?.run(SPOT, today(), &spy_chain(&ctx))?;
    let surface = Arc::new(out.surface);
    let expected = surface.vol_at(0.3, 450.0).ok_or("missing vol")?;

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let s = Arc::clone(&surface);
            thread::spawn(move || -> ivsurf::Result<()> {
                for j in 0..50 {
                    let k = 400.0 + i as f64 * 10.0 + j as f64;
                    if let Some(pg) = s.greeks_at(0.3, k)? {
                        assert!(pg.greeks.vega > 0.0);
                    }
                }
                assert_eq!(s.vol_at(0.3, 450.0), Some(expected));
                Ok(())
            })
        })
        .collect();

    for h in handles {
        h.join().expect("thread panicked")?;
    }
    Ok(())
}
