//! Build a surface from a synthetic option chain and explore it.
//!
//! Demonstrates the full workflow:
//!   1. Load a configuration (JSON, missing fields take defaults)
//!   2. Run raw quotes through the pipeline
//!   3. Inspect drop counts and grid coverage
//!   4. Query vol and Greeks at points on both strike axes
//!   5. Take a snapshot for persistence
//!
//! Run with:
//! `RUST_LOG=ivsurf=debug cargo run --example surface_explorer --features logging`

use chrono::{Days, NaiveDate};
use ivsurf::pricing::call_price;
use ivsurf::{RawQuote, StrikeAxis, SurfaceConfig, SurfacePipeline};
use tracing_subscriber::EnvFilter;

const SPOT: f64 = 450.0;

/// Equity-style skew that flattens with expiry.
fn market_vol(expiry: f64, strike: f64) -> f64 {
    let m = strike / SPOT - 1.0;
    0.18 - 0.15 * m / (1.0 + expiry) + 0.3 * m * m
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // ---------------------------------------------------------------
    // 1. Configuration
    // ---------------------------------------------------------------

    let config: SurfaceConfig = serde_json::from_str(r#"{ "resolution": 25 }"#)?;
    let pipeline = SurfacePipeline::new(config.clone())?;
    let ctx = config.market_context(SPOT)?;
    let today = NaiveDate::from_ymd_opt(2025, 3, 3).ok_or("bad date")?;

    // ---------------------------------------------------------------
    // 2. Synthetic chain: 6 expirations x 15 strikes, 2% wide
    // ---------------------------------------------------------------

    let mut chain = Vec::new();
    for days in [5u64, 21, 49, 91, 182, 365] {
        let expiry = days as f64 / 365.0;
        for i in 0..15 {
            let strike = 340.0 + 15.0 * i as f64;
            let mid = call_price(&ctx, strike, expiry, market_vol(expiry, strike))?;
            chain.push(RawQuote::new(
                today + Days::new(days),
                strike,
                mid * 0.99,
                mid * 1.01,
            ));
        }
    }

    let out = pipeline.run(SPOT, today, &chain)?;

    // ---------------------------------------------------------------
    // 3. What survived
    // ---------------------------------------------------------------

    let stats = out.stats;
    println!("Raw quotes:            {}", stats.n_raw);
    println!("  invalid:             {}", stats.filtered.invalid);
    println!("  too close to expiry: {}", stats.filtered.too_close_to_expiry);
    println!("  outside strike band: {}", stats.filtered.outside_strike_window);
    println!("  no implied vol:      {}", stats.dropped.total());
    println!("Solved:                {}", out.n_solved);

    let grid = out.surface.grid();
    println!(
        "\nGrid {}x{} over T in [{:.3}, {:.3}], K in [{:.1}, {:.1}], {:.0}% filled",
        grid.times().len(),
        grid.strikes().len(),
        grid.times()[0],
        grid.times()[grid.times().len() - 1],
        grid.strikes()[0],
        grid.strikes()[grid.strikes().len() - 1],
        grid.coverage() * 100.0
    );

    // ---------------------------------------------------------------
    // 4. Point queries
    // ---------------------------------------------------------------

    println!(
        "\n{:>6} {:>8} {:>8} {:>8} {:>8} {:>10} {:>8}",
        "T", "K", "vol", "delta", "gamma", "theta", "vega"
    );
    println!("{}", "-".repeat(62));
    for (t, k) in [(0.1, 420.0), (0.25, 450.0), (0.5, 480.0), (0.9, 500.0), (1.5, 450.0)] {
        match out.surface.greeks_at(t, k)? {
            Some(pg) => println!(
                "{t:>6.2} {k:>8.1} {:>8.4} {:>8.4} {:>8.5} {:>10.3} {:>8.3}",
                pg.vol.0, pg.greeks.delta, pg.greeks.gamma, pg.greeks.theta, pg.greeks.vega
            ),
            None => println!("{t:>6.2} {k:>8.1}  no data"),
        }
    }

    let by_moneyness = SurfacePipeline::new(SurfaceConfig {
        strike_axis: StrikeAxis::Moneyness,
        ..config
    })?
    .run(SPOT, today, &chain)?;
    if let Some(pg) = by_moneyness.surface.greeks_at(0.25, 1.0)? {
        println!(
            "\nMoneyness 1.00 at T=0.25 -> strike {:.1}, vol {:.4}, delta {:.4}",
            pg.strike, pg.vol.0, pg.greeks.delta
        );
    }

    // ---------------------------------------------------------------
    // 5. Snapshot
    // ---------------------------------------------------------------

    let snapshot = out.surface.snapshot();
    let json = serde_json::to_string(&snapshot)?;
    println!("\nSnapshot at {}: {} bytes of JSON", snapshot.taken_at, json.len());

    Ok(())
}
