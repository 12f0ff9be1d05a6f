//! Extract implied volatility from call prices.
//!
//! Shows how to:
//!   - Price a call with Black-Scholes and a continuous dividend yield
//!   - Recover the implied vol with Brent's method and with bisection
//!   - See which quotes have no solution, and why
//!
//! Run with: `cargo run --example implied_vol`

use ivsurf::implied::Bisection;
use ivsurf::pricing::{call_price, greeks};
use ivsurf::{ImpliedVolSolver, IvSurfError, MarketContext};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = MarketContext::new(450.0, 0.015, 0.013)?;
    let strike = 450.0;
    let expiry = 0.5; // 6 months
    let vol = 0.20;

    // ---------------------------------------------------------------
    // 1. Price and Greeks
    // ---------------------------------------------------------------

    let price = call_price(&ctx, strike, expiry, vol)?;
    let g = greeks(&ctx, strike, expiry, vol)?;

    println!("Black-Scholes call");
    println!("  Spot:   {}", ctx.spot());
    println!("  Strike: {strike}");
    println!("  Expiry: {expiry}y");
    println!("  Vol:    {:.0}%", vol * 100.0);
    println!();
    println!("  Price: {price:.6}");
    println!("  Delta: {:.6}", g.delta);
    println!("  Gamma: {:.6}", g.gamma);
    println!("  Theta: {:.6} (per year)", g.theta);
    println!("  Vega:  {:.6} (per unit vol)", g.vega);
    println!("  Rho:   {:.6} (per unit rate)", g.rho);

    // ---------------------------------------------------------------
    // 2. Invert the price
    // ---------------------------------------------------------------

    let brent = ImpliedVolSolver::new(ctx).solve(price, strike, expiry)?;
    let bisect = ImpliedVolSolver::with_root_finder(ctx, Bisection::default())
        .solve(price, strike, expiry)?;

    println!("\nImplied vol");
    println!("  Brent:     {:.12}", brent.0);
    println!("  Bisection: {:.12}", bisect.0);
    println!("  Input:     {vol:.12}");

    // ---------------------------------------------------------------
    // 3. Scan across strikes
    // ---------------------------------------------------------------

    println!("\n--- IV extraction across strikes ---\n");
    println!("{:>8} {:>12} {:>12} {:>14}", "Strike", "Call Price", "IV", "Round-trip err");
    println!("{}", "-".repeat(50));

    let solver = ImpliedVolSolver::new(ctx);
    for k in [360.0, 405.0, 430.0, 450.0, 470.0, 495.0, 540.0] {
        let p = call_price(&ctx, k, expiry, vol)?;
        let iv = solver.solve(p, k, expiry)?;
        let err = (call_price(&ctx, k, expiry, iv.0)? - p).abs();
        println!("{k:>8.1} {p:>12.6} {:>11.8}% {err:>14.2e}", iv.0 * 100.0);
    }

    // ---------------------------------------------------------------
    // 4. Quotes without a solution
    // ---------------------------------------------------------------

    println!("\n--- Unsolvable quotes ---\n");
    for (label, p, k, t) in [
        ("below intrinsic", 40.0, 400.0, 0.5),
        ("above spot", 460.0, 450.0, 0.5),
        ("zero price", 0.0, 450.0, 0.5),
        ("expired", 10.0, 450.0, 0.0),
    ] {
        match solver.solve(p, k, t) {
            Err(IvSurfError::NoSolution { reason }) => println!("  {label:<16} -> {reason}"),
            other => println!("  {label:<16} -> unexpected {other:?}"),
        }
    }

    Ok(())
}
