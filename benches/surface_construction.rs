use std::hint::black_box;

use chrono::{Days, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use ivsurf::pricing::call_price;
use ivsurf::quote::OptionQuote;
use ivsurf::surface::LinearInterpolator;
use ivsurf::{ImpliedVolPoint, ImpliedVolSolver, MarketContext, RawQuote, SurfaceBuilder};

/// Skewed smile used to generate synthetic quotes.
fn skew_vol(spot: f64, expiry: f64, strike: f64) -> f64 {
    let m = strike / spot - 1.0;
    0.18 - 0.15 * m / (1.0 + expiry) + 0.3 * m * m
}

/// `n_expiries × n_strikes` solved points spanning 80%-120% of spot.
fn generate_points(spot: f64, n_expiries: usize, n_strikes: usize) -> Vec<ImpliedVolPoint> {
    let mut points = Vec::with_capacity(n_expiries * n_strikes);
    for i in 1..=n_expiries {
        let expiry = i as f64 * 0.1;
        for j in 0..n_strikes {
            let strike = spot * (0.8 + 0.4 * j as f64 / (n_strikes - 1) as f64);
            points.push(ImpliedVolPoint {
                expiry,
                strike,
                vol: skew_vol(spot, expiry, strike),
            });
        }
    }
    points
}

/// Quotes priced at mid off the same smile.
fn generate_quotes(ctx: &MarketContext, today: NaiveDate, n: usize) -> Vec<OptionQuote> {
    generate_points(ctx.spot(), n / 20, 20)
        .iter()
        .filter_map(|p| {
            let days = (p.expiry * 365.0).round() as u64;
            let expiry = days as f64 / 365.0;
            let mid = call_price(ctx, p.strike, expiry, p.vol).ok()?;
            let raw = RawQuote::new(today + Days::new(days), p.strike, mid * 0.99, mid * 1.01);
            OptionQuote::from_raw(&raw, today)
        })
        .collect()
}

fn implied_vol_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("implied_vol");
    let ctx = MarketContext::new(450.0, 0.015, 0.013).expect("valid market context");
    let today = NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date");
    let solver = ImpliedVolSolver::new(ctx);

    let price = call_price(&ctx, 450.0, 0.5, 0.20).expect("valid pricing input");
    group.bench_function("single_atm", |b| {
        b.iter(|| solver.solve(black_box(price), black_box(450.0), black_box(0.5)).unwrap());
    });

    // 10 expiries x 20 strikes, typical single-underlying chain
    let quotes = generate_quotes(&ctx, today, 200);
    group.bench_function("batch_200", |b| {
        b.iter(|| solver.solve_batch(black_box(&quotes)).unwrap());
    });

    group.finish();
}

fn construction_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    let ctx = MarketContext::new(450.0, 0.015, 0.013).expect("valid market context");

    let samples: Vec<(f64, f64, f64)> = generate_points(450.0, 10, 20)
        .iter()
        .map(|p| (p.expiry, p.strike, p.vol))
        .collect();
    group.bench_function("triangulate_200", |b| {
        b.iter(|| LinearInterpolator::new(black_box(&samples)).unwrap());
    });

    let points = generate_points(450.0, 10, 20);
    group.bench_function("surface_200_points_50x50", |b| {
        b.iter(|| SurfaceBuilder::new().build(black_box(&ctx), black_box(&points)).unwrap());
    });

    let dense = generate_points(450.0, 25, 40);
    group.bench_function("surface_1000_points_50x50", |b| {
        b.iter(|| SurfaceBuilder::new().build(black_box(&ctx), black_box(&dense)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, implied_vol_benchmarks, construction_benchmarks);
criterion_main!(benches);
