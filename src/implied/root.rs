//! Bracketing root finders.
//!
//! Both finders need only a continuous objective with a sign change across
//! `[lo, hi]`. They never evaluate outside the bracket, never return a value
//! outside it, and stop after a fixed number of iterations.

use std::fmt;

use thiserror::Error;

/// Failure modes of a bracketing root search.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RootError {
    /// `f(lo)` and `f(hi)` have the same sign, or one is not finite.
    #[error("no sign change on [{lo}, {hi}]: f(lo)={f_lo}, f(hi)={f_hi}")]
    NoBracket {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },
    /// The iteration limit was reached before the tolerance was met.
    #[error("no convergence after {iterations} iterations")]
    NoConvergence { iterations: usize },
    /// The objective produced a non-finite value inside the bracket.
    #[error("objective is not finite at x={x}")]
    NonFinite { x: f64 },
}

/// A bracketing root-finding algorithm.
///
/// Implementations are swappable without touching the implied vol solver.
pub trait RootFinder: Send + Sync + fmt::Debug {
    /// Find `x` in `[lo, hi]` with `f(x) = 0`.
    ///
    /// # Errors
    /// [`RootError::NoBracket`] if the endpoints do not bracket a root,
    /// [`RootError::NoConvergence`] if the iteration limit is hit.
    fn find_root<F>(&self, f: F, lo: f64, hi: f64) -> Result<f64, RootError>
    where
        F: Fn(f64) -> f64;
}

/// Outcome of checking the endpoints of a bracket.
enum Bracket {
    /// Opposite signs: `(f(lo), f(hi))`.
    SignChange(f64, f64),
    /// An endpoint is an exact root.
    Root(f64),
}

/// Evaluate both endpoints and check for a sign change.
fn bracket<F>(f: &F, lo: f64, hi: f64) -> Result<Bracket, RootError>
where
    F: Fn(f64) -> f64,
{
    let f_lo = f(lo);
    let f_hi = f(hi);
    let no_bracket = RootError::NoBracket { lo, hi, f_lo, f_hi };
    if !f_lo.is_finite() || !f_hi.is_finite() || !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(no_bracket);
    }
    if f_lo == 0.0 {
        return Ok(Bracket::Root(lo));
    }
    if f_hi == 0.0 {
        return Ok(Bracket::Root(hi));
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(no_bracket);
    }
    Ok(Bracket::SignChange(f_lo, f_hi))
}

/// Brent's method: inverse quadratic interpolation and secant steps,
/// falling back to bisection whenever they would leave the bracket or
/// shrink it too slowly.
///
/// # Examples
/// ```
/// use ivsurf::implied::{Brent, RootFinder};
///
/// let root = Brent::default().find_root(|x| x * x - 2.0, 0.0, 2.0)?;
/// assert!((root - 2f64.sqrt()).abs() < 1e-10);
/// # Ok::<(), ivsurf::implied::RootError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brent {
    /// Absolute x tolerance.
    pub xtol: f64,
    /// Relative x tolerance.
    pub rtol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

impl RootFinder for Brent {
    fn find_root<F>(&self, f: F, lo: f64, hi: f64) -> Result<f64, RootError>
    where
        F: Fn(f64) -> f64,
    {
        let (f_lo, f_hi) = match bracket(&f, lo, hi)? {
            Bracket::SignChange(f_lo, f_hi) => (f_lo, f_hi),
            Bracket::Root(root) => return Ok(root),
        };

        // `cur` is the best estimate, `blk` the contrapoint with opposite sign.
        let (mut x_pre, mut x_cur) = (lo, hi);
        let (mut f_pre, mut f_cur) = (f_lo, f_hi);
        let (mut x_blk, mut f_blk) = (0.0, 0.0);
        let (mut s_pre, mut s_cur) = (0.0, 0.0);

        for _ in 0..self.max_iter {
            if f_pre != 0.0 && f_cur != 0.0 && f_pre.signum() != f_cur.signum() {
                x_blk = x_pre;
                f_blk = f_pre;
                s_pre = x_cur - x_pre;
                s_cur = s_pre;
            }
            if f_blk.abs() < f_cur.abs() {
                x_pre = x_cur;
                x_cur = x_blk;
                x_blk = x_pre;
                f_pre = f_cur;
                f_cur = f_blk;
                f_blk = f_pre;
            }

            let delta = (self.xtol + self.rtol * x_cur.abs()) / 2.0;
            let s_bis = (x_blk - x_cur) / 2.0;
            if f_cur == 0.0 || s_bis.abs() < delta {
                return Ok(x_cur.clamp(lo, hi));
            }

            if s_pre.abs() > delta && f_cur.abs() < f_pre.abs() {
                let s_try = if x_pre == x_blk {
                    // secant
                    -f_cur * (x_cur - x_pre) / (f_cur - f_pre)
                } else {
                    // inverse quadratic
                    let d_pre = (f_pre - f_cur) / (x_pre - x_cur);
                    let d_blk = (f_blk - f_cur) / (x_blk - x_cur);
                    -f_cur * (f_blk * d_blk - f_pre * d_pre) / (d_blk * d_pre * (f_blk - f_pre))
                };
                if 2.0 * s_try.abs() < s_pre.abs().min(3.0 * s_bis.abs() - delta) {
                    s_pre = s_cur;
                    s_cur = s_try;
                } else {
                    s_pre = s_bis;
                    s_cur = s_bis;
                }
            } else {
                s_pre = s_bis;
                s_cur = s_bis;
            }

            x_pre = x_cur;
            f_pre = f_cur;
            if s_cur.abs() > delta {
                x_cur += s_cur;
            } else {
                x_cur += if s_bis > 0.0 { delta } else { -delta };
            }
            x_cur = x_cur.clamp(lo, hi);

            f_cur = f(x_cur);
            if !f_cur.is_finite() {
                return Err(RootError::NonFinite { x: x_cur });
            }
        }

        Err(RootError::NoConvergence {
            iterations: self.max_iter,
        })
    }
}

/// Plain bisection. Slower than [`Brent`] but with a guaranteed halving of
/// the bracket at every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
    /// Stop when the bracket is narrower than this.
    pub xtol: f64,
    /// Maximum number of halvings.
    pub max_iter: usize,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            xtol: 1e-12,
            max_iter: 200,
        }
    }
}

impl RootFinder for Bisection {
    fn find_root<F>(&self, f: F, lo: f64, hi: f64) -> Result<f64, RootError>
    where
        F: Fn(f64) -> f64,
    {
        let f_lo = match bracket(&f, lo, hi)? {
            Bracket::SignChange(f_lo, _) => f_lo,
            Bracket::Root(root) => return Ok(root),
        };

        let (mut a, mut b) = (lo, hi);
        let lo_sign = f_lo.signum();
        for _ in 0..self.max_iter {
            let mid = 0.5 * (a + b);
            if b - a < self.xtol {
                return Ok(mid);
            }
            let f_mid = f(mid);
            if !f_mid.is_finite() {
                return Err(RootError::NonFinite { x: mid });
            }
            if f_mid == 0.0 {
                return Ok(mid);
            }
            if f_mid.signum() == lo_sign {
                a = mid;
            } else {
                b = mid;
            }
        }

        Err(RootError::NoConvergence {
            iterations: self.max_iter,
        })
    }
}
