//! Closed form vs numeric cross-checks

use crate::models::{ContinuousPurchase, DiscretePurchase, ExponentialContinuousGda, ExponentialDiscreteGda, LinearEquivalentGda};
use anyhow::{anyhow, ensure, Result};
use serde::Serialize;

/// Verification report comparing a closed-form price with a numeric evaluation
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Number of summation terms or integration panels
    pub steps: u64,
    /// Numerically accumulated price
    pub numeric: f64,
    /// Closed-form price
    pub closed: f64,
    /// Relative error between the two
    pub rel_err: f64,
    /// Whether the per-unit price never decreases across the purchase
    pub monotone_ok: bool,
}

/// Upper bound on summation terms or integration panels
pub const MAX_VERIFY_STEPS: u64 = 10_000_000;

fn rel_err(numeric: f64, closed: f64) -> f64 {
    if closed.abs() > 0.0 { (numeric - closed).abs() / closed.abs() } else { numeric.abs() }
}

/// Kahan–Babuška accumulator
#[derive(Default)]
struct CompensatedSum { sum: f64, comp: f64 }
impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() { self.comp += (self.sum - t) + x; } else { self.comp += (x - t) + self.sum; }
        self.sum = t;
    }
    fn total(&self) -> f64 { self.sum + self.comp }
}

/// Verify Σ_{i<q} unit_price(i) against the geometric closed form. `quantity` must be integral.
pub fn verify_discrete(m: &ExponentialDiscreteGda, req: &DiscretePurchase) -> Result<Report> {
    ensure!(
        req.quantity.fract() == 0.0,
        "discrete verification needs an integral quantity (got {})",
        req.quantity
    );
    ensure!(
        req.quantity <= MAX_VERIFY_STEPS as f64,
        "discrete verification is limited to {} units (quantity {})",
        MAX_VERIFY_STEPS,
        req.quantity
    );
    let steps = req.quantity as u64;
    let mut acc = CompensatedSum::default();
    let mut prev = f64::NEG_INFINITY;
    let mut monotone_ok = true;
    for i in 0..steps {
        let p = m.unit_price(req, i);
        if p.is_nan() || p < 0.0 { return Err(anyhow!("unit price {} is {}", i, p)); }
        if p <= prev { monotone_ok = false; }
        prev = p;
        acc.add(p);
    }
    let numeric = acc.total();
    let closed = m.cumulative_price(req)?.value();
    Ok(Report { steps, numeric, closed, rel_err: rel_err(numeric, closed), monotone_ok })
}

/// Composite Simpson over [0, q] of `marginal`, checking that it never decreases.
fn simpson<F: Fn(f64) -> f64>(marginal: F, quantity: f64, steps: u64) -> Result<(f64, bool)> {
    ensure!(steps > 0, "need at least one integration panel");
    ensure!(steps <= MAX_VERIFY_STEPS, "verification is limited to {} panels (got {})", MAX_VERIFY_STEPS, steps);
    let n = 2 * steps;
    let h = quantity / n as f64;
    let mut acc = CompensatedSum::default();
    let mut prev = f64::NEG_INFINITY;
    let mut monotone_ok = true;
    for j in 0..=n {
        let y = marginal(j as f64 * h);
        if y.is_nan() || y < 0.0 { return Err(anyhow!("marginal price at x={} is {}", j as f64 * h, y)); }
        if y < prev { monotone_ok = false; }
        prev = y;
        let w = if j == 0 || j == n { 1.0 } else if j % 2 == 1 { 4.0 } else { 2.0 };
        acc.add(w * y);
    }
    Ok((acc.total() * h / 3.0, monotone_ok))
}

/// Verify the continuous closed form against Simpson integration of the marginal price.
pub fn verify_continuous(m: &ExponentialContinuousGda, req: &ContinuousPurchase, steps: u64) -> Result<Report> {
    let closed = m.cumulative_price(req)?.value();
    let (numeric, monotone_ok) = simpson(|x| m.marginal_price(req.age_last_auction, x), req.quantity, steps)?;
    Ok(Report { steps, numeric, closed, rel_err: rel_err(numeric, closed), monotone_ok })
}

/// Verify the reciprocal closed form against Simpson integration of the marginal price.
pub fn verify_linear(m: &LinearEquivalentGda, req: &ContinuousPurchase, steps: u64) -> Result<Report> {
    let closed = m.cumulative_price(req)?.value();
    let (numeric, monotone_ok) = simpson(|x| m.marginal_price(req.age_last_auction, x), req.quantity, steps)?;
    Ok(Report { steps, numeric, closed, rel_err: rel_err(numeric, closed), monotone_ok })
}
