//! Gradual Dutch Auction pricing models
//!
//! Three independent closed forms, selected through the closed [`PricingModel`] enum:
//! - [`ExponentialDiscreteGda`]: countable units, geometric markup per unit sold
//! - [`ExponentialContinuousGda`]: supply emitted at a fixed rate, price integrated over quantity
//! - [`LinearEquivalentGda`]: reciprocal curve, for comparison with constant-product AMMs

use crate::error::{GdaError, Result};
use serde::{Deserialize, Serialize};

/// Below this `x = decay_constant · quantity / emission_rate` the continuous
/// shape factor `(1 − e^{−x})/x` switches to its Taylor expansion.
const CONTINUOUS_TAYLOR_CUTOFF: f64 = 1e-8;

/// `∏ factors · e^exponent`, redone in log space when a direct intermediate leaves the normal range.
fn scaled_exp(factors: &[f64], exponent: f64) -> f64 {
    let growth = exponent.exp();
    let direct = factors.iter().fold(growth, |acc, f| acc * f);
    if growth.is_normal() && direct.is_normal() {
        return direct;
    }
    factors.iter().fold(exponent, |acc, f| acc + f.ln()).exp()
}

fn ensure_positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 { Ok(()) }
    else { Err(GdaError::domain(format!("{name} must be finite and > 0 (got {v})"))) }
}

fn ensure_non_negative(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 { Ok(()) }
    else { Err(GdaError::domain(format!("{name} must be finite and ≥ 0 (got {v})"))) }
}

/// Total price owed for a purchase: finite and non-negative.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// The price of an empty purchase
    pub const ZERO: Price = Price(0.0);

    /// Wraps a raw evaluation, rejecting NaN and negatives (domain) and infinities (overflow).
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Err(GdaError::domain("price evaluated to NaN"));
        }
        if value == f64::INFINITY {
            return Err(GdaError::overflow("price is not representable as a finite value"));
        }
        if value < 0.0 {
            return Err(GdaError::domain(format!("price must be ≥ 0 (got {value})")));
        }
        // folds -0.0 into +0.0
        Ok(Price(value + 0.0))
    }

    /// The underlying real value
    pub fn value(self) -> f64 { self.0 }
}

/// Purchase context for the discrete variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscretePurchase {
    /// Units already sold before this purchase
    pub num_total_purchases: f64,
    /// Time elapsed since the auction started
    pub time_since_start: f64,
    /// Units requested
    pub quantity: f64,
}

impl DiscretePurchase {
    /// Checks that every field is finite and ≥ 0
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("num_total_purchases", self.num_total_purchases)?;
        ensure_non_negative("time_since_start", self.time_since_start)?;
        ensure_non_negative("quantity", self.quantity)
    }
}

/// Purchase context for the continuous and linear-equivalent variants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousPurchase {
    /// Time since the reference auction event
    pub age_last_auction: f64,
    /// Units requested
    pub quantity: f64,
}

impl ContinuousPurchase {
    /// Checks that every field is finite and ≥ 0
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("age_last_auction", self.age_last_auction)?;
        ensure_non_negative("quantity", self.quantity)
    }
}

/// A purchase request in the shape its variant expects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseRequest {
    /// Request for [`ExponentialDiscreteGda`]
    Discrete(DiscretePurchase),
    /// Request for [`ExponentialContinuousGda`] and [`LinearEquivalentGda`]
    Continuous(ContinuousPurchase),
}

impl PurchaseRequest {
    /// Units requested
    pub fn quantity(&self) -> f64 {
        match self {
            PurchaseRequest::Discrete(r) => r.quantity,
            PurchaseRequest::Continuous(r) => r.quantity,
        }
    }

    /// The same request with a different quantity
    pub fn with_quantity(&self, quantity: f64) -> Self {
        match *self {
            PurchaseRequest::Discrete(r) => PurchaseRequest::Discrete(DiscretePurchase { quantity, ..r }),
            PurchaseRequest::Continuous(r) => PurchaseRequest::Continuous(ContinuousPurchase { quantity, ..r }),
        }
    }
}

/// Discrete GDA: unit `i` of a purchase costs `initial_price · scale_factor^(n+i) / e^(decay_constant · t)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExponentialDiscreteGda {
    /// Price of the first unit at t = 0
    pub initial_price: f64,
    /// Exponential decay rate per time unit
    pub decay_constant: f64,
    /// Per-unit price multiplier, > 1
    pub scale_factor: f64,
}

impl ExponentialDiscreteGda {
    /// Checks the parameter domain
    pub fn validate(&self) -> Result<()> {
        ensure_positive("initial_price", self.initial_price)?;
        ensure_positive("decay_constant", self.decay_constant)?;
        if !(self.scale_factor.is_finite() && self.scale_factor > 1.0) {
            return Err(GdaError::domain(format!(
                "scale_factor must be finite and > 1 (got {})",
                self.scale_factor
            )));
        }
        Ok(())
    }

    /// `initial_price · s^n · (s^q − 1) / (e^(k·t) · (s − 1))`
    pub fn cumulative_price(&self, req: &DiscretePurchase) -> Result<Price> {
        self.validate()?;
        req.validate()?;
        if req.quantity == 0.0 { return Ok(Price::ZERO); }

        // s^n · (s^q − 1)/(s − 1) == s^(n+q) · (1 − s^−q)/(s − 1).
        // s − 1 is exact for s near 1, so the series has no cancellation as s → 1⁺
        let d = self.scale_factor - 1.0;
        let ln_s = d.ln_1p();
        let y = req.quantity * ln_s;
        let series = -(-y).exp_m1() / d;

        // s^(n+q) / e^(k·t) in one exponent so neither factor overflows on its own
        let log_growth = (req.num_total_purchases * ln_s + y) - self.decay_constant * req.time_since_start;
        if log_growth.is_nan() {
            return Err(GdaError::domain("discrete growth exponent is undefined"));
        }
        Price::new(scaled_exp(&[self.initial_price, series], log_growth))
    }

    /// Price of unit `i` within the purchase (0-based)
    pub fn unit_price(&self, req: &DiscretePurchase, i: u64) -> f64 {
        let n = req.num_total_purchases + i as f64;
        self.initial_price * (n * self.scale_factor.ln() - self.decay_constant * req.time_since_start).exp()
    }
}

/// Continuous GDA: supply emitted at `emission_rate`, price decays since the last auction event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExponentialContinuousGda {
    /// Price scale of the auction
    pub initial_price: f64,
    /// Exponential decay rate per time unit
    pub decay_constant: f64,
    /// Units emitted per time unit
    pub emission_rate: f64,
}

impl ExponentialContinuousGda {
    /// Checks the parameter domain
    pub fn validate(&self) -> Result<()> {
        ensure_positive("initial_price", self.initial_price)?;
        ensure_positive("decay_constant", self.decay_constant)?;
        ensure_positive("emission_rate", self.emission_rate)
    }

    /// `(initial_price / k) · (e^(k·q/r) − 1) / e^(k·a)`
    pub fn cumulative_price(&self, req: &ContinuousPurchase) -> Result<Price> {
        self.validate()?;
        req.validate()?;
        if req.quantity == 0.0 { return Ok(Price::ZERO); }

        let units = req.quantity / self.emission_rate;
        let x = self.decay_constant * units;
        if !x.is_finite() {
            return Err(GdaError::overflow(format!("decay_constant · quantity / emission_rate is not finite ({x})")));
        }
        // (e^x − 1)/k == units · e^x · (1 − e^−x)/x
        let shape = if x < CONTINUOUS_TAYLOR_CUTOFF {
            1.0 - x / 2.0 + x * x / 6.0
        } else {
            -(-x).exp_m1() / x
        };
        let log_growth = x - self.decay_constant * req.age_last_auction;
        Price::new(scaled_exp(&[self.initial_price, units, shape], log_growth))
    }

    /// Instantaneous price after `x` units of the purchase have been bought
    pub fn marginal_price(&self, age_last_auction: f64, x: f64) -> f64 {
        let k = self.decay_constant;
        self.initial_price / self.emission_rate * (k * (x / self.emission_rate - age_last_auction)).exp()
    }
}

/// Reciprocal-curve GDA, equivalent to constant-product AMM pricing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearEquivalentGda {
    /// Curve scale
    pub price_scale: f64,
}

impl LinearEquivalentGda {
    /// Checks the parameter domain
    pub fn validate(&self) -> Result<()> { ensure_positive("price_scale", self.price_scale) }

    /// `price_scale / (a − q) − price_scale / a`, requires `a > q`
    pub fn cumulative_price(&self, req: &ContinuousPurchase) -> Result<Price> {
        self.validate()?;
        req.validate()?;
        let (a, q) = (req.age_last_auction, req.quantity);
        if a <= q {
            return Err(GdaError::domain(format!(
                "age_last_auction must exceed quantity (got age={a}, quantity={q})"
            )));
        }
        if q == 0.0 { return Ok(Price::ZERO); }
        // same value as p/(a−q) − p/a without subtracting two large terms
        let (lead, ratio) = (self.price_scale / a, q / (a - q));
        let direct = lead * ratio;
        if lead.is_normal() && ratio.is_normal() && direct.is_normal() {
            return Price::new(direct);
        }
        Price::new((self.price_scale.ln() - a.ln() + q.ln() - (a - q).ln()).exp())
    }

    /// Instantaneous price after `x` units of the purchase have been bought
    pub fn marginal_price(&self, age_last_auction: f64, x: f64) -> f64 {
        let gap = age_last_auction - x;
        self.price_scale / (gap * gap)
    }
}

/// The closed set of auction variants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PricingModel {
    /// `exp_discrete`
    #[serde(rename = "exp_discrete")]
    ExponentialDiscrete(ExponentialDiscreteGda),
    /// `exp_continuous`
    #[serde(rename = "exp_continuous")]
    ExponentialContinuous(ExponentialContinuousGda),
    /// `linear_equivalent`
    #[serde(rename = "linear_equivalent")]
    LinearEquivalent(LinearEquivalentGda),
}

impl PricingModel {
    /// Selector name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            PricingModel::ExponentialDiscrete(_) => "exp_discrete",
            PricingModel::ExponentialContinuous(_) => "exp_continuous",
            PricingModel::LinearEquivalent(_) => "linear_equivalent",
        }
    }

    /// Checks the parameter domain of the selected variant
    pub fn validate(&self) -> Result<()> {
        match self {
            PricingModel::ExponentialDiscrete(m) => m.validate(),
            PricingModel::ExponentialContinuous(m) => m.validate(),
            PricingModel::LinearEquivalent(m) => m.validate(),
        }
    }

    /// Total price for `request`; the request shape must match the variant.
    pub fn cumulative_price(&self, request: &PurchaseRequest) -> Result<Price> {
        match (self, request) {
            (PricingModel::ExponentialDiscrete(m), PurchaseRequest::Discrete(r)) => m.cumulative_price(r),
            (PricingModel::ExponentialContinuous(m), PurchaseRequest::Continuous(r)) => m.cumulative_price(r),
            (PricingModel::LinearEquivalent(m), PurchaseRequest::Continuous(r)) => m.cumulative_price(r),
            (m, r) => Err(GdaError::domain(format!(
                "{} cannot price a {} request",
                m.name(),
                match r {
                    PurchaseRequest::Discrete(_) => "discrete",
                    PurchaseRequest::Continuous(_) => "continuous",
                }
            ))),
        }
    }
}
