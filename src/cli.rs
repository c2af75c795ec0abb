//! Command-line input contract
//!
//! Auction parameters arrive as 18-decimal fixed-point integers (the settlement
//! side's native representation) and are rescaled here. Purchase counts, times
//! and quantities arrive as plain integers.

use crate::models::{
    ContinuousPurchase, DiscretePurchase, ExponentialContinuousGda, ExponentialDiscreteGda, LinearEquivalentGda,
    Price, PricingModel, PurchaseRequest,
};
use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// Fixed-point scale of the parameter flags
pub const WAD: f64 = 1e18;

/// Auction variant selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Discrete steps, exponential decay
    #[value(name = "exp_discrete")]
    ExpDiscrete,
    /// Continuous emission, exponential decay
    #[value(name = "exp_continuous")]
    ExpContinuous,
    /// Reciprocal curve
    #[value(name = "linear_equivalent")]
    LinearEquivalent,
}

/// Parsed command line
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gda",
    version,
    about = "Gradual Dutch Auction cumulative price, printed as an ABI uint256 word",
    long_about = None
)]
pub struct Args {
    /// Auction variant
    #[arg(value_enum)]
    pub variant: Variant,

    /// Initial price / price scale, 18-decimal fixed point
    #[arg(long = "price_scale")]
    pub price_scale: Option<u128>,
    /// Decay constant, 18-decimal fixed point
    #[arg(long = "decay_constant")]
    pub decay_constant: Option<u128>,
    /// Per-unit scale factor (exp_discrete), 18-decimal fixed point
    #[arg(long = "scale_factor")]
    pub scale_factor: Option<u128>,
    /// Emission rate (exp_continuous), 18-decimal fixed point
    #[arg(long = "emission_rate")]
    pub emission_rate: Option<u128>,

    /// Units already sold (exp_discrete)
    #[arg(long = "num_total_purchases")]
    pub num_total_purchases: Option<u128>,
    /// Time since the auction started (exp_discrete)
    #[arg(long = "time_since_start")]
    pub time_since_start: Option<u128>,
    /// Time since the last auction event (exp_continuous, linear_equivalent)
    #[arg(long = "age_last_auction")]
    pub age_last_auction: Option<u128>,
    /// Units to buy
    #[arg(long)]
    pub quantity: Option<u128>,

    /// Cross-check the closed form numerically and log the report
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub verify: bool,
    /// Write the per-unit price schedule as CSV
    #[arg(long, value_name = "PATH")]
    pub schedule: Option<PathBuf>,
    /// Print a JSON quote instead of the bare word
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
    /// Log filter used when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

/// Rescales an 18-decimal fixed-point integer.
pub fn from_wad(raw: u128) -> f64 { raw as f64 / WAD }

fn required(value: Option<u128>, flag: &str, variant: Variant) -> Result<u128> {
    value.ok_or_else(|| anyhow!("{}: missing --{}", variant_name(variant), flag))
}

fn variant_name(v: Variant) -> &'static str {
    match v {
        Variant::ExpDiscrete => "exp_discrete",
        Variant::ExpContinuous => "exp_continuous",
        Variant::LinearEquivalent => "linear_equivalent",
    }
}

impl Args {
    /// Builds the model and request for the selected variant, rejecting out-of-domain parameters.
    pub fn into_quote(&self) -> Result<(PricingModel, PurchaseRequest)> {
        let v = self.variant;
        let quantity = required(self.quantity, "quantity", v)? as f64;
        let price_scale = from_wad(required(self.price_scale, "price_scale", v)?);
        let quote = match v {
            Variant::ExpDiscrete => (
                PricingModel::ExponentialDiscrete(ExponentialDiscreteGda {
                    initial_price: price_scale,
                    decay_constant: from_wad(required(self.decay_constant, "decay_constant", v)?),
                    scale_factor: from_wad(required(self.scale_factor, "scale_factor", v)?),
                }),
                PurchaseRequest::Discrete(DiscretePurchase {
                    num_total_purchases: required(self.num_total_purchases, "num_total_purchases", v)? as f64,
                    time_since_start: required(self.time_since_start, "time_since_start", v)? as f64,
                    quantity,
                }),
            ),
            Variant::ExpContinuous => (
                PricingModel::ExponentialContinuous(ExponentialContinuousGda {
                    initial_price: price_scale,
                    decay_constant: from_wad(required(self.decay_constant, "decay_constant", v)?),
                    emission_rate: from_wad(required(self.emission_rate, "emission_rate", v)?),
                }),
                PurchaseRequest::Continuous(ContinuousPurchase {
                    age_last_auction: required(self.age_last_auction, "age_last_auction", v)? as f64,
                    quantity,
                }),
            ),
            Variant::LinearEquivalent => (
                PricingModel::LinearEquivalent(LinearEquivalentGda { price_scale }),
                PurchaseRequest::Continuous(ContinuousPurchase {
                    age_last_auction: required(self.age_last_auction, "age_last_auction", v)? as f64,
                    quantity,
                }),
            ),
        };
        quote.0.validate()?;
        Ok(quote)
    }
}

/// JSON form of a priced request
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    /// Model that priced the request
    pub model: PricingModel,
    /// The request
    pub request: PurchaseRequest,
    /// Unrounded price
    pub price: Price,
    /// ABI uint256 word of the truncated price
    pub encoded: String,
}
