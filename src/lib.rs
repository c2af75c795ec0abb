#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
//! Library entry for Gradual Dutch Auction pricing.
//!
//! This crate evaluates the closed-form cumulative price of a GDA purchase and
//! encodes it as an ABI uint256 word for a fixed-width-integer settlement layer.
//!
//! # Modules
//! - [`models`]: Discrete, continuous and reciprocal pricing closed forms
//! - [`encoding`]: Price → uint256 → `0x` hex word
//! - [`verifier`]: Closed form vs numeric summation / integration
//! - [`schedule`]: Per-unit price schedule as CSV
//! - [`cli`]: Fixed-point command-line inputs

/// Pricing closed forms for the three auction variants
pub mod models;

/// ABI-style uint256 output encoding
pub mod encoding;

/// Error taxonomy shared by pricing and encoding
pub mod error;

/// Verification tools for closed-form accuracy
pub mod verifier;

/// Per-unit price schedule export
pub mod schedule;

/// Command-line input parsing and rescaling
pub mod cli;

pub use crate::encoding::{decode_uint256, encode_price, to_uint256};
pub use crate::error::GdaError;
pub use crate::models::{
    ContinuousPurchase, DiscretePurchase, ExponentialContinuousGda, ExponentialDiscreteGda, LinearEquivalentGda,
    Price, PricingModel, PurchaseRequest,
};
