//! Error taxonomy for pricing and encoding

use thiserror::Error;

/// Errors returned by the pricing core and the uint256 encoder.
///
/// Both variants are terminal for a single request: the caller rejects the
/// request and never encodes a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GdaError {
    /// An input or a derived intermediate is outside the formula's valid domain
    #[error("domain error: {0}")]
    Domain(String),
    /// The price does not fit the 256-bit unsigned output
    #[error("overflow: {0}")]
    Overflow(String),
}

impl GdaError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self { GdaError::Domain(msg.into()) }
    pub(crate) fn overflow(msg: impl Into<String>) -> Self { GdaError::Overflow(msg.into()) }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, GdaError>;
