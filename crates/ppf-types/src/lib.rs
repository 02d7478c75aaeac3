//! # ppf-types
//!
//! Shared domain types used across the pair price feed workspace.
//!
//! ## Modules
//!
//! - [`address`]: 20-byte token and signer addresses
//! - [`pair`]: Token pairs, stored rate records and signed update messages
//! - [`rate`]: Fixed-point rate encoding scaled by [`rate::ONE`]

pub mod address;
pub mod pair;
pub mod rate;

pub use address::Address;
pub use pair::{RateRecord, TokenPair, UpdateMessage};

/// A 32-byte digest (Keccak-256 output).
pub type Hash256 = [u8; 32];

/// Error types for parsing and encoding domain values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypesError {
    /// Address is not 20 bytes of hex.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Rate string is not a non-negative decimal with at most 18 fractional digits.
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// Rate does not fit a `u128` once scaled by `ONE`.
    #[error("rate overflows fixed-point range")]
    RateOverflow,

    /// Ratio with a zero denominator.
    #[error("zero denominator")]
    ZeroDenominator,
}

/// Convenience result type for domain value parsing.
pub type Result<T> = std::result::Result<T, TypesError>;
