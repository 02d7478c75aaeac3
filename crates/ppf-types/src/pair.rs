//! Token pairs, stored rate records and the signed update message.
//!
//! Pairs are ordered: `(base, quote)` and `(quote, base)` are distinct
//! entries and neither is derived from the other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Address;

/// An ordered `(base, quote)` token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenPair {
    pub base: Address,
    pub quote: Address,
}

impl TokenPair {
    pub fn new(base: Address, quote: Address) -> Self {
        Self { base, quote }
    }

    /// The same two tokens in the opposite order.
    pub fn reversed(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Whether base and quote are the same token.
    pub fn is_degenerate(&self) -> bool {
        self.base == self.quote
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// The latest accepted rate for a pair.
///
/// `Default` is the empty record returned for pairs that were never set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    /// Fixed-point rate, `real_rate * ONE`.
    pub rate: u128,
    /// Logical update time supplied by the operator.
    pub when: u64,
}

impl RateRecord {
    pub fn new(rate: u128, when: u64) -> Self {
        Self { rate, when }
    }

    pub fn is_empty(&self) -> bool {
        self.rate == 0 && self.when == 0
    }
}

/// The logical unit an operator signs: one rate for one pair at one time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub base: Address,
    pub quote: Address,
    pub rate: u128,
    pub when: u64,
}

impl UpdateMessage {
    pub fn new(base: Address, quote: Address, rate: u128, when: u64) -> Self {
        Self {
            base,
            quote,
            rate,
            when,
        }
    }

    pub fn pair(&self) -> TokenPair {
        TokenPair::new(self.base, self.quote)
    }

    pub fn record(&self) -> RateRecord {
        RateRecord::new(self.rate, self.when)
    }
}
