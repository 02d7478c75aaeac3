//! # ppf-feed
//!
//! Pair price feed: stores the latest exchange rate per ordered token pair
//! and accepts updates only when they carry a signature from the current
//! operator and a strictly newer logical timestamp.
//!
//! ## Update pipeline
//!
//! 1. [`hash`] re-derives the canonical digest of the submitted tuple
//! 2. [`verifier`] recovers the signer from the signature
//! 3. [`processor`] compares the signer to the operator read from
//!    [`operator`] at validation time and checks timestamp ordering
//! 4. [`store`] is written only if every check passed
//!
//! [`batch`] drives the same checks for many updates with all-or-nothing
//! semantics, and [`PriceFeed`] ties the pieces together behind the
//! `update` / `update_many` / `get` surface.
//!
//! ## Modules
//!
//! - [`hash`]: Canonical update and batch hashes
//! - [`verifier`]: Signer recovery
//! - [`store`]: Latest rate record per pair
//! - [`operator`]: Operator and operator-owner roles
//! - [`processor`]: Single update validation and application
//! - [`batch`]: Batch decoding and atomic application
//! - [`signer`]: Operator-side signing of updates
//! - [`events`]: Events emitted by accepted calls
//! - [`feed`]: The [`PriceFeed`] facade

pub mod batch;
pub mod events;
pub mod feed;
pub mod hash;
pub mod operator;
pub mod processor;
pub mod signer;
pub mod store;
pub mod verifier;

pub use feed::PriceFeed;

use ppf_crypto::CryptoError;
use ppf_types::{Address, TokenPair};

/// Why a batch could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchDefect {
    /// The parallel input sequences differ in length.
    #[error("column lengths differ: bases={bases} quotes={quotes} rates={rates} whens={whens}")]
    ColumnLengthMismatch {
        bases: usize,
        quotes: usize,
        rates: usize,
        whens: usize,
    },
    /// The signature blob is not `count * SIGNATURE_LEN` bytes.
    #[error("signature blob is {actual} bytes, expected {expected}")]
    SignatureBlobLength { expected: usize, actual: usize },
}

/// Error types for feed operations.
///
/// Every error is terminal for the call that produced it and leaves the
/// feed unchanged.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeedError {
    /// The signature is malformed or no signer can be recovered from it.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[source] CryptoError),

    /// The recovered signer is not the current operator.
    #[error("unauthorized signer {signer}, operator is {operator}")]
    Unauthorized {
        /// Address recovered from the signature.
        signer: Address,
        /// Operator at validation time.
        operator: Address,
    },

    /// The update is not strictly newer than the stored record.
    #[error("stale update for {pair}: incoming when {incoming} <= stored {stored}")]
    StaleUpdate {
        pair: TokenPair,
        /// Timestamp of the stored record.
        stored: u64,
        /// Timestamp of the rejected update.
        incoming: u64,
    },

    /// Batch inputs cannot be decoded.
    #[error("malformed batch: {0}")]
    MalformedBatch(BatchDefect),

    /// Base and quote are the same token.
    #[error("base and quote are both {0}")]
    EqualBaseQuote(Address),

    /// Caller is not the operator owner.
    #[error("{caller} is not the operator owner")]
    NotOperatorOwner { caller: Address },

    /// The zero address cannot hold a role.
    #[error("zero address cannot be operator or owner")]
    ZeroAddress,
}

/// Convenience result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
