//! # ppf-crypto
//!
//! Cryptographic primitives for the pair price feed.
//!
//! The suite is fixed: Keccak-256 for hashing and secp256k1 recoverable
//! ECDSA for operator signatures, with signer identity expressed as a
//! 20-byte address derived from the recovered public key.
//!
//! ## Modules
//!
//! - [`keccak`]: Keccak-256 and the personal-message digest
//! - [`secp256k1`]: Recoverable signatures, recovery-id normalization,
//!   signer recovery and operator signing keys

pub mod keccak;
pub mod secp256k1;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature bytes have the wrong length.
    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    /// Recovery indicator is neither a legacy (0/1) nor a standard (27/28) value.
    #[error("invalid recovery indicator: {0:#04x}")]
    InvalidRecoveryId(u8),

    /// `r` or `s` is zero or not below the curve order.
    #[error("malformed signature scalars")]
    MalformedSignature,

    /// No public key can be recovered from the signature and digest.
    #[error("public key recovery failed")]
    RecoveryFailed,

    /// Secret key bytes are not a valid secp256k1 scalar.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
