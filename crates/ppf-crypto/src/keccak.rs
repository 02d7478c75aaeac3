//! Keccak-256 hashing.
//!
//! This is the pre-standard Keccak padding used by Ethereum tooling, not the
//! NIST SHA3-256 variant.

use ppf_types::Hash256;
use sha3::{Digest, Keccak256};

/// Prefix of the personal-message digest for a 32-byte payload.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Compute the Keccak-256 hash of the input data.
pub fn keccak256(data: &[u8]) -> Hash256 {
    Keccak256::digest(data).into()
}

/// Compute the Keccak-256 hash of several byte strings laid end to end.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Wrap a 32-byte hash in the personal-message digest that wallets sign.
///
/// `keccak256("\x19Ethereum Signed Message:\n32" || hash)`
pub fn personal_message_digest(hash: &Hash256) -> Hash256 {
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, &hash[..]])
}
