//! secp256k1 recoverable signatures.
//!
//! An operator signature travels as 65 bytes, `r || s || v`. The trailing
//! recovery indicator comes in two historical encodings: the legacy `0/1`
//! form and the standard `27/28` form. Both are accepted and normalized to a
//! recovery id before public-key recovery, so the same signature recovers
//! the same signer under either encoding.
//!
//! The signer is identified by its address: the last 20 bytes of the
//! Keccak-256 hash of the uncompressed public key (without the `0x04` tag).

use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use ppf_types::{Address, Hash256};
use zeroize::Zeroize;

use crate::keccak::keccak256;
use crate::{CryptoError, Result};

/// Length of a wire-encoded recoverable signature: `r[32] || s[32] || v[1]`.
pub const SIGNATURE_LEN: usize = 65;

/// Offset added to a recovery id in the standard encoding.
pub const STANDARD_V_OFFSET: u8 = 27;

/// A recovery indicator as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryIndicator {
    /// `0` or `1`.
    Legacy(u8),
    /// `27` or `28`.
    Standard(u8),
}

impl RecoveryIndicator {
    /// Classify a raw `v` byte.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidRecoveryId`] for any byte outside `{0, 1, 27, 28}`.
    pub fn parse(v: u8) -> Result<Self> {
        match v {
            0 | 1 => Ok(Self::Legacy(v)),
            27 | 28 => Ok(Self::Standard(v)),
            other => Err(CryptoError::InvalidRecoveryId(other)),
        }
    }

    /// The recovery id (`0` or `1`) this indicator denotes.
    pub fn recovery_id(self) -> u8 {
        match self {
            Self::Legacy(v) => v,
            Self::Standard(v) => v - STANDARD_V_OFFSET,
        }
    }
}

/// Normalize a raw `v` byte to a recovery id of `0` or `1`.
pub fn normalize_recovery_id(v: u8) -> Result<u8> {
    RecoveryIndicator::parse(v).map(RecoveryIndicator::recovery_id)
}

/// A 65-byte recoverable ECDSA signature.
///
/// Construction only checks the length; `r`, `s` and `v` are validated when
/// the signer is recovered.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    r: [u8; 32],
    s: [u8; 32],
    v: u8,
}

impl RecoverableSignature {
    pub fn from_parts(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Parse the wire form.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidSignatureLength`] unless exactly [`SIGNATURE_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignatureLength {
                expected: SIGNATURE_LEN,
                actual: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Parse a hex-encoded signature, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits).map_err(|_| CryptoError::InvalidSignatureLength {
            expected: SIGNATURE_LEN,
            actual: digits.len() / 2,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Encode to the 65-byte wire form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// `0x`-prefixed hex of the wire form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    pub fn v(&self) -> u8 {
        self.v
    }

    /// The same signature with its indicator re-encoded in the legacy form.
    pub fn to_legacy(&self) -> Result<Self> {
        let id = normalize_recovery_id(self.v)?;
        Ok(Self { v: id, ..*self })
    }

    /// The same signature with its indicator re-encoded in the standard form.
    pub fn to_standard(&self) -> Result<Self> {
        let id = normalize_recovery_id(self.v)?;
        Ok(Self {
            v: id + STANDARD_V_OFFSET,
            ..*self
        })
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecoverableSignature")
            .field(&self.to_hex())
            .finish()
    }
}

/// Recover the address that produced `signature` over the 32-byte `digest`.
///
/// High-`s` signatures are folded onto their low-`s` twin (flipping the
/// recovery id parity) so that recovery matches what an `ecrecover`-style
/// verifier yields for the same bytes.
///
/// # Errors
///
/// - [`CryptoError::InvalidRecoveryId`] if `v` is not `0`, `1`, `27` or `28`
/// - [`CryptoError::MalformedSignature`] if `r` or `s` is out of range
/// - [`CryptoError::RecoveryFailed`] if no key recovers
pub fn recover_address(digest: &Hash256, signature: &RecoverableSignature) -> Result<Address> {
    let recovery_id = normalize_recovery_id(signature.v)?;

    let mut scalars = [0u8; 64];
    scalars[..32].copy_from_slice(&signature.r);
    scalars[32..].copy_from_slice(&signature.s);
    let mut sig = Signature::from_slice(&scalars).map_err(|_| CryptoError::MalformedSignature)?;

    let mut y_odd = recovery_id == 1;
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        y_odd = !y_odd;
    }
    let recid = RecoveryId::new(y_odd, false);

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recid)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    let address = address_of(&key);
    if address.is_zero() {
        return Err(CryptoError::RecoveryFailed);
    }
    Ok(address)
}

/// Derive the address of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(bytes)
}

/// The operator's secp256k1 signing key.
pub struct OperatorKey {
    inner: SigningKey,
}

impl OperatorKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Create a key from its 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let inner = SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidSecretKey)?;
        Ok(Self { inner })
    }

    /// Create a key from hex, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.trim().strip_prefix("0x").unwrap_or(text.trim());
        let mut bytes = [0u8; 32];
        let decoded = hex::decode_to_slice(digits, &mut bytes);
        let key = decoded
            .map_err(|_| CryptoError::InvalidSecretKey)
            .and_then(|_| Self::from_bytes(&bytes));
        bytes.zeroize();
        key
    }

    /// The address this key signs as.
    pub fn address(&self) -> Address {
        address_of(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest, encoding the indicator in the standard form.
    pub fn sign_digest(&self, digest: &Hash256) -> Result<RecoverableSignature> {
        let (sig, recid) = self
            .inner
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(RecoverableSignature::from_parts(
            r,
            s,
            recid.to_byte() + STANDARD_V_OFFSET,
        ))
    }
}

impl fmt::Debug for OperatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorKey")
            .field("address", &self.address())
            .finish()
    }
}
