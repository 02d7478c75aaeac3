//! Signer recovery for update digests.
//!
//! Recovery failures of any kind surface as [`FeedError::InvalidSignature`];
//! a zero or garbage address is never returned in their place.

use ppf_crypto::secp256k1::{recover_address, RecoverableSignature};
use ppf_types::{Address, Hash256, UpdateMessage};

use crate::hash::{batch_digest, update_digest};
use crate::{FeedError, Result};

/// Recover the address that signed `digest`.
pub fn recover_signer(digest: &Hash256, signature: &RecoverableSignature) -> Result<Address> {
    recover_address(digest, signature).map_err(FeedError::InvalidSignature)
}

/// Recover the signer of a single update.
pub fn recover_update_signer(
    msg: &UpdateMessage,
    signature: &RecoverableSignature,
) -> Result<Address> {
    recover_signer(&update_digest(msg), signature)
}

/// Recover the signer of a whole-batch signature.
pub fn recover_batch_signer(
    msgs: &[UpdateMessage],
    signature: &RecoverableSignature,
) -> Result<Address> {
    recover_signer(&batch_digest(msgs), signature)
}
