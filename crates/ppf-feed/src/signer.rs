//! Operator-side signing of updates.
//!
//! These produce exactly the bytes [`crate::PriceFeed`] expects: one
//! signature per update, a concatenated blob for a per-entry batch, or a
//! single signature over a whole batch.

use ppf_crypto::secp256k1::{OperatorKey, RecoverableSignature};
use ppf_types::UpdateMessage;

use crate::batch::SignatureBatch;
use crate::hash::{batch_digest, update_digest};

/// Sign one update.
pub fn sign_update(
    key: &OperatorKey,
    msg: &UpdateMessage,
) -> ppf_crypto::Result<RecoverableSignature> {
    key.sign_digest(&update_digest(msg))
}

/// Sign every update individually and concatenate the signatures in order.
pub fn sign_update_many(key: &OperatorKey, msgs: &[UpdateMessage]) -> ppf_crypto::Result<Vec<u8>> {
    let signatures = msgs
        .iter()
        .map(|msg| sign_update(key, msg))
        .collect::<ppf_crypto::Result<Vec<_>>>()?;
    Ok(SignatureBatch::from_signatures(signatures).to_blob())
}

/// Sign a whole batch with one signature.
pub fn sign_batch(
    key: &OperatorKey,
    msgs: &[UpdateMessage],
) -> ppf_crypto::Result<RecoverableSignature> {
    key.sign_digest(&batch_digest(msgs))
}
