//! Validation and application of a single signed update.
//!
//! An update moves through these checks in order and stops at the first
//! failure:
//!
//! 1. base and quote differ
//! 2. the canonical digest is rebuilt and the signer recovered
//!    ([`FeedError::InvalidSignature`] on failure)
//! 3. the signer equals the operator passed in by the caller
//!    ([`FeedError::Unauthorized`])
//! 4. `when` is strictly greater than the stored `when` for the pair
//!    ([`FeedError::StaleUpdate`])
//!
//! Only when all checks pass is the record written. Changing any field of
//! the tuple changes the digest in step 2, so a signature never validates a
//! tuple other than the one it was made for.

use ppf_crypto::secp256k1::RecoverableSignature;
use ppf_types::{Address, RateRecord, UpdateMessage};
use tracing::{debug, info};

use crate::store::RateStore;
use crate::verifier::recover_update_signer;
use crate::{FeedError, Result};

/// Reject updates whose base and quote are the same token.
pub fn ensure_distinct(msg: &UpdateMessage) -> Result<()> {
    if msg.pair().is_degenerate() {
        return Err(FeedError::EqualBaseQuote(msg.base));
    }
    Ok(())
}

/// Recover the signer of `msg` and require it to be `operator`.
pub fn authorize(
    operator: Address,
    msg: &UpdateMessage,
    signature: &RecoverableSignature,
) -> Result<Address> {
    let signer = recover_update_signer(msg, signature)?;
    ensure_operator(operator, signer)?;
    Ok(signer)
}

/// Require a recovered signer to be the current operator.
pub fn ensure_operator(operator: Address, signer: Address) -> Result<()> {
    if signer != operator {
        return Err(FeedError::Unauthorized { signer, operator });
    }
    Ok(())
}

/// Require `msg` to be strictly newer than `existing`.
///
/// An equal timestamp is stale.
pub fn ensure_fresh(existing: Option<&RateRecord>, msg: &UpdateMessage) -> Result<()> {
    match existing {
        Some(record) if record.when >= msg.when => Err(FeedError::StaleUpdate {
            pair: msg.pair(),
            stored: record.when,
            incoming: msg.when,
        }),
        _ => Ok(()),
    }
}

/// Run every check against the current store without writing.
pub fn validate_update(
    store: &RateStore,
    operator: Address,
    msg: &UpdateMessage,
    signature: &RecoverableSignature,
) -> Result<()> {
    ensure_distinct(msg)?;
    authorize(operator, msg, signature)?;
    ensure_fresh(store.lookup(&msg.pair()), msg)
}

/// Validate `msg` and, if it passes, store its record.
///
/// # Errors
///
/// - [`FeedError::EqualBaseQuote`] if base and quote are the same token
/// - [`FeedError::InvalidSignature`] if no signer can be recovered
/// - [`FeedError::Unauthorized`] if the signer is not `operator`
/// - [`FeedError::StaleUpdate`] if the stored record is as new or newer
pub fn apply_update(
    store: &mut RateStore,
    operator: Address,
    msg: &UpdateMessage,
    signature: &RecoverableSignature,
) -> Result<()> {
    if let Err(e) = validate_update(store, operator, msg, signature) {
        debug!(pair = %msg.pair(), when = msg.when, error = %e, "update rejected");
        return Err(e);
    }

    store.insert(msg.pair(), msg.record());
    info!(pair = %msg.pair(), rate = msg.rate, when = msg.when, "rate updated");
    Ok(())
}
