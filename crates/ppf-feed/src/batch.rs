//! Batch decoding and atomic application.
//!
//! A batch arrives as four parallel columns (bases, quotes, rates, whens)
//! plus signature bytes. Two signing schemes are supported:
//!
//! - **per-entry**: the signature blob is the concatenation of one
//!   [`SIGNATURE_LEN`]-byte signature per entry, in index order, each over
//!   its own update digest ([`apply_many`])
//! - **whole-batch**: one signature over the batch digest
//!   ([`apply_batch_signed`])
//!
//! Entries are checked in index order against the state left by the
//! entries before them. If any entry fails, nothing from the batch is
//! written and the first failure is returned.

use std::collections::HashMap;

use ppf_crypto::secp256k1::{RecoverableSignature, SIGNATURE_LEN};
use ppf_types::{Address, RateRecord, TokenPair, UpdateMessage};
use tracing::{info, warn};

use crate::processor::{authorize, ensure_distinct, ensure_fresh, ensure_operator};
use crate::store::RateStore;
use crate::verifier::recover_batch_signer;
use crate::{BatchDefect, FeedError, Result};

/// Updates decoded from parallel columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    messages: Vec<UpdateMessage>,
}

impl UpdateBatch {
    /// Zip the columns into messages.
    ///
    /// # Errors
    ///
    /// [`FeedError::MalformedBatch`] if the columns differ in length.
    pub fn from_columns(
        bases: &[Address],
        quotes: &[Address],
        rates: &[u128],
        whens: &[u64],
    ) -> Result<Self> {
        let n = bases.len();
        if quotes.len() != n || rates.len() != n || whens.len() != n {
            return Err(FeedError::MalformedBatch(BatchDefect::ColumnLengthMismatch {
                bases: bases.len(),
                quotes: quotes.len(),
                rates: rates.len(),
                whens: whens.len(),
            }));
        }
        let messages = (0..n)
            .map(|i| UpdateMessage::new(bases[i], quotes[i], rates[i], whens[i]))
            .collect();
        Ok(Self { messages })
    }

    pub fn from_messages(messages: Vec<UpdateMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[UpdateMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Per-entry signatures split out of a concatenated blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureBatch {
    signatures: Vec<RecoverableSignature>,
}

impl SignatureBatch {
    /// Split `blob` into exactly `count` signatures.
    ///
    /// # Errors
    ///
    /// [`FeedError::MalformedBatch`] unless `blob.len() == count * SIGNATURE_LEN`.
    pub fn parse(blob: &[u8], count: usize) -> Result<Self> {
        let expected = count.checked_mul(SIGNATURE_LEN).ok_or(FeedError::MalformedBatch(
            BatchDefect::SignatureBlobLength {
                expected: usize::MAX,
                actual: blob.len(),
            },
        ))?;
        if blob.len() != expected {
            return Err(FeedError::MalformedBatch(BatchDefect::SignatureBlobLength {
                expected,
                actual: blob.len(),
            }));
        }
        let signatures = blob
            .chunks_exact(SIGNATURE_LEN)
            .map(RecoverableSignature::from_bytes)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(FeedError::InvalidSignature)?;
        Ok(Self { signatures })
    }

    pub fn from_signatures(signatures: Vec<RecoverableSignature>) -> Self {
        Self { signatures }
    }

    /// Concatenate the signatures back into a blob.
    pub fn to_blob(&self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(self.signatures.len() * SIGNATURE_LEN);
        for sig in &self.signatures {
            blob.extend_from_slice(&sig.to_bytes());
        }
        blob
    }

    pub fn signatures(&self) -> &[RecoverableSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Writes accepted so far in a batch, not yet visible in the store.
#[derive(Debug, Default)]
struct StagedWrites {
    latest: HashMap<TokenPair, RateRecord>,
    order: Vec<UpdateMessage>,
}

impl StagedWrites {
    fn current<'a>(&'a self, store: &'a RateStore, pair: &TokenPair) -> Option<&'a RateRecord> {
        self.latest.get(pair).or_else(|| store.lookup(pair))
    }

    fn stage(&mut self, msg: UpdateMessage) {
        self.latest.insert(msg.pair(), msg.record());
        self.order.push(msg);
    }

    fn commit(self, store: &mut RateStore) -> usize {
        let count = self.order.len();
        for msg in self.order {
            store.insert(msg.pair(), msg.record());
            info!(pair = %msg.pair(), rate = msg.rate, when = msg.when, "rate updated");
        }
        count
    }
}

/// Apply a batch where every entry carries its own signature.
///
/// # Errors
///
/// - [`FeedError::MalformedBatch`] if the number of signatures differs from
///   the number of entries
/// - the first per-entry error, as for a single update
pub fn apply_many(
    store: &mut RateStore,
    operator: Address,
    batch: &UpdateBatch,
    signatures: &SignatureBatch,
) -> Result<()> {
    if signatures.len() != batch.len() {
        return Err(FeedError::MalformedBatch(BatchDefect::SignatureBlobLength {
            expected: batch.len() * SIGNATURE_LEN,
            actual: signatures.len() * SIGNATURE_LEN,
        }));
    }

    let mut staged = StagedWrites::default();
    for (index, (msg, sig)) in batch.messages().iter().zip(signatures.signatures()).enumerate() {
        let checked = ensure_distinct(msg)
            .and_then(|_| authorize(operator, msg, sig))
            .and_then(|_| ensure_fresh(staged.current(store, &msg.pair()), msg));
        if let Err(e) = checked {
            warn!(index, entries = batch.len(), error = %e, "batch rejected, nothing applied");
            return Err(e);
        }
        staged.stage(*msg);
    }

    let applied = staged.commit(store);
    info!(applied, "batch applied");
    Ok(())
}

/// Apply a batch authorized by a single signature over the batch digest.
///
/// # Errors
///
/// - [`FeedError::InvalidSignature`] / [`FeedError::Unauthorized`] if the
///   batch signature does not recover to `operator`
/// - [`FeedError::EqualBaseQuote`] / [`FeedError::StaleUpdate`] for the
///   first offending entry
pub fn apply_batch_signed(
    store: &mut RateStore,
    operator: Address,
    batch: &UpdateBatch,
    signature: &RecoverableSignature,
) -> Result<()> {
    let signer = recover_batch_signer(batch.messages(), signature)
        .and_then(|signer| ensure_operator(operator, signer).map(|_| signer));
    if let Err(e) = signer {
        warn!(entries = batch.len(), error = %e, "batch signature rejected");
        return Err(e);
    }

    let mut staged = StagedWrites::default();
    for (index, msg) in batch.messages().iter().enumerate() {
        let checked = ensure_distinct(msg)
            .and_then(|_| ensure_fresh(staged.current(store, &msg.pair()), msg));
        if let Err(e) = checked {
            warn!(index, entries = batch.len(), error = %e, "batch rejected, nothing applied");
            return Err(e);
        }
        staged.stage(*msg);
    }

    let applied = staged.commit(store);
    info!(applied, "signed batch applied");
    Ok(())
}
