//! The price feed: rate store, operator role and event buffer behind the
//! `update` / `update_many` / `get` call surface.
//!
//! Each call runs to completion and either applies in full or returns an
//! error with no state change. The operator is read from the role at the
//! moment a call is validated.

use ppf_crypto::secp256k1::RecoverableSignature;
use ppf_types::{Address, RateRecord, TokenPair, UpdateMessage};
use tracing::info;

use crate::batch::{apply_batch_signed, apply_many, SignatureBatch, UpdateBatch};
use crate::events::FeedEvent;
use crate::operator::OperatorRole;
use crate::processor::apply_update;
use crate::store::RateStore;
use crate::{FeedError, Result};

/// A pair price feed with a single authorized operator.
#[derive(Debug, Clone)]
pub struct PriceFeed {
    store: RateStore,
    role: OperatorRole,
    events: Vec<FeedEvent>,
}

impl PriceFeed {
    /// Create an empty feed.
    ///
    /// # Errors
    ///
    /// [`FeedError::ZeroAddress`] if either address is zero.
    pub fn new(operator: Address, operator_owner: Address) -> Result<Self> {
        Ok(Self {
            store: RateStore::new(),
            role: OperatorRole::new(operator, operator_owner)?,
            events: Vec::new(),
        })
    }

    /// Apply one signed update.
    ///
    /// `signature` is the 65-byte wire form; its recovery indicator may be
    /// either `0/1` or `27/28`.
    pub fn update(
        &mut self,
        base: Address,
        quote: Address,
        rate: u128,
        when: u64,
        signature: &[u8],
    ) -> Result<()> {
        let signature =
            RecoverableSignature::from_bytes(signature).map_err(FeedError::InvalidSignature)?;
        let msg = UpdateMessage::new(base, quote, rate, when);
        apply_update(&mut self.store, self.role.operator(), &msg, &signature)?;
        self.events.push(FeedEvent::set_rate(&msg));
        Ok(())
    }

    /// Apply a batch whose signature blob concatenates one signature per entry.
    pub fn update_many(
        &mut self,
        bases: &[Address],
        quotes: &[Address],
        rates: &[u128],
        whens: &[u64],
        signatures: &[u8],
    ) -> Result<()> {
        let batch = UpdateBatch::from_columns(bases, quotes, rates, whens)?;
        let signatures = SignatureBatch::parse(signatures, batch.len())?;
        apply_many(&mut self.store, self.role.operator(), &batch, &signatures)?;
        self.record_batch(&batch);
        Ok(())
    }

    /// Apply a batch authorized by a single signature over the whole batch.
    pub fn update_many_batch_signed(
        &mut self,
        bases: &[Address],
        quotes: &[Address],
        rates: &[u128],
        whens: &[u64],
        signature: &[u8],
    ) -> Result<()> {
        let batch = UpdateBatch::from_columns(bases, quotes, rates, whens)?;
        let signature =
            RecoverableSignature::from_bytes(signature).map_err(FeedError::InvalidSignature)?;
        apply_batch_signed(&mut self.store, self.role.operator(), &batch, &signature)?;
        self.record_batch(&batch);
        Ok(())
    }

    /// The stored record for `(base, quote)`, or the empty record.
    pub fn get(&self, base: Address, quote: Address) -> RateRecord {
        self.store.get(&TokenPair::new(base, quote))
    }

    /// Replace the operator. Only the operator owner may call this.
    pub fn set_operator(&mut self, caller: Address, operator: Address) -> Result<()> {
        self.role.set_operator(caller, operator)?;
        info!(%operator, "operator changed");
        self.events.push(FeedEvent::SetOperator { operator });
        Ok(())
    }

    /// Replace the operator owner. Only the current owner may call this.
    pub fn set_operator_owner(&mut self, caller: Address, owner: Address) -> Result<()> {
        self.role.set_owner(caller, owner)?;
        info!(%owner, "operator owner changed");
        self.events.push(FeedEvent::SetOperatorOwner { owner });
        Ok(())
    }

    pub fn operator(&self) -> Address {
        self.role.operator()
    }

    pub fn operator_owner(&self) -> Address {
        self.role.owner()
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Drain buffered events.
    pub fn take_events(&mut self) -> Vec<FeedEvent> {
        std::mem::take(&mut self.events)
    }

    fn record_batch(&mut self, batch: &UpdateBatch) {
        self.events.extend(batch.messages().iter().map(FeedEvent::set_rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{sign_batch, sign_update, sign_update_many};
    use crate::BatchDefect;
    use ppf_crypto::secp256k1::OperatorKey;
    use ppf_types::rate::ONE;

    fn token(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn owner() -> Address {
        token(0xee)
    }

    fn feed_for(key: &OperatorKey) -> PriceFeed {
        PriceFeed::new(key.address(), owner()).expect("feed")
    }

    fn sig_bytes(
        key: &OperatorKey,
        base: Address,
        quote: Address,
        rate: u128,
        when: u64,
    ) -> Vec<u8> {
        sign_update(key, &UpdateMessage::new(base, quote, rate, when))
            .expect("sign")
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn test_update_and_get() {
        let key = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let sig = sig_bytes(&key, token(1), token(2), 2 * ONE, 1);

        feed.update(token(1), token(2), 2 * ONE, 1, &sig).expect("update");

        assert_eq!(feed.get(token(1), token(2)), RateRecord::new(2 * ONE, 1));
        assert!(feed.get(token(2), token(1)).is_empty());
        assert_eq!(
            feed.take_events(),
            vec![FeedEvent::SetRate {
                base: token(1),
                quote: token(2),
                rate: 2 * ONE,
                when: 1,
            }]
        );
        assert!(feed.take_events().is_empty());
    }

    #[test]
    fn test_short_signature_is_invalid() {
        let key = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let err = feed
            .update(token(1), token(2), ONE, 1, &[0u8; 64])
            .expect_err("short signature");
        assert!(matches!(err, FeedError::InvalidSignature(_)));
    }

    #[test]
    fn test_operator_change_revokes_pending_signature() {
        let key = OperatorKey::generate();
        let replacement = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let sig = sig_bytes(&key, token(1), token(2), 2 * ONE, 1);

        feed.set_operator(owner(), replacement.address()).expect("owner sets operator");
        let err = feed
            .update(token(1), token(2), 2 * ONE, 1, &sig)
            .expect_err("old operator revoked");

        assert_eq!(
            err,
            FeedError::Unauthorized {
                signer: key.address(),
                operator: replacement.address(),
            }
        );
        assert!(feed.get(token(1), token(2)).is_empty());
        assert_eq!(
            feed.take_events(),
            vec![FeedEvent::SetOperator {
                operator: replacement.address()
            }]
        );
    }

    #[test]
    fn test_only_owner_sets_operator() {
        let key = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let err = feed
            .set_operator(key.address(), token(9))
            .expect_err("operator is not owner");
        assert_eq!(err, FeedError::NotOperatorOwner { caller: key.address() });
        assert_eq!(feed.operator(), key.address());

        feed.set_operator_owner(owner(), token(7)).expect("transfer owner");
        assert_eq!(feed.operator_owner(), token(7));
    }

    #[test]
    fn test_update_many() {
        let key = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let msgs = [
            UpdateMessage::new(token(1), token(2), 4 * ONE, 1),
            UpdateMessage::new(token(1), token(3), 4 * ONE, 1),
        ];
        let blob = sign_update_many(&key, &msgs).expect("sign many");

        feed.update_many(
            &[token(1), token(1)],
            &[token(2), token(3)],
            &[4 * ONE, 4 * ONE],
            &[1, 1],
            &blob,
        )
        .expect("update many");

        assert_eq!(feed.get(token(1), token(2)), RateRecord::new(4 * ONE, 1));
        assert_eq!(feed.get(token(1), token(3)), RateRecord::new(4 * ONE, 1));
        assert_eq!(feed.take_events().len(), 2);
    }

    #[test]
    fn test_update_many_blob_length() {
        let key = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let sig = sig_bytes(&key, token(1), token(2), ONE, 1);

        let err = feed
            .update_many(
                &[token(1), token(1)],
                &[token(2), token(3)],
                &[ONE, ONE],
                &[1, 1],
                &sig,
            )
            .expect_err("one signature for two entries");
        assert_eq!(
            err,
            FeedError::MalformedBatch(BatchDefect::SignatureBlobLength {
                expected: 130,
                actual: 65,
            })
        );
        assert!(feed.take_events().is_empty());
    }

    #[test]
    fn test_update_many_batch_signed() {
        let key = OperatorKey::generate();
        let mut feed = feed_for(&key);
        let msgs = [
            UpdateMessage::new(token(1), token(2), ONE, 2),
            UpdateMessage::new(token(3), token(4), 2 * ONE, 2),
        ];
        let sig = sign_batch(&key, &msgs).expect("sign batch");

        feed.update_many_batch_signed(
            &[token(1), token(3)],
            &[token(2), token(4)],
            &[ONE, 2 * ONE],
            &[2, 2],
            &sig.to_bytes(),
        )
        .expect("signed batch");

        assert_eq!(feed.get(token(3), token(4)), RateRecord::new(2 * ONE, 2));
        assert_eq!(feed.store().len(), 2);
    }
}
