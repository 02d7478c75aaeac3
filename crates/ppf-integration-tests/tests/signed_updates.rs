//! Integration test: single signed updates against a fixed operator key.
//!
//! Covers the signature scenarios an off-chain signer must interoperate with:
//! 1. A valid signature writes the record
//! 2. Legacy `0/1` recovery indicators are accepted
//! 3. A signature from a different key is rejected
//! 4. Any change to the signed fields invalidates the signature
//! 5. An out-of-range recovery indicator is rejected
//! 6. Equal timestamps are stale and leave the stored record alone

use ppf_crypto::secp256k1::{OperatorKey, RecoverableSignature};
use ppf_feed::events::FeedEvent;
use ppf_feed::signer::sign_update;
use ppf_feed::FeedError;
use ppf_integration_tests::{
    new_feed, operator_key, rate, OPERATOR, TOKEN_1, TOKEN_2, TOKEN_3, WRONG_PK,
};
use ppf_types::rate::decode_rate;
use ppf_types::{RateRecord, UpdateMessage};

fn signed(base_rate: u32, when: u64) -> (UpdateMessage, RecoverableSignature) {
    let msg = UpdateMessage::new(TOKEN_1, TOKEN_2, rate(base_rate), when);
    let sig = sign_update(&operator_key(), &msg).expect("sign");
    (msg, sig)
}

fn is_signature_rejection(err: &FeedError) -> bool {
    matches!(
        err,
        FeedError::Unauthorized { .. } | FeedError::InvalidSignature(_)
    )
}

#[test]
fn valid_signature_updates_record() {
    let mut feed = new_feed();
    let (msg, sig) = signed(4, 6);

    feed.update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &sig.to_bytes())
        .expect("valid update");

    let record = feed.get(TOKEN_1, TOKEN_2);
    assert_eq!(decode_rate(record.rate), "4");
    assert_eq!(record.when, 6);
    assert_eq!(feed.take_events(), vec![FeedEvent::set_rate(&msg)]);
}

#[test]
fn legacy_recovery_indicator_is_accepted() {
    let mut feed = new_feed();
    let (msg, sig) = signed(1, 3);
    assert!(sig.v() == 27 || sig.v() == 28, "signer emits standard v");

    let legacy = sig.to_legacy().expect("legacy form");
    assert!(legacy.v() <= 1);

    feed.update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &legacy.to_bytes())
        .expect("legacy v accepted");
    assert_eq!(feed.get(TOKEN_1, TOKEN_2), RateRecord::new(rate(1), 3));
}

#[test]
fn wrong_private_key_is_rejected() {
    let mut feed = new_feed();
    let wrong = OperatorKey::from_bytes(&WRONG_PK).expect("wrong key");
    assert_ne!(wrong.address(), OPERATOR);

    let msg = UpdateMessage::new(TOKEN_1, TOKEN_2, rate(2), 1);
    let sig = sign_update(&wrong, &msg).expect("sign");

    let err = feed
        .update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &sig.to_bytes())
        .expect_err("wrong signer");
    match err {
        FeedError::Unauthorized { signer, operator } => {
            assert_eq!(signer, wrong.address());
            assert_eq!(operator, OPERATOR);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(feed.get(TOKEN_1, TOKEN_2).is_empty());
    assert!(feed.take_events().is_empty());
}

#[test]
fn swapped_pair_is_rejected() {
    let mut feed = new_feed();
    let (msg, sig) = signed(4, 6);

    let err = feed
        .update(TOKEN_2, TOKEN_1, msg.rate, msg.when, &sig.to_bytes())
        .expect_err("swapped pair");
    assert!(is_signature_rejection(&err), "got {err}");
    assert!(feed.get(TOKEN_2, TOKEN_1).is_empty());
}

#[test]
fn changed_rate_is_rejected() {
    let mut feed = new_feed();
    let (msg, sig) = signed(4, 6);

    let err = feed
        .update(TOKEN_1, TOKEN_2, rate(5), msg.when, &sig.to_bytes())
        .expect_err("rate differs");
    assert!(is_signature_rejection(&err), "got {err}");
    assert!(feed.get(TOKEN_1, TOKEN_2).is_empty());
}

#[test]
fn changed_when_is_rejected() {
    let mut feed = new_feed();
    let (msg, sig) = signed(4, 6);

    let err = feed
        .update(TOKEN_1, TOKEN_2, msg.rate, msg.when + 1, &sig.to_bytes())
        .expect_err("when differs");
    assert!(is_signature_rejection(&err), "got {err}");
    assert!(feed.get(TOKEN_1, TOKEN_2).is_empty());
}

#[test]
fn invalid_recovery_indicator_is_rejected() {
    let mut feed = new_feed();
    let (msg, sig) = signed(4, 6);

    let mut bytes = sig.to_bytes();
    bytes[64] = 0xff;

    let err = feed
        .update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &bytes)
        .expect_err("v is invalid");
    assert!(matches!(err, FeedError::InvalidSignature(_)), "got {err}");
}

#[test]
fn short_signature_is_rejected() {
    let mut feed = new_feed();
    let (msg, sig) = signed(4, 6);

    let err = feed
        .update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &sig.to_bytes()[..64])
        .expect_err("64 bytes");
    assert!(matches!(err, FeedError::InvalidSignature(_)), "got {err}");
}

#[test]
fn equal_when_is_stale() {
    let mut feed = new_feed();
    let (first, first_sig) = signed(2, 1);
    feed.update(TOKEN_1, TOKEN_2, first.rate, first.when, &first_sig.to_bytes())
        .expect("first update");

    let (second, second_sig) = signed(5, 1);
    let err = feed
        .update(TOKEN_1, TOKEN_2, second.rate, second.when, &second_sig.to_bytes())
        .expect_err("same when");
    assert!(
        matches!(err, FeedError::StaleUpdate { stored: 1, incoming: 1, .. }),
        "got {err}"
    );
    assert_eq!(feed.get(TOKEN_1, TOKEN_2), RateRecord::new(rate(2), 1));
}

#[test]
fn replayed_signature_is_stale() {
    let mut feed = new_feed();
    let (msg, sig) = signed(2, 7);
    feed.update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &sig.to_bytes())
        .expect("first");

    let err = feed
        .update(TOKEN_1, TOKEN_2, msg.rate, msg.when, &sig.to_bytes())
        .expect_err("replay");
    assert!(matches!(err, FeedError::StaleUpdate { .. }));
}

#[test]
fn older_update_after_newer_is_stale() {
    let mut feed = new_feed();
    let (newer, newer_sig) = signed(3, 10);
    let (older, older_sig) = signed(9, 4);

    feed.update(TOKEN_1, TOKEN_2, newer.rate, newer.when, &newer_sig.to_bytes())
        .expect("newer");
    let err = feed
        .update(TOKEN_1, TOKEN_2, older.rate, older.when, &older_sig.to_bytes())
        .expect_err("older");
    assert!(matches!(err, FeedError::StaleUpdate { stored: 10, incoming: 4, .. }));
    assert_eq!(feed.get(TOKEN_1, TOKEN_2), RateRecord::new(rate(3), 10));
}

#[test]
fn pairs_are_directional() {
    let mut feed = new_feed();
    let key = operator_key();

    let forward = UpdateMessage::new(TOKEN_1, TOKEN_3, rate(2), 5);
    let reverse = UpdateMessage::new(TOKEN_3, TOKEN_1, rate(7), 2);
    for msg in [&forward, &reverse] {
        let sig = sign_update(&key, msg).expect("sign");
        feed.update(msg.base, msg.quote, msg.rate, msg.when, &sig.to_bytes())
            .expect("update");
    }

    assert_eq!(feed.get(TOKEN_1, TOKEN_3), forward.record());
    assert_eq!(feed.get(TOKEN_3, TOKEN_1), reverse.record());
}

#[test]
fn same_token_pair_is_rejected() {
    let mut feed = new_feed();
    let msg = UpdateMessage::new(TOKEN_1, TOKEN_1, rate(1), 1);
    let sig = sign_update(&operator_key(), &msg).expect("sign");

    let err = feed
        .update(TOKEN_1, TOKEN_1, msg.rate, msg.when, &sig.to_bytes())
        .expect_err("base == quote");
    assert_eq!(err, FeedError::EqualBaseQuote(TOKEN_1));
}
