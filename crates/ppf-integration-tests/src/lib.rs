//! Integration tests for the pair price feed.
//!
//! The tests under `tests/` drive [`ppf_feed::PriceFeed`] end to end with
//! real operator signatures: single updates, per-entry signed batches,
//! batch-signed batches and operator rotation. The fixtures below are the
//! fixed operator key and token addresses every scenario shares.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p ppf-integration-tests
//! ```

use hex_literal::hex;
use ppf_crypto::secp256k1::OperatorKey;
use ppf_feed::PriceFeed;
use ppf_types::rate::encode_rate;
use ppf_types::Address;

/// Operator private key used by every scenario.
pub const OPERATOR_PK: [u8; 32] =
    hex!("b9694bb642e9721b2d5ed112a9114ff32f07f15b4a3b10a4e1651e9542c6fe2f");

/// Address derived from [`OPERATOR_PK`].
pub const OPERATOR: Address =
    Address::from_bytes(hex!("6ec28f4e814f88da2d981e6e787b786162006d39"));

/// [`OPERATOR_PK`] with its first byte changed from `b9` to `b8`.
pub const WRONG_PK: [u8; 32] =
    hex!("b8694bb642e9721b2d5ed112a9114ff32f07f15b4a3b10a4e1651e9542c6fe2f");

pub const OPERATOR_OWNER: Address = Address::from_bytes([0x0e; 20]);
pub const GUY: Address = Address::from_bytes([0x9a; 20]);

pub const TOKEN_1: Address =
    Address::from_bytes(hex!("1234123412341234123412341234123412341234"));
pub const TOKEN_2: Address =
    Address::from_bytes(hex!("5678567856785678567856785678567856785678"));
pub const TOKEN_3: Address =
    Address::from_bytes(hex!("abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd"));

/// The fixed operator key.
pub fn operator_key() -> OperatorKey {
    OperatorKey::from_bytes(&OPERATOR_PK).expect("fixture key is a valid scalar")
}

/// A fresh feed with [`OPERATOR`] as operator and [`OPERATOR_OWNER`] as owner.
pub fn new_feed() -> PriceFeed {
    PriceFeed::new(OPERATOR, OPERATOR_OWNER).expect("fixture roles are non-zero")
}

/// Fixed-point form of a whole-number rate.
pub fn rate(whole: u32) -> u128 {
    encode_rate(&whole.to_string()).expect("whole numbers always encode")
}
