//! Canonical hashes of rate updates.
//!
//! Any change to the layout below invalidates every signature already
//! issued, so the layouts are versioned through their domain ids.
//!
//! ## Layouts
//!
//! ```text
//! tuple        = base[20] || quote[20] || rate[16, BE] || when[8, BE]
//! update hash  = keccak256(PPF_V1_ID       || tuple)
//! batch hash   = keccak256(PPF_V1_BATCH_ID || tuple_0 || ... || tuple_n-1)
//! digest       = keccak256("\x19Ethereum Signed Message:\n32" || hash)
//! ```
//!
//! The operator signs the digest, not the bare hash. Single-update and
//! batch hashes use distinct domain ids, so a signature over one can never
//! be presented as the other.

use hex_literal::hex;
use ppf_crypto::keccak::{keccak256, keccak256_concat, personal_message_digest};
use ppf_types::{Hash256, UpdateMessage};

/// Domain string of the single-update hash.
pub const UPDATE_DOMAIN: &str = "PPF-v1";

/// Domain string of the whole-batch hash.
pub const BATCH_DOMAIN: &str = "PPF-v1-batch";

/// `keccak256("PPF-v1")`
pub const PPF_V1_ID: Hash256 =
    hex!("33a8ba7202230fa1cee2aac7bac322939edc7ba0a48b0989335a5f87a5770369");

/// `keccak256("PPF-v1-batch")`
pub const PPF_V1_BATCH_ID: Hash256 =
    hex!("685419e8d55470d1855af12dc5b5e9403ad52453e1227a59120d7c0a6fc10ba2");

/// Length of one packed update tuple.
pub const PACKED_UPDATE_LEN: usize = 20 + 20 + 16 + 8;

/// Pack an update into its fixed-width tuple.
pub fn pack_update(msg: &UpdateMessage) -> [u8; PACKED_UPDATE_LEN] {
    let mut out = [0u8; PACKED_UPDATE_LEN];
    out[..20].copy_from_slice(msg.base.as_bytes());
    out[20..40].copy_from_slice(msg.quote.as_bytes());
    out[40..56].copy_from_slice(&msg.rate.to_be_bytes());
    out[56..].copy_from_slice(&msg.when.to_be_bytes());
    out
}

/// Hash of a single update.
pub fn build_update_hash(msg: &UpdateMessage) -> Hash256 {
    keccak256_concat(&[&PPF_V1_ID[..], &pack_update(msg)[..]])
}

/// Hash of a whole batch, tuples in index order.
pub fn build_batch_hash(msgs: &[UpdateMessage]) -> Hash256 {
    let mut buf = Vec::with_capacity(32 + msgs.len() * PACKED_UPDATE_LEN);
    buf.extend_from_slice(&PPF_V1_BATCH_ID);
    for msg in msgs {
        buf.extend_from_slice(&pack_update(msg));
    }
    keccak256(&buf)
}

/// Digest the operator signs for a single update.
pub fn update_digest(msg: &UpdateMessage) -> Hash256 {
    personal_message_digest(&build_update_hash(msg))
}

/// Digest the operator signs for a whole batch.
pub fn batch_digest(msgs: &[UpdateMessage]) -> Hash256 {
    personal_message_digest(&build_batch_hash(msgs))
}
