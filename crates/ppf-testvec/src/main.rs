//! Test vector generator for the pair price feed signing protocol.
//!
//! Generates `test_vectors.json` with the domain ids, update and batch
//! hashes, the digests the operator signs, and deterministic signatures
//! from a fixed operator key together with the address they recover to.
//! Off-chain signers check their output against this file.
//!
//! Usage:
//!   ppf-testvec              # Generate test_vectors.json
//!   ppf-testvec --verify     # Verify test vectors match expected values

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use ppf_crypto::keccak::keccak256;
use ppf_crypto::secp256k1::{recover_address, OperatorKey};
use ppf_feed::hash::{
    batch_digest, build_batch_hash, build_update_hash, update_digest, BATCH_DOMAIN,
    UPDATE_DOMAIN,
};
use ppf_feed::signer::{sign_batch, sign_update, sign_update_many};
use ppf_types::rate::{decode_rate, encode_rate};
use ppf_types::{Address, UpdateMessage};
use serde::{Deserialize, Serialize};

const VECTORS_PATH: &str = "tests/fixtures/test_vectors.json";

const OPERATOR_PK: &str = "b9694bb642e9721b2d5ed112a9114ff32f07f15b4a3b10a4e1651e9542c6fe2f";
const TOKEN_1: &str = "0x1234123412341234123412341234123412341234";
const TOKEN_2: &str = "0x5678567856785678567856785678567856785678";
const TOKEN_3: &str = "0xabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd";

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

fn entry(k: &str, v: impl Into<String>) -> (String, String) {
    (k.to_string(), v.into())
}

fn message_inputs(msg: &UpdateMessage) -> BTreeMap<String, String> {
    BTreeMap::from([
        entry("base", msg.base.to_string()),
        entry("quote", msg.quote.to_string()),
        entry("rate", decode_rate(msg.rate)),
        entry("rate_fixed", msg.rate.to_string()),
        entry("when", msg.when.to_string()),
    ])
}

fn generate_domain_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();

    for (name, domain) in [("domain_update", UPDATE_DOMAIN), ("domain_batch", BATCH_DOMAIN)] {
        vectors.insert(
            name.to_string(),
            TestVector {
                description: format!("keccak256(\"{domain}\")"),
                inputs: BTreeMap::from([entry("domain", domain)]),
                outputs: BTreeMap::from([entry("id", hex::encode(keccak256(domain.as_bytes())))]),
            },
        );
    }

    vectors
}

fn generate_update_vectors(key: &OperatorKey) -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let cases = [
        ("update_rate_2_when_1", TOKEN_1, TOKEN_2, "2", 1u64),
        ("update_rate_4_when_6", TOKEN_1, TOKEN_2, "4", 6),
        ("update_swapped_pair", TOKEN_2, TOKEN_1, "4", 6),
        ("update_fractional_rate", TOKEN_1, TOKEN_3, "0.000123", 42),
    ];

    for (name, base, quote, rate, when) in cases {
        let msg = UpdateMessage::new(base.parse()?, quote.parse()?, encode_rate(rate)?, when);
        let digest = update_digest(&msg);
        let sig = sign_update(key, &msg)?;
        let recovered = recover_address(&digest, &sig)?;

        let mut inputs = message_inputs(&msg);
        inputs.insert("operator_pk".to_string(), OPERATOR_PK.to_string());

        vectors.insert(
            name.to_string(),
            TestVector {
                description: "keccak256(PPF_V1_ID || base || quote || rate_u128_be || when_u64_be), \
                              signed as a personal message"
                    .to_string(),
                inputs,
                outputs: BTreeMap::from([
                    entry("update_hash", hex::encode(build_update_hash(&msg))),
                    entry("digest", hex::encode(digest)),
                    entry("signature", hex::encode(sig.to_bytes())),
                    entry("signature_legacy_v", hex::encode(sig.to_legacy()?.to_bytes())),
                    entry("signer", recovered.to_string()),
                ]),
            },
        );
    }

    Ok(vectors)
}

fn generate_batch_vectors(key: &OperatorKey) -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let token_1: Address = TOKEN_1.parse()?;
    let msgs = [
        UpdateMessage::new(token_1, TOKEN_2.parse()?, encode_rate("4")?, 1),
        UpdateMessage::new(token_1, TOKEN_3.parse()?, encode_rate("4")?, 1),
    ];

    let mut inputs = BTreeMap::new();
    for (i, msg) in msgs.iter().enumerate() {
        for (k, v) in message_inputs(msg) {
            inputs.insert(format!("{k}_{i}"), v);
        }
    }
    inputs.insert("operator_pk".to_string(), OPERATOR_PK.to_string());

    let blob = sign_update_many(key, &msgs)?;
    vectors.insert(
        "update_many_per_entry".to_string(),
        TestVector {
            description: "Concatenated per-entry signatures, 65 bytes each, index order"
                .to_string(),
            inputs: inputs.clone(),
            outputs: BTreeMap::from([
                entry("signature_blob", hex::encode(&blob)),
                entry("blob_len", blob.len().to_string()),
            ]),
        },
    );

    let digest = batch_digest(&msgs);
    let sig = sign_batch(key, &msgs)?;
    vectors.insert(
        "update_many_batch_signed".to_string(),
        TestVector {
            description: "keccak256(PPF_V1_BATCH_ID || tuple_0 || tuple_1), \
                          signed as a personal message"
                .to_string(),
            inputs,
            outputs: BTreeMap::from([
                entry("batch_hash", hex::encode(build_batch_hash(&msgs))),
                entry("digest", hex::encode(digest)),
                entry("signature", hex::encode(sig.to_bytes())),
                entry("signer", recover_address(&digest, &sig)?.to_string()),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let key = OperatorKey::from_hex(OPERATOR_PK)?;
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_domain_vectors());
    all_vectors.extend(generate_update_vectors(&key)?);
    all_vectors.extend(generate_batch_vectors(&key)?);

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "ppf-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        if let Some(actual) = regenerated.vectors.get(name) {
            if actual.outputs != expected.outputs {
                eprintln!("FAIL: {name}");
                eprintln!("  expected: {:?}", expected.outputs);
                eprintln!("  actual:   {:?}", actual.outputs);
                all_pass = false;
            } else {
                eprintln!("PASS: {name}");
            }
        } else {
            eprintln!("MISSING: {name}");
            all_pass = false;
        }
    }

    Ok(all_pass)
}

fn write_vectors(vectors: &TestVectors) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(vectors)?;
    if let Some(parent) = std::path::Path::new(VECTORS_PATH).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(VECTORS_PATH, &json).with_context(|| format!("writing {VECTORS_PATH}"))?;
    eprintln!("Generated {} test vectors to {VECTORS_PATH}", vectors.vectors.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let vectors = if args.iter().any(|a| a == "--verify") {
        match std::fs::read_to_string(VECTORS_PATH) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("parsing {VECTORS_PATH}"))?,
            Err(_) => {
                eprintln!("No existing test vectors found at {VECTORS_PATH}. Generating...");
                let vectors = generate_all_vectors()?;
                write_vectors(&vectors)?;
                vectors
            }
        }
    } else {
        let vectors = generate_all_vectors()?;
        write_vectors(&vectors)?;
        vectors
    };

    if !verify_vectors(&vectors)? {
        bail!("test vector verification failed");
    }
    eprintln!("All test vectors verified successfully.");
    Ok(())
}
