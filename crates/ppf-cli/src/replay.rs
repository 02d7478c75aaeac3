//! Replay of a JSON file of feed calls against an in-memory feed.
//!
//! Each call is applied independently: a rejected call is logged and
//! leaves the feed unchanged, and the replay continues with the next one.

use anyhow::Context;
use ppf_feed::events::FeedEvent;
use ppf_feed::PriceFeed;
use ppf_types::rate::{decode_rate, encode_rate};
use ppf_types::{Address, TokenPair};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One recorded call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Submission {
    Update {
        base: Address,
        quote: Address,
        /// Decimal real rate.
        rate: String,
        when: u64,
        signature: String,
    },
    UpdateMany {
        bases: Vec<Address>,
        quotes: Vec<Address>,
        rates: Vec<String>,
        whens: Vec<u64>,
        /// Concatenated per-entry signatures.
        signatures: String,
    },
    UpdateManyBatchSigned {
        bases: Vec<Address>,
        quotes: Vec<Address>,
        rates: Vec<String>,
        whens: Vec<u64>,
        signature: String,
    },
    SetOperator {
        caller: Address,
        operator: Address,
    },
}

/// Outcome of one call.
#[derive(Debug, Clone, Serialize)]
pub struct CallResult {
    pub index: usize,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A stored rate in human-readable form.
#[derive(Debug, Clone, Serialize)]
pub struct RateView {
    pub base: Address,
    pub quote: Address,
    pub rate: String,
    pub when: u64,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub operator: Address,
    pub results: Vec<CallResult>,
    pub rates: Vec<RateView>,
    pub events: Vec<FeedEvent>,
}

fn decode_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).context("signature is not hex")
}

fn encode_rates(rates: &[String]) -> anyhow::Result<Vec<u128>> {
    rates
        .iter()
        .map(|r| encode_rate(r).with_context(|| format!("rate {r:?}")))
        .collect()
}

fn apply(feed: &mut PriceFeed, submission: &Submission) -> anyhow::Result<()> {
    match submission {
        Submission::Update {
            base,
            quote,
            rate,
            when,
            signature,
        } => {
            let rate = encode_rate(rate).with_context(|| format!("rate {rate:?}"))?;
            feed.update(*base, *quote, rate, *when, &decode_hex(signature)?)?;
        }
        Submission::UpdateMany {
            bases,
            quotes,
            rates,
            whens,
            signatures,
        } => {
            let rates = encode_rates(rates)?;
            feed.update_many(bases, quotes, &rates, whens, &decode_hex(signatures)?)?;
        }
        Submission::UpdateManyBatchSigned {
            bases,
            quotes,
            rates,
            whens,
            signature,
        } => {
            let rates = encode_rates(rates)?;
            feed.update_many_batch_signed(bases, quotes, &rates, whens, &decode_hex(signature)?)?;
        }
        Submission::SetOperator { caller, operator } => {
            feed.set_operator(*caller, *operator)?;
        }
    }
    Ok(())
}

/// Apply every submission in order and report the resulting state.
pub fn replay(feed: &mut PriceFeed, submissions: &[Submission]) -> ReplayReport {
    let mut results = Vec::with_capacity(submissions.len());
    for (index, submission) in submissions.iter().enumerate() {
        match apply(feed, submission) {
            Ok(()) => {
                info!(index, "call accepted");
                results.push(CallResult {
                    index,
                    accepted: true,
                    error: None,
                });
            }
            Err(e) => {
                warn!(index, error = %e, "call rejected");
                results.push(CallResult {
                    index,
                    accepted: false,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    let rates = feed
        .store()
        .snapshot()
        .into_iter()
        .map(|(TokenPair { base, quote }, record)| RateView {
            base,
            quote,
            rate: decode_rate(record.rate),
            when: record.when,
        })
        .collect();

    ReplayReport {
        operator: feed.operator(),
        results,
        rates,
        events: feed.take_events(),
    }
}
