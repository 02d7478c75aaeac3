//! Events emitted by accepted feed calls.
//!
//! Rejected calls emit nothing. The feed buffers events until the caller
//! drains them with [`crate::PriceFeed::take_events`].

use ppf_types::{Address, UpdateMessage};
use serde::Serialize;

/// A state change the feed accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum FeedEvent {
    /// A rate record was written.
    SetRate {
        base: Address,
        quote: Address,
        rate: u128,
        when: u64,
    },
    /// The operator was replaced.
    SetOperator { operator: Address },
    /// The operator owner was replaced.
    SetOperatorOwner { owner: Address },
}

impl FeedEvent {
    pub fn set_rate(msg: &UpdateMessage) -> Self {
        Self::SetRate {
            base: msg.base,
            quote: msg.quote,
            rate: msg.rate,
            when: msg.when,
        }
    }
}
