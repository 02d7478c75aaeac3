//! Latest accepted rate record per ordered token pair.
//!
//! Records are written only by [`crate::processor`] and [`crate::batch`]
//! after an update has passed validation.

use std::collections::HashMap;

use ppf_types::{RateRecord, TokenPair};

/// In-memory rate store.
#[derive(Debug, Clone, Default)]
pub struct RateStore {
    records: HashMap<TokenPair, RateRecord>,
}

impl RateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored record, or the empty record if the pair was never set.
    pub fn get(&self, pair: &TokenPair) -> RateRecord {
        self.records.get(pair).copied().unwrap_or_default()
    }

    /// The stored record, if any.
    pub fn lookup(&self, pair: &TokenPair) -> Option<&RateRecord> {
        self.records.get(pair)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records sorted by pair.
    pub fn snapshot(&self) -> Vec<(TokenPair, RateRecord)> {
        let mut entries: Vec<_> = self.records.iter().map(|(p, r)| (*p, *r)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub(crate) fn insert(&mut self, pair: TokenPair, record: RateRecord) {
        self.records.insert(pair, record);
    }
}
