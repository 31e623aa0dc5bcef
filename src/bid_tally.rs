use crate::types::{BidCommittedEvent, BidTallyKey, MergedAuction};
use log::debug;
use std::collections::HashMap;

/// Count of `BidCommitted` logs per auction generation. Counts only grow.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BidTally {
    counts: HashMap<BidTallyKey, u64>,
}

impl BidTally {
    pub fn from_events(events: &[BidCommittedEvent]) -> Self {
        let mut tally = BidTally::default();
        tally.merge(events);
        tally
    }

    /// Replaces every count with the ones folded from `events`.
    pub fn rebuild(&mut self, events: &[BidCommittedEvent]) {
        *self = BidTally::from_events(events);
        debug!("bid tally rebuilt with {} auctions", self.counts.len());
    }

    /// Adds the counts of `events` on top of the existing ones.
    pub fn merge(&mut self, events: &[BidCommittedEvent]) {
        for evt in events {
            *self.counts.entry(BidTallyKey::from(evt)).or_insert(0) += 1;
        }
    }

    pub fn count(&self, key: &BidTallyKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn count_for(&self, auction: &MergedAuction) -> u64 {
        self.count(&auction.key())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BidTallyKey, &u64)> {
        self.counts.iter()
    }
}
