use crate::{
    bid_tally::BidTally,
    chain_provider::AuctionSource,
    merger::fetch_and_merge_all,
    types::{AuctionCreatedEvent, BidCommittedEvent, BidTallyKey, LiveLog, MergedAuction, Phase},
};
use anyhow::Result;
use ethers::types::{Address, U256};
use log::{debug, info};
use std::collections::HashSet;

/// What a live batch does with an auction generation that is already listed.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub enum DuplicatePolicy {
    /// prepend anyway, the list may hold the same generation twice
    #[default]
    Keep,
    /// drop incoming entries whose key is already listed
    Skip,
}

impl DuplicatePolicy {
    pub fn from_flag(dedupe: bool) -> Self {
        if dedupe {
            DuplicatePolicy::Skip
        } else {
            DuplicatePolicy::Keep
        }
    }
}

/// Owns the auction list (newest start first) and the bid tally. Both are
/// only changed through the methods below.
///
/// Each history load records the last block it read. Live logs mined at or
/// before that block were already part of the history and are dropped.
#[derive(Debug, Default)]
pub struct AuctionFeed {
    auctions: Vec<MergedAuction>,
    bids: BidTally,
    duplicate_policy: DuplicatePolicy,
    auctions_synced_to: Option<u64>,
    bids_synced_to: Option<u64>,
}

fn drop_covered<T>(batch: Vec<LiveLog<T>>, synced_to: Option<u64>, kind: &str) -> Vec<T> {
    let total = batch.len();
    let fresh: Vec<T> = batch
        .into_iter()
        .filter(|log| !log.is_covered_by(synced_to))
        .map(|log| log.event)
        .collect();

    if fresh.len() < total {
        debug!(
            "dropped {} live {} logs already read by history",
            total - fresh.len(),
            kind
        );
    }

    fresh
}

fn sort_by_start_desc(auctions: &mut [MergedAuction]) {
    auctions.sort_by(|a, b| b.event.start_time.cmp(&a.event.start_time));
}

impl AuctionFeed {
    pub fn new(duplicate_policy: DuplicatePolicy) -> Self {
        AuctionFeed {
            duplicate_policy,
            ..Default::default()
        }
    }

    pub fn auctions(&self) -> &[MergedAuction] {
        &self.auctions
    }

    pub fn bids(&self) -> &BidTally {
        &self.bids
    }

    pub fn bid_count(&self, auction: &MergedAuction) -> u64 {
        self.bids.count_for(auction)
    }

    pub fn find(&self, key: &BidTallyKey) -> Option<&MergedAuction> {
        self.auctions.iter().find(|auction| &auction.key() == key)
    }

    /// Newest listed generation for a token.
    pub fn latest_for_token(
        &self,
        token_contract: Address,
        token_id: U256,
    ) -> Option<&MergedAuction> {
        self.auctions
            .iter()
            .filter(|auction| {
                auction.event.token_contract == token_contract
                    && auction.event.token_id == token_id
            })
            .max_by_key(|auction| auction.event.auction_index)
    }

    /// Every listed auction with the phase it is in at `now`.
    pub fn phases(&self, now: u64) -> Vec<(&MergedAuction, Phase)> {
        self.auctions
            .iter()
            .map(|auction| (auction, Phase::resolve(now, auction)))
            .collect()
    }

    /// Replaces the list with the merged history read up to `synced_to`.
    /// Entries that only a live batch has delivered so far are kept.
    pub fn apply_history(&mut self, history: Vec<MergedAuction>, synced_to: u64) {
        let history_keys: HashSet<BidTallyKey> = history.iter().map(MergedAuction::key).collect();

        let mut auctions: Vec<MergedAuction> = self
            .auctions
            .drain(..)
            .filter(|auction| !history_keys.contains(&auction.key()))
            .collect();

        if !auctions.is_empty() {
            debug!(
                "keeping {} live auctions missing from history",
                auctions.len()
            );
        }

        auctions.extend(history);
        sort_by_start_desc(&mut auctions);

        self.auctions = auctions;
        self.auctions_synced_to = Some(synced_to);
    }

    /// Live creation logs that history has not returned yet.
    pub fn fresh_auctions(
        &self,
        batch: Vec<LiveLog<AuctionCreatedEvent>>,
    ) -> Vec<AuctionCreatedEvent> {
        drop_covered(batch, self.auctions_synced_to, "auction created")
    }

    /// Sorts the batch and puts it in front of the current list.
    pub fn apply_live_batch(&mut self, mut batch: Vec<MergedAuction>) {
        if self.duplicate_policy == DuplicatePolicy::Skip {
            let mut seen: HashSet<BidTallyKey> =
                self.auctions.iter().map(MergedAuction::key).collect();
            batch.retain(|auction| seen.insert(auction.key()));
        }

        sort_by_start_desc(&mut batch);

        batch.append(&mut self.auctions);
        self.auctions = batch;
    }

    /// Replaces the tally with the bid history read up to `synced_to`.
    pub fn rebuild_bids(&mut self, events: &[BidCommittedEvent], synced_to: u64) {
        self.bids.rebuild(events);
        self.bids_synced_to = Some(synced_to);
    }

    pub fn merge_bids(&mut self, events: &[BidCommittedEvent]) {
        self.bids.merge(events);
    }

    /// Closes a generation locally once its `endAuction` transaction landed.
    pub fn mark_ended(&mut self, key: &BidTallyKey) -> bool {
        match self
            .auctions
            .iter_mut()
            .find(|auction| &auction.key() == key)
        {
            Some(auction) => {
                auction.contract_info.status = false;
                true
            }
            None => false,
        }
    }

    pub async fn load_history<S: AuctionSource>(
        &mut self,
        source: &S,
        from_block: u64,
    ) -> Result<()> {
        let (merged, synced_to) = fetch_history(source, from_block).await?;
        self.apply_history(merged, synced_to);

        info!("auction history loaded: {} auctions", self.auctions.len());

        Ok(())
    }

    pub async fn on_live_batch<S: AuctionSource>(
        &mut self,
        source: &S,
        batch: Vec<LiveLog<AuctionCreatedEvent>>,
    ) {
        let events = self.fresh_auctions(batch);
        let merged = fetch_and_merge_all(source, events).await;
        self.apply_live_batch(merged);
    }

    pub async fn load_bid_history<S: AuctionSource>(
        &mut self,
        source: &S,
        from_block: u64,
    ) -> Result<()> {
        let synced_to = source.head_block().await?;
        let events = source.bid_committed_events(from_block, synced_to).await?;
        self.rebuild_bids(&events, synced_to);

        info!("bid history loaded: {} bids", events.len());

        Ok(())
    }

    pub fn on_live_bid_batch(&mut self, batch: Vec<LiveLog<BidCommittedEvent>>) {
        let events = drop_covered(batch, self.bids_synced_to, "bid committed");
        self.merge_bids(&events);
    }
}

/// History fetch without holding the feed, for callers that share it
/// behind a lock. Also returns the last block the query covered.
pub async fn fetch_history<S: AuctionSource>(
    source: &S,
    from_block: u64,
) -> Result<(Vec<MergedAuction>, u64)> {
    let synced_to = source.head_block().await?;
    let events = source.auction_created_events(from_block, synced_to).await?;
    debug!(
        "{} auction created events in history up to block {}",
        events.len(),
        synced_to
    );

    Ok((fetch_and_merge_all(source, events).await, synced_to))
}
