#![cfg(test)]

mod common;

use anyhow::Result;
use common::{bid_event, contract_info, created_event, MockChain, TOKEN_A, TOKEN_B};
use ethers::types::{Address, U256};
use sealed_bid_client::{
    feed::{AuctionFeed, DuplicatePolicy},
    types::{LiveLog, MergedAuction, Phase},
    utils::{render_rows, TokenRegistry},
};

fn start_times(feed: &AuctionFeed) -> Vec<u64> {
    feed.auctions().iter().map(|a| a.event.start_time).collect()
}

fn live(token: [u8; 20], token_id: u64, start_time: u64) -> MergedAuction {
    MergedAuction {
        event: created_event(token, token_id, 0, start_time),
        contract_info: contract_info(0, true, start_time + 1_000, start_time + 2_000),
    }
}

#[tokio::test]
async fn test_history_is_sorted_newest_first() -> Result<()> {
    let chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 1_000, 2_000)
        .with_live_auction(created_event(TOKEN_A, 2, 0, 300), 1_000, 2_000)
        .with_live_auction(created_event(TOKEN_A, 3, 0, 200), 1_000, 2_000);

    let mut feed = AuctionFeed::default();
    feed.load_history(&chain, 0).await?;

    assert_eq!(start_times(&feed), vec![300, 200, 100]);

    Ok(())
}

#[tokio::test]
async fn test_history_skips_failed_reads() -> Result<()> {
    let chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 1_000, 2_000)
        .with_live_auction(created_event(TOKEN_B, 2, 0, 300), 1_000, 2_000)
        .with_live_auction(created_event(TOKEN_A, 3, 0, 200), 1_000, 2_000)
        .with_failing_read(TOKEN_B, 2);

    let mut feed = AuctionFeed::default();
    feed.load_history(&chain, 0).await?;

    assert_eq!(start_times(&feed), vec![200, 100]);

    Ok(())
}

#[tokio::test]
async fn test_history_replaces_list() -> Result<()> {
    let chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 1_000, 2_000);

    let mut feed = AuctionFeed::default();
    feed.load_history(&chain, 0).await?;
    feed.load_history(&chain, 0).await?;

    assert_eq!(feed.auctions().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_live_batch_before_history_survives() -> Result<()> {
    let chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 1_000, 2_000)
        .with_live_auction(created_event(TOKEN_A, 2, 0, 200), 1_000, 2_000);

    let mut feed = AuctionFeed::default();

    // mined after the history snapshot was taken
    feed.apply_live_batch(vec![live(TOKEN_B, 9, 500)]);
    // also part of history
    feed.apply_live_batch(vec![live(TOKEN_A, 2, 200)]);

    feed.load_history(&chain, 0).await?;

    assert_eq!(start_times(&feed), vec![500, 200, 100]);

    Ok(())
}

#[test]
fn test_live_batch_is_prepended_sorted() {
    let mut feed = AuctionFeed::default();
    feed.apply_history(vec![live(TOKEN_A, 1, 100), live(TOKEN_A, 2, 200)], 0);

    feed.apply_live_batch(vec![live(TOKEN_B, 3, 250), live(TOKEN_B, 4, 400)]);

    assert_eq!(start_times(&feed), vec![400, 250, 200, 100]);
}

#[test]
fn test_live_duplicates_are_kept_by_default() {
    let mut feed = AuctionFeed::new(DuplicatePolicy::Keep);
    feed.apply_history(vec![live(TOKEN_A, 1, 100)], 0);

    feed.apply_live_batch(vec![live(TOKEN_A, 1, 100)]);

    assert_eq!(feed.auctions().len(), 2);
}

#[test]
fn test_live_duplicates_can_be_skipped() {
    let mut feed = AuctionFeed::new(DuplicatePolicy::from_flag(true));
    feed.apply_history(vec![live(TOKEN_A, 1, 100)], 0);

    feed.apply_live_batch(vec![
        live(TOKEN_A, 1, 100),
        live(TOKEN_B, 2, 300),
        live(TOKEN_B, 2, 300),
    ]);

    assert_eq!(start_times(&feed), vec![300, 100]);
}

#[tokio::test]
async fn test_on_live_batch_merges_snapshot() {
    let newer = created_event(TOKEN_A, 1, 1, 900);
    let chain = MockChain::default()
        .with_live_auction(newer.clone(), 1_000, 2_000);

    let mut feed = AuctionFeed::default();
    let batch = vec![
        LiveLog::new(created_event(TOKEN_A, 1, 0, 100), Some(7)),
        LiveLog::new(newer, Some(8)),
    ];
    feed.on_live_batch(&chain, batch).await;

    let phases: Vec<Phase> = feed
        .phases(950)
        .into_iter()
        .map(|(_, phase)| phase)
        .collect();

    assert_eq!(start_times(&feed), vec![900, 100]);
    assert_eq!(phases, vec![Phase::AcceptingBids, Phase::Ended]);
}

#[tokio::test]
async fn test_bid_history_then_live_bids() -> Result<()> {
    let mut chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 1_000, 2_000);
    chain.bids = vec![bid_event(TOKEN_A, 1, 0), bid_event(TOKEN_A, 1, 0)];

    let mut feed = AuctionFeed::default();
    feed.load_history(&chain, 0).await?;
    feed.load_bid_history(&chain, 0).await?;
    feed.on_live_bid_batch(vec![LiveLog::new(bid_event(TOKEN_A, 1, 0), Some(1))]);

    let auction = &feed.auctions()[0];
    assert_eq!(feed.bid_count(auction), 3);

    // a rebuild starts over from the chain logs
    feed.load_bid_history(&chain, 0).await?;
    assert_eq!(feed.bid_count(&feed.auctions()[0]), 2);

    Ok(())
}

#[tokio::test]
async fn test_live_bids_already_in_history_are_not_counted_twice() -> Result<()> {
    let mut chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 1_000, 2_000)
        .with_head(10);
    chain.bids = vec![bid_event(TOKEN_A, 1, 0)];

    let mut feed = AuctionFeed::default();
    feed.load_history(&chain, 0).await?;
    feed.load_bid_history(&chain, 0).await?;

    // the subscription buffered the same bid while history was being read
    feed.on_live_bid_batch(vec![
        LiveLog::new(bid_event(TOKEN_A, 1, 0), Some(10)),
        LiveLog::new(bid_event(TOKEN_A, 1, 0), Some(11)),
        LiveLog::new(bid_event(TOKEN_A, 1, 0), None),
    ]);

    assert_eq!(feed.bid_count(&feed.auctions()[0]), 3);

    Ok(())
}

#[tokio::test]
async fn test_live_auctions_already_in_history_are_dropped() -> Result<()> {
    let first = created_event(TOKEN_A, 1, 0, 100);
    let second = created_event(TOKEN_B, 2, 0, 300);
    let chain = MockChain::default()
        .with_live_auction(first.clone(), 1_000, 2_000)
        .with_live_auction(second.clone(), 1_000, 2_000)
        .with_head(10);

    let mut feed = AuctionFeed::new(DuplicatePolicy::Keep);
    feed.load_history(&chain, 0).await?;

    feed.on_live_batch(&chain, vec![LiveLog::new(first, Some(9))]).await;
    assert_eq!(start_times(&feed), vec![300, 100]);

    let third = created_event(TOKEN_A, 1, 1, 500);
    let fresh = feed.fresh_auctions(vec![
        LiveLog::new(second, Some(10)),
        LiveLog::new(third.clone(), Some(11)),
    ]);
    assert_eq!(fresh, vec![third]);

    Ok(())
}

#[test]
fn test_live_logs_are_kept_before_any_history() {
    let feed = AuctionFeed::default();

    let batch = vec![LiveLog::new(created_event(TOKEN_A, 1, 0, 100), Some(3))];
    let fresh = feed.fresh_auctions(batch);

    assert_eq!(fresh.len(), 1);
}

#[test]
fn test_mark_ended_and_lookup() {
    let mut feed = AuctionFeed::default();
    feed.apply_history(vec![live(TOKEN_A, 1, 100), live(TOKEN_B, 2, 200)], 0);

    let key = feed.auctions()[1].key();
    assert!(feed.mark_ended(&key));
    assert_eq!(Phase::resolve(150, &feed.auctions()[1]), Phase::Ended);

    let unknown = live(TOKEN_B, 7, 0).key();
    assert!(!feed.mark_ended(&unknown));
    assert!(feed.find(&unknown).is_none());

    let latest = feed.latest_for_token(Address::from(TOKEN_B), U256::from(2));
    assert_eq!(latest.map(|a| a.event.start_time), Some(200));
}

#[test]
fn test_rows_follow_the_clock() {
    let mut feed = AuctionFeed::default();
    feed.apply_history(vec![live(TOKEN_A, 1, 100)], 0);
    feed.merge_bids(&[bid_event(TOKEN_A, 1, 0)]);

    let registry = TokenRegistry::default();

    let before = render_rows(&feed, 50, &registry);
    let during = render_rows(&feed, 1_500, &registry);

    assert_eq!(before[0].phase, Phase::NotStarted);
    assert_eq!(during[0].phase, Phase::RevealWindow);
    assert_eq!(during[0].bids_submitted, 1);
    assert_eq!(during[0].end_time, 2_100);
    assert!(during[0].to_string().contains("| Open | Reveal Bid"));
}
