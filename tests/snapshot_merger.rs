#![cfg(test)]

mod common;

use anyhow::Result;
use common::{contract_info, created_event, MockChain, TOKEN_A, TOKEN_B};
use ethers::types::{Address, U256};
use sealed_bid_client::{
    merger::{fetch_and_merge, fetch_and_merge_all, merge_snapshot},
    types::Phase,
};

#[test]
fn test_superseded_generation_is_closed() {
    let event = created_event(TOKEN_A, 1, 2, 1_000);
    let info = contract_info(3, true, 5_000, 9_999);

    let merged = merge_snapshot(event.clone(), info);

    assert!(!merged.contract_info.status);
    assert_eq!(
        merged.contract_info.end_of_reveal_period,
        event.end_time
    );
    assert!(merged.is_superseded());
    assert_eq!(Phase::resolve(1_500, &merged), Phase::Ended);
}

#[test]
fn test_live_generation_is_untouched() {
    let event = created_event(TOKEN_A, 1, 3, 1_000);
    let info = contract_info(3, true, 5_000, 9_999);

    let merged = merge_snapshot(event.clone(), info.clone());

    assert_eq!(merged.contract_info, info);
    assert_eq!(merged.event, event);
    assert!(!merged.is_superseded());
}

#[tokio::test]
async fn test_fetch_and_merge_reads_current_record() -> Result<()> {
    let old = created_event(TOKEN_A, 1, 0, 1_000);
    let current = created_event(TOKEN_A, 1, 1, 4_000);
    let chain = MockChain::default()
        .with_live_auction(current.clone(), 5_000, 6_000);

    let merged_old = fetch_and_merge(&chain, old.clone()).await?;
    let merged_current = fetch_and_merge(&chain, current).await?;

    assert!(!merged_old.contract_info.status);
    assert_eq!(
        merged_old.contract_info.end_of_reveal_period,
        old.end_time
    );
    assert!(merged_current.contract_info.status);
    assert_eq!(
        merged_current.contract_info.end_of_reveal_period,
        6_000
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_read_only_drops_its_auction() -> Result<()> {
    let chain = MockChain::default()
        .with_live_auction(created_event(TOKEN_A, 1, 0, 100), 200, 300)
        .with_live_auction(created_event(TOKEN_B, 2, 0, 300), 400, 500)
        .with_failing_read(TOKEN_B, 2);

    let merged = fetch_and_merge_all(&chain, chain.created.clone()).await;

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].event.token_contract, Address::from(TOKEN_A));
    assert_eq!(merged[0].event.token_id, U256::from(1));

    let failing = created_event(TOKEN_B, 2, 0, 300);
    assert!(fetch_and_merge(&chain, failing).await.is_err());

    Ok(())
}
