use crate::{
    chain_provider::AuctionSource,
    types::{AuctionContractInfo, AuctionCreatedEvent, MergedAuction},
};
use anyhow::Result;
use futures::future::join_all;
use log::{debug, warn};

/// Joins a creation event with the contract state read for its token.
///
/// A newer auction for the same token replaces the on-chain record, so an
/// index mismatch means the event belongs to a closed generation: it is
/// forced closed and its reveal period ends at the event's `end_time`.
pub fn merge_snapshot(
    event: AuctionCreatedEvent,
    mut contract_info: AuctionContractInfo,
) -> MergedAuction {
    if contract_info.index != event.auction_index {
        debug!(
            "index mismatch for {:?} #{}: event {} chain {}. old auction",
            event.token_contract, event.token_id, event.auction_index, contract_info.index
        );
        contract_info.status = false;
        contract_info.end_of_reveal_period = event.end_time;
    }

    MergedAuction {
        event,
        contract_info,
    }
}

pub async fn fetch_and_merge<S: AuctionSource>(
    source: &S,
    event: AuctionCreatedEvent,
) -> Result<MergedAuction> {
    let contract_info = source
        .get_auction(event.token_contract, event.token_id)
        .await?;

    Ok(merge_snapshot(event, contract_info))
}

/// Reads for every event are in flight at once. A failed read only drops its
/// own auction; the rest come back in input order.
pub async fn fetch_and_merge_all<S: AuctionSource>(
    source: &S,
    events: Vec<AuctionCreatedEvent>,
) -> Vec<MergedAuction> {
    let handles = events
        .into_iter()
        .map(|event| async move {
            let token_contract = event.token_contract;
            let token_id = event.token_id;
            fetch_and_merge(source, event)
                .await
                .map_err(|e| (token_contract, token_id, e))
        });

    let mut merged = Vec::new();

    for res in join_all(handles).await {
        match res {
            Ok(auction) => merged.push(auction),
            Err((token_contract, token_id, e)) => {
                warn!(
                    "skipping auction {:?} #{}: could not read contract: {}",
                    token_contract, token_id, e
                );
            }
        }
    }

    merged
}
