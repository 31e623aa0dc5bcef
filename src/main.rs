use anyhow::Result;
use ethers::{contract::EthLogDecode, providers::Middleware, types::Log};
use futures::{future::join_all, StreamExt};
use log::{debug, error, info, log_enabled, warn, Level};
use sealed_bid_client::{
    chain_provider::{decode_live_log, describe_log, AuctionSource, ChainProvider},
    constants::chain::LIVE_BATCH_SIZE,
    feed::{fetch_history, AuctionFeed, DuplicatePolicy},
    merger::fetch_and_merge_all,
    normalizer::Normalize,
    types::LiveLog,
    utils::{load_token_registry, now_unix, render_rows, TokenRegistry},
    AuctionCreatedFilter, BidCommittedFilter, Config,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config: Config = envy::from_env()?;

    let chain =
        Arc::new(ChainProvider::try_new(&config.wss_rpc_url, config.auction_contract).await?);

    let registry = match &config.tokens_file {
        Some(path) => load_token_registry(path).await.unwrap_or_else(|e| {
            warn!("could not load token registry from {}: {}", path, e);
            TokenRegistry::default()
        }),
        None => TokenRegistry::default(),
    };

    let feed = Arc::new(Mutex::new(AuctionFeed::new(DuplicatePolicy::from_flag(
        config.dedupe_live_events,
    ))));

    let auctions_handle = task_auctions(chain.clone(), feed.clone(), config.from_block);
    let bids_handle = task_bids(chain.clone(), feed.clone(), config.from_block);
    let render_handle = task_render(
        feed,
        registry,
        Duration::from_secs(config.render_interval_secs),
    );

    for res in join_all([auctions_handle, bids_handle, render_handle]).await {
        match res {
            Ok(Err(e)) => error!("task failed: {}", e),
            Err(e) => error!("task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    }

    info!("watcher is shutting down");

    Ok(())
}

/// decodes a batch of raw logs, skipping the ones that do not decode
fn decode_batch<D, N>(chain: &ChainProvider, event: &str, batch: Vec<Log>) -> Vec<LiveLog<N>>
where
    D: EthLogDecode + Normalize<Output = N>,
{
    let mut decoded = Vec::with_capacity(batch.len());

    for log in batch {
        if log_enabled!(Level::Debug) {
            match describe_log(chain.auction.abi(), event, &log) {
                Ok(fields) => debug!("{} log: {}", event, Value::Object(fields)),
                Err(e) => debug!("{} log could not be described: {}", event, e),
            }
        }

        match decode_live_log::<D, N>(log) {
            Ok(live) => decoded.push(live),
            Err(e) => error!("could not decode {} log: {}", event, e),
        }
    }

    decoded
}

/// keeps the auction list in sync with `AuctionCreated` logs
fn task_auctions(
    chain: Arc<ChainProvider>,
    feed: Arc<Mutex<AuctionFeed>>,
    from_block: u64,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        info!("starting event listener task for auction created events");

        // subscribe before reading history so nothing mined in between is missed,
        // logs the history already returned are dropped by the feed
        let filter = chain.auction.auction_created_filter().filter;
        let stream = chain.provider.subscribe_logs(&filter).await?;
        let mut batches = Box::pin(stream.ready_chunks(LIVE_BATCH_SIZE));

        let (history, synced_to) = fetch_history(chain.as_ref(), from_block).await?;
        {
            let mut feed = feed.lock().await;
            feed.apply_history(history, synced_to);
            info!(
                "auction history loaded up to block {}: {} auctions",
                synced_to,
                feed.auctions().len()
            );
        }

        while let Some(batch) = batches.next().await {
            let batch = decode_batch::<AuctionCreatedFilter, _>(&chain, "AuctionCreated", batch);
            let new_events = feed.lock().await.fresh_auctions(batch);

            info!("{} new auctions received", new_events.len());

            // contract reads happen before taking the lock
            let merged = fetch_and_merge_all(chain.as_ref(), new_events).await;
            feed.lock().await.apply_live_batch(merged);
        }

        info!("returning event listener task for auction created events");

        Ok(())
    })
}

/// keeps the bid tally in sync with `BidCommitted` logs
fn task_bids(
    chain: Arc<ChainProvider>,
    feed: Arc<Mutex<AuctionFeed>>,
    from_block: u64,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        info!("starting event listener task for bid committed events");

        let filter = chain.auction.bid_committed_filter().filter;
        let stream = chain.provider.subscribe_logs(&filter).await?;
        let mut batches = Box::pin(stream.ready_chunks(LIVE_BATCH_SIZE));

        let synced_to = chain.head_block().await?;
        let history = chain.bid_committed_events(from_block, synced_to).await?;
        feed.lock().await.rebuild_bids(&history, synced_to);
        info!(
            "bid history loaded up to block {}: {} bids",
            synced_to,
            history.len()
        );

        while let Some(batch) = batches.next().await {
            let new_bids = decode_batch::<BidCommittedFilter, _>(&chain, "BidCommitted", batch);

            info!("{} new bids received", new_bids.len());

            feed.lock().await.on_live_bid_batch(new_bids);
        }

        info!("returning event listener task for bid committed events");

        Ok(())
    })
}

/// logs the auction table. phases are resolved against the clock on every tick
fn task_render(
    feed: Arc<Mutex<AuctionFeed>>,
    registry: TokenRegistry,
    period: Duration,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;

            // both listeners are gone, nothing will change anymore
            if Arc::strong_count(&feed) == 1 {
                break;
            }

            let rows = render_rows(&*feed.lock().await, now_unix(), &registry);

            info!("{} auctions", rows.len());
            for row in rows {
                info!("{row}");
            }
        }

        Ok(())
    })
}
