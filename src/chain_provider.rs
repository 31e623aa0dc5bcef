use crate::{
    constants::chain::LOG_QUERY_CHUNK,
    normalizer::{normalize_params, Normalize},
    types::{AuctionContractInfo, AuctionCreatedEvent, BidCommittedEvent, LiveLog},
    RawAuctionInfo, SealedBidAuction,
};
use anyhow::{Context, Result};
use ethers::{
    abi::{Abi, RawLog},
    contract::{builders::Event, parse_log, EthLogDecode},
    providers::{Middleware, Provider, Ws},
    types::{Address, Log, U256},
};
use log::{debug, info};
use serde_json::{Map, Value};
use std::{cmp, future::Future, sync::Arc};

/// Read side of the auction contract.
pub trait AuctionSource {
    /// current `getAuction` record for a token
    fn get_auction(
        &self,
        token_contract: Address,
        token_id: U256,
    ) -> impl Future<Output = Result<AuctionContractInfo>> + Send;

    /// latest mined block, used as the upper bound of history queries
    fn head_block(&self) -> impl Future<Output = Result<u64>> + Send;

    /// every `AuctionCreated` log in `[from_block, to_block]`
    fn auction_created_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = Result<Vec<AuctionCreatedEvent>>> + Send;

    /// every `BidCommitted` log in `[from_block, to_block]`
    fn bid_committed_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = Result<Vec<BidCommittedEvent>>> + Send;
}

type AuctionEvent<D> = Event<Arc<Provider<Ws>>, Provider<Ws>, D>;

pub struct ChainProvider {
    pub provider: Arc<Provider<Ws>>,
    pub auction: SealedBidAuction<Provider<Ws>>,
}

impl ChainProvider {
    pub async fn try_new(url: &str, auction_contract: Address) -> Result<ChainProvider> {
        let provider = Provider::<Ws>::connect(url).await?;
        let provider = Arc::new(provider);

        info!("connected to provider at: {}", url);
        info!(
            "current block number: {}",
            provider.get_block_number().await?
        );

        let auction = SealedBidAuction::new(auction_contract, provider.clone());

        Ok(ChainProvider { provider, auction })
    }

    // walks [from_block, last_block] in LOG_QUERY_CHUNK sized windows
    async fn query_chunked<D, F>(
        &self,
        from_block: u64,
        last_block: u64,
        make_filter: F,
    ) -> Result<Vec<D>>
    where
        D: EthLogDecode + Send,
        F: Fn() -> AuctionEvent<D>,
    {
        let mut logs = Vec::new();
        let mut start_block = from_block;

        while start_block <= last_block {
            let end_block = cmp::min(start_block + LOG_QUERY_CHUNK, last_block);

            let chunk: Vec<D> = make_filter()
                .from_block(start_block)
                .to_block(end_block)
                .query()
                .await?;

            debug!(
                "{} logs between blocks {} and {}",
                chunk.len(),
                start_block,
                end_block
            );

            logs.extend(chunk);
            start_block = end_block + 1;
        }

        Ok(logs)
    }
}

impl AuctionSource for ChainProvider {
    async fn get_auction(
        &self,
        token_contract: Address,
        token_id: U256,
    ) -> Result<AuctionContractInfo> {
        let raw: RawAuctionInfo = self
            .auction
            .get_auction(token_contract, token_id)
            .call()
            .await?;

        Ok(raw.normalize())
    }

    async fn head_block(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?.as_u64())
    }

    async fn auction_created_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<AuctionCreatedEvent>> {
        let logs = self
            .query_chunked(from_block, to_block, || {
                self.auction.auction_created_filter()
            })
            .await?;

        Ok(logs.iter().map(|log| log.normalize()).collect())
    }

    async fn bid_committed_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<BidCommittedEvent>> {
        let logs = self
            .query_chunked(from_block, to_block, || {
                self.auction.bid_committed_filter()
            })
            .await?;

        Ok(logs.iter().map(|log| log.normalize()).collect())
    }
}

/// Decodes a log from a live subscription and keeps its block number.
pub fn decode_live_log<D, N>(log: Log) -> Result<LiveLog<N>>
where
    D: EthLogDecode + Normalize<Output = N>,
{
    let block_number = log.block_number.map(|number| number.as_u64());
    let decoded: D = parse_log(log)?;

    Ok(LiveLog::new(decoded.normalize(), block_number))
}

/// Every parameter of an `event` log keyed by name, for logging.
pub fn describe_log(abi: &Abi, event: &str, log: &Log) -> Result<Map<String, Value>> {
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };

    let parsed = abi
        .event(event)?
        .parse_log(raw)
        .with_context(|| format!("log is not a {event} event"))?;

    Ok(normalize_params(&parsed.params))
}
