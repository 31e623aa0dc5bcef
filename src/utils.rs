use crate::{
    feed::AuctionFeed,
    types::{MergedAuction, Phase},
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};
use tokio::{fs::File, io::AsyncReadExt};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
}

/// Known token contracts, read from a json file shaped like
/// `{ "erc721": [{ "address", "name", "symbol" }], "erc20": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRegistry {
    #[serde(default)]
    pub erc721: Vec<TokenInfo>,
    #[serde(default)]
    pub erc20: Vec<TokenInfo>,
}

impl TokenRegistry {
    pub fn from_json(json: &str) -> Result<TokenRegistry> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn erc721_name(&self, address: &Address) -> Option<String> {
        self.erc721
            .iter()
            .find(|token| &token.address == address)
            .map(|token| format!("{} ({})", token.name, token.symbol))
    }
}

pub async fn load_token_registry(path: &str) -> Result<TokenRegistry> {
    // if the file does not exist it will return Err
    let mut file = File::open(path).await?;
    let mut json_string = String::new();

    file.read_to_string(&mut json_string).await?;

    TokenRegistry::from_json(&json_string)
}

pub fn now_unix() -> u64 {
    // clock before 1970 is not a case worth handling
    Utc::now().timestamp().max(0) as u64
}

// 0x1234........abcd
pub fn format_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    format!("{}........{}", &full[..6], &full[full.len() - 4..])
}

pub fn format_timestamp(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc2822())
        .unwrap_or_else(|| timestamp.to_string())
}

/// One line of the auction table.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionRow {
    pub auction_index: u64,
    pub token_id: U256,
    pub token_name: String,
    pub start_time: u64,
    pub end_time: u64,
    pub seller: Address,
    pub bids_submitted: u64,
    pub is_open: bool,
    pub phase: Phase,
}

impl AuctionRow {
    pub fn new(
        auction: &MergedAuction,
        now: u64,
        bids_submitted: u64,
        registry: &TokenRegistry,
    ) -> AuctionRow {
        let token_contract = &auction.event.token_contract;
        AuctionRow {
            auction_index: auction.event.auction_index,
            token_id: auction.event.token_id,
            token_name: registry
                .erc721_name(token_contract)
                .unwrap_or_else(|| format_address(token_contract)),
            start_time: auction.event.start_time,
            end_time: auction.contract_info.end_of_reveal_period,
            seller: auction.event.seller,
            bids_submitted,
            is_open: auction.is_open(),
            phase: Phase::resolve(now, auction),
        }
    }
}

impl Display for AuctionRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // EXAMPLE
        // #2 | 17 | Bored Apes (BAYC) | <start> - <end> | 0x1234........abcd | bids: 3 | Open | Reveal Bid
        write!(
            f,
            "#{} | {} | {} | {} - {} | {} | bids: {} | {} | {}",
            self.auction_index,
            self.token_id,
            self.token_name,
            format_timestamp(self.start_time),
            format_timestamp(self.end_time),
            format_address(&self.seller),
            self.bids_submitted,
            if self.is_open { "Open" } else { "Closed" },
            self.phase
        )
    }
}

pub fn render_rows(feed: &AuctionFeed, now: u64, registry: &TokenRegistry) -> Vec<AuctionRow> {
    feed.auctions()
        .iter()
        .map(|auction| AuctionRow::new(auction, now, feed.bid_count(auction), registry))
        .collect()
}
