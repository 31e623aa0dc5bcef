pub mod bid_tally;
pub mod chain_provider;
pub mod commitment;
pub mod constants;
pub mod feed;
pub mod global_provider;
pub mod merger;
pub mod normalizer;
pub mod types;
pub mod utils;

use constants::chain::SEPOLIA_TX_URL;
use ethers::{
    contract::abigen,
    types::{Address, U256},
};
use serde::Deserialize;

abigen!(
    SealedBidAuction,
    r#"[
        function createAuction(address tokenContract, uint256 tokenId, address erc20Token, uint256 startTime, uint256 bidPeriod, uint256 revealPeriod, uint256 reservePrice)
        function commitBid(address tokenContract, uint256 tokenId, bytes20 commitment, uint256 erc20Tokens)
        function revealBid(address tokenContract, uint256 tokenId, uint96 bidValue, bytes32 nonce)
        function endAuction(address tokenContract, uint256 tokenId)
        function getAuction(address tokenContract, uint256 tokenId) view returns (address seller, address erc20Token, uint256 startTime, uint256 endOfBiddingPeriod, uint256 endOfRevealPeriod, uint256 numUnrevealedBids, uint256 highestBid, uint256 secondHighestBid, address highestBidder, uint256 index, bool status)
        event AuctionCreated(address tokenContract, uint256 tokenId, address erc20Token, uint256 auctionIndex, address seller, uint256 reservePrice, uint256 startTime, uint256 endTime)
        event BidCommitted(address tokenContract, uint256 tokenId, address bidder, uint256 auctionIndex, bytes20 commitment, uint256 erc20Tokens)
        event BidRevealed(address tokenContract, uint256 tokenId, address bidder, uint256 auctionIndex, uint256 bidValue)
        event AuctionEnded(address tokenContract, uint256 tokenId, uint256 auctionIndex, address winner, uint256 winningBid)
    ]"#
);

abigen!(
    Erc20,
    r#"[
        function balanceOf(address account) view returns (uint256)
        function allowance(address owner, address spender) view returns (uint256)
        function approve(address spender, uint256 amount) returns (bool)
    ]"#
);

abigen!(
    Erc721,
    r#"[
        function balanceOf(address owner) view returns (uint256)
        function ownerOf(uint256 tokenId) view returns (address)
        function getApproved(uint256 tokenId) view returns (address)
        function approve(address to, uint256 tokenId)
    ]"#
);

/// Raw return of `getAuction`, in ABI order.
pub type RawAuctionInfo = (
    Address,
    Address,
    U256,
    U256,
    U256,
    U256,
    U256,
    U256,
    Address,
    U256,
    bool,
);

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub wss_rpc_url: String,
    pub auction_contract: Address,
    /// only needed by the actions binary
    pub mnemonic: Option<String>,
    #[serde(default)]
    pub from_block: u64,
    #[serde(default = "default_render_interval")]
    pub render_interval_secs: u64,
    #[serde(default)]
    pub dedupe_live_events: bool,
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
    pub tokens_file: Option<String>,
}

fn default_render_interval() -> u64 {
    15
}

fn default_explorer_tx_url() -> String {
    SEPOLIA_TX_URL.to_string()
}
