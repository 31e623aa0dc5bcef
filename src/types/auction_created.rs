use ethers::types::{Address, U256};
use serde::Serialize;

/// One `AuctionCreated` log, normalized. Immutable chain history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionCreatedEvent {
    pub token_contract: Address,
    pub token_id: U256,
    pub erc20_token: Address,
    pub auction_index: u64,
    pub seller: Address,
    pub reserve_price: U256,
    pub start_time: u64, // unix timestamp in seconds
    pub end_time: u64,   // nominal end of the reveal period at creation
}
