use ethers::types::{Address, U256};
use serde::Serialize;

/// Point-in-time read of `getAuction(tokenContract, tokenId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionContractInfo {
    /// current on-chain generation for this token
    pub index: u64,
    /// true while the auction is open
    pub status: bool,
    pub seller: Address,
    pub erc20_token: Address,
    pub end_of_bidding_period: u64,
    pub end_of_reveal_period: u64,
    pub num_unrevealed_bids: u64,
    pub highest_bid: U256,
    pub second_highest_bid: U256,
    pub highest_bidder: Address,
}

impl AuctionContractInfo {
    /// Only the seller may end the auction. Addresses compare byte-wise, so
    /// the casing of their hex form does not matter.
    pub fn is_seller(&self, account: Address) -> bool {
        self.seller == account
    }
}
