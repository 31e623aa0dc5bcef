use super::{AuctionCreatedEvent, MergedAuction};
use ethers::types::{Address, U256};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};

/// One `BidCommitted` log, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidCommittedEvent {
    pub token_contract: Address,
    pub token_id: U256,
    pub bidder: Address,
    pub auction_index: u64,
    pub commitment: [u8; 20],
    pub collateral: U256,
}

/// Identifies one auction generation: `tokenContract-tokenId-auctionIndex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BidTallyKey {
    pub token_contract: Address,
    pub token_id: U256,
    pub auction_index: u64,
}

impl BidTallyKey {
    pub fn new(token_contract: Address, token_id: U256, auction_index: u64) -> Self {
        Self {
            token_contract,
            token_id,
            auction_index,
        }
    }
}

impl From<&BidCommittedEvent> for BidTallyKey {
    fn from(evt: &BidCommittedEvent) -> Self {
        Self::new(evt.token_contract, evt.token_id, evt.auction_index)
    }
}

impl From<&AuctionCreatedEvent> for BidTallyKey {
    fn from(evt: &AuctionCreatedEvent) -> Self {
        Self::new(evt.token_contract, evt.token_id, evt.auction_index)
    }
}

impl From<&MergedAuction> for BidTallyKey {
    fn from(auction: &MergedAuction) -> Self {
        Self::from(&auction.event)
    }
}

impl Display for BidTallyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{:?}-{}-{}",
            self.token_contract, self.token_id, self.auction_index
        )
    }
}
