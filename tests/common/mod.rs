#![allow(dead_code)]

use anyhow::{bail, Result};
use ethers::types::{Address, U256};
use hex_literal::hex;
use sealed_bid_client::{
    chain_provider::AuctionSource,
    types::{AuctionContractInfo, AuctionCreatedEvent, BidCommittedEvent},
};
use std::collections::{HashMap, HashSet};

pub const TOKEN_A: [u8; 20] = hex!("00000000000000000000000000000000000000aa");
pub const TOKEN_B: [u8; 20] = hex!("00000000000000000000000000000000000000bb");
pub const SELLER: [u8; 20] = hex!("7fd8e5a1e5d7a7e272266dd4cad0072d319573d2");
pub const BIDDER: [u8; 20] = hex!("3b968d2d299b895a5fcf3bba7a64ad0f566e6f88");
pub const WETH: [u8; 20] = hex!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

pub fn created_event(
    token: [u8; 20],
    token_id: u64,
    auction_index: u64,
    start_time: u64,
) -> AuctionCreatedEvent {
    AuctionCreatedEvent {
        token_contract: Address::from(token),
        token_id: U256::from(token_id),
        erc20_token: Address::from(WETH),
        auction_index,
        seller: Address::from(SELLER),
        reserve_price: U256::from(10),
        start_time,
        end_time: start_time + 2_000,
    }
}

pub fn contract_info(
    index: u64,
    status: bool,
    end_of_bidding_period: u64,
    end_of_reveal_period: u64,
) -> AuctionContractInfo {
    AuctionContractInfo {
        index,
        status,
        seller: Address::from(SELLER),
        erc20_token: Address::from(WETH),
        end_of_bidding_period,
        end_of_reveal_period,
        num_unrevealed_bids: 0,
        highest_bid: U256::zero(),
        second_highest_bid: U256::zero(),
        highest_bidder: Address::zero(),
    }
}

pub fn bid_event(token: [u8; 20], token_id: u64, auction_index: u64) -> BidCommittedEvent {
    BidCommittedEvent {
        token_contract: Address::from(token),
        token_id: U256::from(token_id),
        bidder: Address::from(BIDDER),
        auction_index,
        commitment: [0x42; 20],
        collateral: U256::from(100),
    }
}

/// In-memory chain: one `getAuction` record per token plus the logs.
#[derive(Default)]
pub struct MockChain {
    pub auctions: HashMap<(Address, U256), AuctionContractInfo>,
    pub failing: HashSet<(Address, U256)>,
    pub created: Vec<AuctionCreatedEvent>,
    pub bids: Vec<BidCommittedEvent>,
    pub head: u64,
}

impl MockChain {
    /// lists `event` and makes it the live generation of its token
    pub fn with_live_auction(
        mut self,
        event: AuctionCreatedEvent,
        end_of_bidding_period: u64,
        end_of_reveal_period: u64,
    ) -> Self {
        self.auctions.insert(
            (event.token_contract, event.token_id),
            contract_info(
                event.auction_index,
                true,
                end_of_bidding_period,
                end_of_reveal_period,
            ),
        );
        self.created.push(event);
        self
    }

    pub fn with_head(mut self, head: u64) -> Self {
        self.head = head;
        self
    }

    pub fn with_failing_read(mut self, token: [u8; 20], token_id: u64) -> Self {
        self.failing.insert((Address::from(token), U256::from(token_id)));
        self
    }
}

impl AuctionSource for MockChain {
    async fn get_auction(
        &self,
        token_contract: Address,
        token_id: U256,
    ) -> Result<AuctionContractInfo> {
        if self.failing.contains(&(token_contract, token_id)) {
            bail!("rpc error: connection reset");
        }
        match self.auctions.get(&(token_contract, token_id)) {
            Some(info) => Ok(info.clone()),
            None => bail!("no auction for {:?} #{}", token_contract, token_id),
        }
    }

    async fn head_block(&self) -> Result<u64> {
        Ok(self.head)
    }

    async fn auction_created_events(
        &self,
        _from_block: u64,
        _to_block: u64,
    ) -> Result<Vec<AuctionCreatedEvent>> {
        Ok(self.created.clone())
    }

    async fn bid_committed_events(
        &self,
        _from_block: u64,
        _to_block: u64,
    ) -> Result<Vec<BidCommittedEvent>> {
        Ok(self.bids.clone())
    }
}
