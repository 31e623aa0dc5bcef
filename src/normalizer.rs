use crate::{
    types::{AuctionContractInfo, AuctionCreatedEvent, BidCommittedEvent},
    AuctionCreatedFilter, BidCommittedFilter, RawAuctionInfo,
};
use ethers::{
    abi::{LogParam, Token},
    types::U256,
};
use log::warn;
use serde_json::{Map, Value};

/// Turns chain-shaped data into plain records. Normalizing an already
/// normalized record gives it back unchanged.
pub trait Normalize {
    type Output;

    fn normalize(&self) -> Self::Output;
}

/// Downcast for timestamps, indices and counters. Anything past `u64::MAX`
/// saturates.
pub fn narrow(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        warn!("value {} does not fit in u64, saturating", value);
        return u64::MAX;
    }
    value.as_u64()
}

impl Normalize for AuctionCreatedFilter {
    type Output = AuctionCreatedEvent;

    fn normalize(&self) -> AuctionCreatedEvent {
        AuctionCreatedEvent {
            token_contract: self.token_contract,
            token_id: self.token_id,
            erc20_token: self.erc_20_token,
            auction_index: narrow(self.auction_index),
            seller: self.seller,
            reserve_price: self.reserve_price,
            start_time: narrow(self.start_time),
            end_time: narrow(self.end_time),
        }
    }
}

impl Normalize for AuctionCreatedEvent {
    type Output = AuctionCreatedEvent;

    fn normalize(&self) -> AuctionCreatedEvent {
        self.clone()
    }
}

impl Normalize for BidCommittedFilter {
    type Output = BidCommittedEvent;

    fn normalize(&self) -> BidCommittedEvent {
        BidCommittedEvent {
            token_contract: self.token_contract,
            token_id: self.token_id,
            bidder: self.bidder,
            auction_index: narrow(self.auction_index),
            commitment: self.commitment,
            collateral: self.erc_20_tokens,
        }
    }
}

impl Normalize for BidCommittedEvent {
    type Output = BidCommittedEvent;

    fn normalize(&self) -> BidCommittedEvent {
        self.clone()
    }
}

impl Normalize for RawAuctionInfo {
    type Output = AuctionContractInfo;

    fn normalize(&self) -> AuctionContractInfo {
        let (
            seller,
            erc20_token,
            _start_time,
            end_of_bidding_period,
            end_of_reveal_period,
            num_unrevealed_bids,
            highest_bid,
            second_highest_bid,
            highest_bidder,
            index,
            status,
        ) = *self;

        AuctionContractInfo {
            index: narrow(index),
            status,
            seller,
            erc20_token,
            end_of_bidding_period: narrow(end_of_bidding_period),
            end_of_reveal_period: narrow(end_of_reveal_period),
            num_unrevealed_bids: narrow(num_unrevealed_bids),
            highest_bid,
            second_highest_bid,
            highest_bidder,
        }
    }
}

impl Normalize for AuctionContractInfo {
    type Output = AuctionContractInfo;

    fn normalize(&self) -> AuctionContractInfo {
        self.clone()
    }
}

/// Keyed record for any decoded log. Integers that fit in a u64 become
/// numbers, wider ones become decimal strings so nothing is lost.
pub fn normalize_params(params: &[LogParam]) -> Map<String, Value> {
    params
        .iter()
        .map(|param| (param.name.clone(), token_to_value(&param.value)))
        .collect()
}

fn token_to_value(token: &Token) -> Value {
    match token {
        Token::Address(addr) => Value::String(format!("{:?}", addr)),
        Token::FixedBytes(bytes) | Token::Bytes(bytes) => {
            Value::String(format!("0x{}", hex::encode(bytes)))
        }
        Token::Uint(value) | Token::Int(value) => {
            if *value <= U256::from(u64::MAX) {
                Value::from(value.as_u64())
            } else {
                Value::String(value.to_string())
            }
        }
        Token::Bool(b) => Value::Bool(*b),
        Token::String(s) => Value::String(s.clone()),
        Token::FixedArray(tokens) | Token::Array(tokens) | Token::Tuple(tokens) => {
            Value::Array(tokens.iter().map(token_to_value).collect())
        }
    }
}
