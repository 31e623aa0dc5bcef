use crate::constants::time::{DEFAULT_BID_PERIOD, DEFAULT_REVEAL_PERIOD};
use anyhow::{bail, Result};
use ethers::types::{Address, U256};
use std::str::FromStr;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum TokenType {
    Erc20,
    Erc721,
}

impl FromStr for TokenType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "erc20" => Ok(Self::Erc20),
            "erc721" => Ok(Self::Erc721),
            _ => bail!("unknown token type: {s}"),
        }
    }
}

/// Unvalidated input of the create-auction form.
#[derive(Debug, Clone)]
pub struct CreateAuctionParams {
    pub token_type: Option<TokenType>,
    pub token_contract: Option<Address>,
    pub token_id: Option<U256>,
    pub erc20_token: Option<Address>,
    pub start_time: Option<u64>,
    pub bid_period: Option<u64>,
    pub reveal_period: Option<u64>,
    pub reserve_price: Option<U256>,
}

impl Default for CreateAuctionParams {
    fn default() -> Self {
        Self {
            token_type: None,
            token_contract: None,
            token_id: None,
            erc20_token: None,
            start_time: None,
            bid_period: Some(DEFAULT_BID_PERIOD),
            reveal_period: Some(DEFAULT_REVEAL_PERIOD),
            reserve_price: Some(U256::from(10)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateAuction {
    pub token_contract: Address,
    pub token_id: U256,
    pub erc20_token: Address,
    pub start_time: u64,
    pub bid_period: u64,
    pub reveal_period: u64,
    pub reserve_price: U256,
}

impl CreateAuctionParams {
    /// Reports every missing field at once, in form order.
    pub fn validate(&self) -> Result<CreateAuction> {
        let mut errors: Vec<&str> = Vec::new();

        if self.token_type.is_none() {
            errors.push("Token Type is required.");
        }
        if self.token_contract.is_none() {
            errors.push("Token Contract is required.");
        }
        if self.token_type == Some(TokenType::Erc721) && self.token_id.is_none() {
            errors.push("Token Id is required.");
        }
        if self.erc20_token.is_none() {
            errors.push("ERC20 Token is required.");
        }
        if self.start_time.is_none() {
            errors.push("Start Time is required.");
        }
        if self.bid_period.is_none() {
            errors.push("Bid Period is required.");
        }
        if self.reveal_period.is_none() {
            errors.push("Reveal Period is required.");
        }
        if self.reserve_price.is_none() {
            errors.push("Reserve Price is required.");
        }

        match (
            self.token_contract,
            self.erc20_token,
            self.start_time,
            self.bid_period,
            self.reveal_period,
            self.reserve_price,
        ) {
            (
                Some(token_contract),
                Some(erc20_token),
                Some(start_time),
                Some(bid_period),
                Some(reveal_period),
                Some(reserve_price),
            ) if errors.is_empty() => Ok(CreateAuction {
                token_contract,
                token_id: self.token_id.unwrap_or_default(),
                erc20_token,
                start_time,
                bid_period,
                reveal_period,
                reserve_price,
            }),
            _ => bail!(
                "Please resolve the following errors: {}",
                errors.join(" ")
            ),
        }
    }
}
