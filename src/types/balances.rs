use ethers::types::U256;

#[derive(Debug)]
pub struct Balances {
    pub eth: U256,
    /// in the token's smallest unit
    pub erc20: U256,
    /// number of tokens held in the collection
    pub erc721: U256,
    /// allowance granted to the auction contract
    pub erc20_allowance: U256,
}

impl Balances {
    pub fn can_cover_bid(&self, bid_value: U256) -> bool {
        bid_value <= self.erc20
    }

    /// Whether the auction contract may already pull `bid_value`, otherwise
    /// the bid token has to be approved first.
    pub fn is_allowance_enough(&self, bid_value: U256) -> bool {
        self.erc20_allowance >= bid_value
    }
}
