use crate::constants::chain::MAX_UINT96;
use anyhow::{bail, Result};
use ethers::{
    abi::{encode, Token},
    types::{Address, U256},
    utils::{format_bytes32_string, keccak256},
};

/// `bytes32` string encoding of the secret nonce. At most 31 bytes.
pub fn encode_nonce(nonce: &str) -> Result<[u8; 32]> {
    if nonce.is_empty() {
        bail!("nonce is required");
    }
    if nonce.len() > 31 {
        bail!("nonce is longer than 31 bytes");
    }
    Ok(format_bytes32_string(nonce)?)
}

/// Hash committed during the bidding period:
/// first 20 bytes of `keccak256(abi.encode(bytes32 nonce, uint96 bidValue,
/// address tokenContract, uint256 tokenId, uint64 auctionIndex))`.
pub fn commitment_hash(
    nonce: &str,
    bid_value: U256,
    token_contract: Address,
    token_id: U256,
    auction_index: u64,
) -> Result<[u8; 20]> {
    if bid_value > U256::from(MAX_UINT96) {
        bail!("bid value {} does not fit in uint96", bid_value);
    }

    let nonce = encode_nonce(nonce)?;

    let packed = encode(&[
        Token::FixedBytes(nonce.to_vec()),
        Token::Uint(bid_value),
        Token::Address(token_contract),
        Token::Uint(token_id),
        Token::Uint(U256::from(auction_index)),
    ]);

    let hash = keccak256(packed);

    let mut commitment = [0u8; 20];
    commitment.copy_from_slice(&hash[..20]);

    Ok(commitment)
}
