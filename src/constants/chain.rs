pub const SEPOLIA_TX_URL: &str = "https://sepolia.etherscan.io/tx/";

/// hosted rpc endpoints refuse `eth_getLogs` over wide block ranges
pub const LOG_QUERY_CHUNK: u64 = 999_999;

/// live logs are grouped into batches of at most this many events
pub const LIVE_BATCH_SIZE: usize = 64;

/// `2^96 - 1`, upper bound of a bid value in the commitment encoding
pub const MAX_UINT96: u128 = (1 << 96) - 1;
