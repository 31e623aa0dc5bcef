mod auction_created;
mod balances;
mod bid;
mod contract_info;
mod create_auction;
mod live_log;
mod merged_auction;
mod phase;

pub use auction_created::*;
pub use balances::*;
pub use bid::*;
pub use contract_info::*;
pub use create_auction::*;
pub use live_log::*;
pub use merged_auction::*;
pub use phase::*;
