/// seconds in one hour
pub const ONE_HOUR: u64 = 3_600;

pub const DEFAULT_BID_PERIOD: u64 = ONE_HOUR;
pub const DEFAULT_REVEAL_PERIOD: u64 = ONE_HOUR;
