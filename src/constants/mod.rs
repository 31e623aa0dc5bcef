pub mod chain;
pub mod time;

pub use chain::*;
pub use time::*;
