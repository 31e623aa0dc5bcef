use super::MergedAuction;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};

/// What a user can do with an auction at a given instant.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
pub enum Phase {
    NotStarted,
    AcceptingBids,
    RevealWindow,
    NeedsSettlement,
    Ended,
}

impl Phase {
    /// First match wins. Depends on wall-clock time, so callers resolve it
    /// again on every tick instead of storing it.
    pub fn resolve(now: u64, auction: &MergedAuction) -> Phase {
        let info = &auction.contract_info;

        if !info.status {
            return Phase::Ended;
        }

        let start_time = auction.event.start_time;

        if now < start_time {
            Phase::NotStarted
        } else if now < info.end_of_bidding_period {
            Phase::AcceptingBids
        } else if now < info.end_of_reveal_period {
            Phase::RevealWindow
        } else {
            Phase::NeedsSettlement
        }
    }

    // button text in the auction table
    pub fn label(&self) -> &'static str {
        match self {
            Phase::NotStarted => "Not Started",
            Phase::AcceptingBids => "Commit Bid",
            Phase::RevealWindow => "Reveal Bid",
            Phase::NeedsSettlement => "End Auction",
            Phase::Ended => "Auction Ended",
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, Phase::NotStarted | Phase::Ended)
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.label())
    }
}
