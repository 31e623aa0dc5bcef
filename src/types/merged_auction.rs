use super::{AuctionContractInfo, AuctionCreatedEvent, BidTallyKey};
use serde::Serialize;

/// A creation event joined with the contract state read for its token.
///
/// When `contract_info.index` differs from `event.auction_index` the event
/// belongs to a superseded generation: `status` is false and the effective
/// end of the reveal period is the event's `end_time`. See
/// [`crate::merger::merge_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedAuction {
    pub event: AuctionCreatedEvent,
    pub contract_info: AuctionContractInfo,
}

impl MergedAuction {
    pub fn key(&self) -> BidTallyKey {
        BidTallyKey::from(self)
    }

    pub fn is_open(&self) -> bool {
        self.contract_info.status
    }

    pub fn is_superseded(&self) -> bool {
        self.contract_info.index != self.event.auction_index
    }
}
