/// A record delivered by a live subscription together with the block it
/// was mined in. Pending logs have no block yet.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LiveLog<T> {
    pub event: T,
    pub block_number: Option<u64>,
}

impl<T> LiveLog<T> {
    pub fn new(event: T, block_number: Option<u64>) -> Self {
        LiveLog {
            event,
            block_number,
        }
    }

    /// Whether a history query that stopped at `synced_to` already returned
    /// this log.
    pub fn is_covered_by(&self, synced_to: Option<u64>) -> bool {
        match (self.block_number, synced_to) {
            (Some(block_number), Some(synced_to)) => block_number <= synced_to,
            _ => false,
        }
    }
}
