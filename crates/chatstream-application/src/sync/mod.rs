mod hub;
mod message;

pub use hub::{SubscriptionId, SyncCallback, SyncHub, TabSync};
pub use message::{SyncEnvelope, SyncMessage};
