use serde::{Deserialize, Serialize};

/// Subscription — the toggle relation between a subscriber and a
/// channel (both user ids). UNIQUE(subscriber, channel) in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub subscriber: String,
    pub channel: String,
    pub created_at: String,
    pub updated_at: String,
}
