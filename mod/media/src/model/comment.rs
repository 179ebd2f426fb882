use serde::{Deserialize, Serialize};

/// Comment — a text reply attached to a parent video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub owner: String,

    /// Parent video id.
    pub video: String,

    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}
