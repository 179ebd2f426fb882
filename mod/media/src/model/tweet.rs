use serde::{Deserialize, Serialize};

/// Tweet — a short text post owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: String,
    pub owner: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}
