use serde::{Deserialize, Serialize};

/// Playlist — an ordered sequence of video references owned by a user.
/// Duplicates are not rejected; removal takes the first occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub videos: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}
