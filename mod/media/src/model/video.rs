use serde::{Deserialize, Serialize};

/// Video — published media content owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,

    /// Owning user id.
    pub owner: String,

    /// Media key of the video file.
    pub video_file: String,

    /// Media key of the thumbnail image.
    pub thumbnail: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Duration in seconds.
    pub duration: f64,

    /// Monotonic view counter.
    #[serde(default)]
    pub views: u64,

    /// Only published videos appear in the public catalog.
    pub is_published: bool,

    pub created_at: String,
    pub updated_at: String,
}
