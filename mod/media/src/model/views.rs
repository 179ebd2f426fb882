//! Typed shapes of the derived views. Each is deserialized from the
//! documents an aggregation pipeline produces; projections have already
//! dropped everything not named here, credentials included.

use serde::{Deserialize, Serialize};

/// Projected user subset attached by owner/subscriber/channel lookups.
/// Which optional fields are present depends on the view's projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A comment with its author card attached (null when the author was
/// deleted — dangling owners contribute nothing).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub video: String,
    pub content: String,
    #[serde(default)]
    pub owner: Option<UserCard>,
    pub created_at: String,
}

/// Projected video subset inside the liked-videos feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    pub id: String,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub duration: f64,
    #[serde(default)]
    pub views: u64,
    pub created_at: String,
    #[serde(default)]
    pub owner: Option<UserCard>,
}

/// One entry of the liked-videos feed: the like joined with its video.
/// Likes whose video no longer exists are unwound away.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoView {
    pub id: String,
    pub liked_by: String,
    pub video: VideoCard,
    pub created_at: String,
}

/// One entry of a channel's subscriber list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberEntry {
    pub id: String,
    pub subscriber: UserCard,
    pub created_at: String,
}

/// One entry of a user's subscribed-channels list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEntry {
    pub id: String,
    pub channel: UserCard,
    pub created_at: String,
}

/// Aggregated channel statistics. An owner with zero videos yields the
/// zeroed row, never an omitted one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub id: String,
    pub total_subscribers: u64,
    pub total_videos: u64,
    pub total_views: u64,
    pub total_likes: u64,
}

/// A catalog/detail video with its owner card attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithOwner {
    #[serde(flatten)]
    pub video: super::Video,
    #[serde(default)]
    pub owner_details: Option<UserCard>,
}

/// A playlist with its owner card attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistWithOwner {
    #[serde(flatten)]
    pub playlist: super::Playlist,
    #[serde(default)]
    pub owner_details: Option<UserCard>,
}
