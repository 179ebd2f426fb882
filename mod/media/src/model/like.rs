use serde::{Deserialize, Serialize};

/// What a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LikeTarget {
    Video,
    Comment,
    Tweet,
}

impl LikeTarget {
    /// Stored representation, matching the serde rename.
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeTarget::Video => "VIDEO",
            LikeTarget::Comment => "COMMENT",
            LikeTarget::Tweet => "TWEET",
        }
    }

    /// Collection holding the referenced target.
    pub fn collection(&self) -> &'static str {
        match self {
            LikeTarget::Video => "videos",
            LikeTarget::Comment => "comments",
            LikeTarget::Tweet => "tweets",
        }
    }

    /// Human noun for error messages.
    pub fn noun(&self) -> &'static str {
        match self {
            LikeTarget::Video => "video",
            LikeTarget::Comment => "comment",
            LikeTarget::Tweet => "tweet",
        }
    }
}

/// Like — the toggle relation between a user and exactly one target.
///
/// The store enforces UNIQUE(likedBy, targetId, targetKind): for a given
/// (user, target) pair at most one like exists at any time, so a racing
/// duplicate create fails with a conflict instead of a second edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub liked_by: String,
    pub target_kind: LikeTarget,
    pub target_id: String,
    pub created_at: String,
    pub updated_at: String,
}
