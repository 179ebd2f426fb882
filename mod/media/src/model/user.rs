use serde::{Deserialize, Serialize};

/// User — an account that owns content, likes, subscriptions and
/// playlists. A user id doubles as a channel id: subscribing to a
/// channel means subscribing to its user.
///
/// `passwordHash` and `refreshToken` are credentials. They live on the
/// stored document only; every view projection must drop them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Unique handle.
    pub username: String,

    /// Unique contact address.
    pub email: String,

    /// Display name.
    pub fullname: String,

    /// Media key of the avatar image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Media key of the channel banner image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Argon2id hash of the registration password.
    pub password_hash: String,

    /// Refresh token managed by the external session issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    pub created_at: String,
    pub updated_at: String,
}

/// Credential-free rendering of a [`User`], safe to return to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            fullname: user.fullname,
            avatar: user.avatar,
            cover_image: user.cover_image,
            created_at: user.created_at,
        }
    }
}
