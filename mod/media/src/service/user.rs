//! Account registration, credential verification and profile upkeep.
//! Passwords are hashed with Argon2id; the hash never leaves the stored
//! document.

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::Deserialize;
use tracing::info;

use vidtube_core::{new_id, now_rfc3339, validate_reference, Principal, ServiceError};

use crate::model::{User, UserProfile};
use crate::service::{internal, MediaService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountInput {
    pub fullname: Option<String>,
    pub email: Option<String>,
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(internal)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(internal)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl MediaService {
    /// Create an account. Usernames are lowercased; username and email
    /// must be unique.
    pub fn register(&self, input: RegisterInput) -> Result<UserProfile, ServiceError> {
        let username = input.username.trim().to_lowercase();
        let email = input.email.trim().to_string();
        if username.is_empty() || email.is_empty() || input.fullname.trim().is_empty() {
            return Err(ServiceError::Validation(
                "username, email and fullname are required".into(),
            ));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            username,
            email,
            fullname: input.fullname.trim().to_string(),
            avatar: None,
            cover_image: None,
            password_hash: hash_password(&input.password)?,
            refresh_token: None,
            created_at: now.clone(),
            updated_at: now,
        };

        match self.insert_record("users", &user) {
            Ok(()) => {}
            Err(ServiceError::Conflict(_)) => {
                return Err(ServiceError::Conflict(
                    "username or email already registered".into(),
                ))
            }
            Err(e) => return Err(e),
        }
        info!(user = %user.id, username = %user.username, "user registered");
        Ok(user.into())
    }

    /// Check a username/password pair. Used by the token issuer; a bad
    /// pair is Unauthenticated, not NotFound, so probing for accounts
    /// learns nothing.
    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, ServiceError> {
        let username = username.trim().to_lowercase();
        let user: Option<User> = self
            .store
            .find_one("users", &[("username", username.as_str().into())])
            .map_err(crate::service::store_err)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(internal)?;

        match user {
            Some(user) if verify_password(password, &user.password_hash)? => Ok(user.into()),
            _ => Err(ServiceError::Unauthenticated(
                "invalid username or password".into(),
            )),
        }
    }

    /// A user's public profile.
    pub fn get_profile(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
        validate_reference(user_id)?;
        let user: User = self.get_record("users", user_id)?;
        Ok(user.into())
    }

    /// Update the caller's display name and/or email.
    pub fn update_account(
        &self,
        principal: &Principal,
        input: UpdateAccountInput,
    ) -> Result<UserProfile, ServiceError> {
        let mut user: User = self.get_record("users", principal.user_id())?;
        if let Some(fullname) = input.fullname {
            if fullname.trim().is_empty() {
                return Err(ServiceError::Validation("fullname must not be empty".into()));
            }
            user.fullname = fullname.trim().to_string();
        }
        if let Some(email) = input.email {
            if email.trim().is_empty() {
                return Err(ServiceError::Validation("email must not be empty".into()));
            }
            user.email = email.trim().to_string();
        }
        user.updated_at = now_rfc3339();
        self.update_record("users", &user.id, &user)?;
        Ok(user.into())
    }

    /// Replace the caller's avatar image with an already-uploaded media key.
    pub fn update_avatar(
        &self,
        principal: &Principal,
        media_key: &str,
    ) -> Result<UserProfile, ServiceError> {
        self.set_user_image(principal, media_key, |user, key| user.avatar = Some(key))
    }

    /// Replace the caller's channel banner with an already-uploaded media key.
    pub fn update_cover_image(
        &self,
        principal: &Principal,
        media_key: &str,
    ) -> Result<UserProfile, ServiceError> {
        self.set_user_image(principal, media_key, |user, key| user.cover_image = Some(key))
    }

    fn set_user_image(
        &self,
        principal: &Principal,
        media_key: &str,
        apply: impl FnOnce(&mut User, String),
    ) -> Result<UserProfile, ServiceError> {
        self.ensure_media_key(media_key)?;
        let mut user: User = self.get_record("users", principal.user_id())?;
        apply(&mut user, media_key.to_string());
        user.updated_at = now_rfc3339();
        self.update_record("users", &user.id, &user)?;
        Ok(user.into())
    }

    /// A referenced media key must point at an uploaded blob.
    pub(crate) fn ensure_media_key(&self, key: &str) -> Result<(), ServiceError> {
        let exists = self
            .media
            .exists(key)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if exists {
            Ok(())
        } else {
            Err(ServiceError::Validation(format!(
                "media key '{}' does not reference an uploaded file",
                key
            )))
        }
    }
}
