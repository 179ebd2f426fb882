//! Request identity and the owner-only authorization guard.
//!
//! The core does not verify credentials itself. The binary's JWT
//! middleware authenticates the request and attaches a [`Principal`] to
//! the request extensions; handlers extract it and the core trusts it
//! without re-verification.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::ServiceError;

/// The authenticated user id attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub fn user_id(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthenticated("no principal attached to request".into()))
    }
}

/// Owner-only guard for principal-scoped views (subscriber lists,
/// subscribed-channel lists). Allows iff requester == owner.
pub fn authorize_owner(requester: &str, resource_owner: &str) -> Result<(), ServiceError> {
    if requester == resource_owner {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "you are not authorized to view this resource".into(),
        ))
    }
}

/// Validate that an identifier is syntactically a record reference
/// (32 lowercase hex chars, the [`crate::new_id`] format). Checked before
/// any store access; a malformed id is never retried.
pub fn validate_reference(id: &str) -> Result<(), ServiceError> {
    if id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ServiceError::InvalidReference(format!(
            "'{}' is not a valid reference",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_guard() {
        assert!(authorize_owner("a", "a").is_ok());
        assert!(matches!(
            authorize_owner("a", "b"),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn reference_validation() {
        let id = crate::new_id();
        assert!(validate_reference(&id).is_ok());
        assert!(validate_reference("not-an-id").is_err());
        assert!(validate_reference("").is_err());
        assert!(validate_reference(&id.to_uppercase()).is_err());
        assert!(validate_reference(&id[..31]).is_err());
    }
}
