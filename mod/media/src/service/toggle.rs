//! The relation toggle engine: likes and subscriptions.
//!
//! A toggle is check-then-act: look the relation up, then create or
//! delete it. Between those two steps another request may have toggled
//! the same pair, so the store's unique tuples act as the safety net. A
//! racing duplicate create surfaces as a conflict, which we fold into
//! `Added`: the relation exists afterwards either way.

use serde::Serialize;
use tracing::debug;

use vidtube_core::{new_id, now_rfc3339, validate_reference, Principal, ServiceError};
use vidtube_store::Value;

use crate::model::{Like, LikeTarget, Subscription};
use crate::service::{store_err, MediaService};

/// Net effect of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }
}

impl MediaService {
    /// Toggle the caller's like on a video, comment or tweet.
    pub fn toggle_like(
        &self,
        principal: &Principal,
        target: LikeTarget,
        target_id: &str,
    ) -> Result<ToggleOutcome, ServiceError> {
        validate_reference(target_id)?;
        self.ensure_exists(target.collection(), target_id, target.noun())?;

        let filters: &[(&str, Value)] = &[
            ("likedBy", principal.user_id().into()),
            ("targetId", target_id.into()),
            ("targetKind", target.as_str().into()),
        ];

        let existing = self.store.find_one("likes", filters).map_err(store_err)?;
        let outcome = if existing.is_some() {
            self.store.delete_one("likes", filters).map_err(store_err)?;
            ToggleOutcome::Removed
        } else {
            let now = now_rfc3339();
            let like = Like {
                id: new_id(),
                liked_by: principal.user_id().to_string(),
                target_kind: target,
                target_id: target_id.to_string(),
                created_at: now.clone(),
                updated_at: now,
            };
            match self.insert_record("likes", &like) {
                Ok(()) => {}
                // Lost the race to a concurrent create; the like exists.
                Err(ServiceError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
            ToggleOutcome::Added
        };
        debug!(
            user = principal.user_id(),
            kind = target.as_str(),
            target = target_id,
            ?outcome,
            "like toggled"
        );
        Ok(outcome)
    }

    /// Toggle the caller's subscription to a channel. Subscribing to
    /// one's own channel is allowed.
    pub fn toggle_subscription(
        &self,
        principal: &Principal,
        channel_id: &str,
    ) -> Result<ToggleOutcome, ServiceError> {
        validate_reference(channel_id)?;
        self.ensure_exists("users", channel_id, "channel")?;

        let filters: &[(&str, Value)] = &[
            ("subscriber", principal.user_id().into()),
            ("channel", channel_id.into()),
        ];

        let existing = self
            .store
            .find_one("subscriptions", filters)
            .map_err(store_err)?;
        let outcome = if existing.is_some() {
            self.store
                .delete_one("subscriptions", filters)
                .map_err(store_err)?;
            ToggleOutcome::Removed
        } else {
            let now = now_rfc3339();
            let sub = Subscription {
                id: new_id(),
                subscriber: principal.user_id().to_string(),
                channel: channel_id.to_string(),
                created_at: now.clone(),
                updated_at: now,
            };
            match self.insert_record("subscriptions", &sub) {
                Ok(()) => {}
                Err(ServiceError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
            ToggleOutcome::Added
        };
        debug!(
            subscriber = principal.user_id(),
            channel = channel_id,
            ?outcome,
            "subscription toggled"
        );
        Ok(outcome)
    }

    fn ensure_exists(
        &self,
        collection: &str,
        id: &str,
        noun: &str,
    ) -> Result<(), ServiceError> {
        let found = self
            .store
            .find_one(collection, &[("id", id.into())])
            .map_err(store_err)?;
        if found.is_none() {
            return Err(ServiceError::NotFound(format!("{} '{}' not found", noun, id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{principal, publish, register, svc};

    #[test]
    fn like_toggle_is_its_own_inverse() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");

        assert_eq!(
            s.toggle_like(&alice, LikeTarget::Video, &video.id).unwrap(),
            ToggleOutcome::Added
        );
        assert_eq!(s.store.count("likes", &[]).unwrap(), 1);

        assert_eq!(
            s.toggle_like(&alice, LikeTarget::Video, &video.id).unwrap(),
            ToggleOutcome::Removed
        );
        assert_eq!(s.store.count("likes", &[]).unwrap(), 0);

        assert_eq!(
            s.toggle_like(&alice, LikeTarget::Video, &video.id).unwrap(),
            ToggleOutcome::Added
        );
        assert_eq!(s.store.count("likes", &[]).unwrap(), 1);
    }

    #[test]
    fn likes_on_different_kinds_are_independent() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");
        let tweet = s.create_tweet(&alice, "hello").unwrap();

        s.toggle_like(&alice, LikeTarget::Video, &video.id).unwrap();
        s.toggle_like(&alice, LikeTarget::Tweet, &tweet.id).unwrap();
        assert_eq!(s.store.count("likes", &[]).unwrap(), 2);

        s.toggle_like(&alice, LikeTarget::Tweet, &tweet.id).unwrap();
        assert_eq!(s.store.count("likes", &[]).unwrap(), 1);
    }

    #[test]
    fn like_requires_an_existing_target() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let missing = vidtube_core::new_id();

        assert!(matches!(
            s.toggle_like(&alice, LikeTarget::Video, &missing),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            s.toggle_like(&alice, LikeTarget::Video, "not-a-reference"),
            Err(ServiceError::InvalidReference(_))
        ));
    }

    #[test]
    fn subscription_toggle_round_trips() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = register(&s, "bob");

        assert_eq!(
            s.toggle_subscription(&alice, &bob.id).unwrap(),
            ToggleOutcome::Added
        );
        assert_eq!(
            s.toggle_subscription(&alice, &bob.id).unwrap(),
            ToggleOutcome::Removed
        );
        assert_eq!(s.store.count("subscriptions", &[]).unwrap(), 0);
    }

    #[test]
    fn self_subscription_is_allowed() {
        let s = svc();
        let alice = register(&s, "alice");
        let p = principal(&alice);
        assert_eq!(
            s.toggle_subscription(&p, &alice.id).unwrap(),
            ToggleOutcome::Added
        );
    }

    #[test]
    fn concurrent_duplicate_create_leaves_at_most_one_relation() {
        use std::sync::Arc;

        let s = Arc::new(svc());
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");

        // Both threads race the same check-then-act window. Whatever
        // interleaving happens, the unique tuple caps the edge count.
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let s = Arc::clone(&s);
                let p = alice.clone();
                let vid = video.id.clone();
                std::thread::spawn(move || s.toggle_like(&p, LikeTarget::Video, &vid).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(s.store.count("likes", &[]).unwrap() <= 1);
    }
}
