//! Tweet CRUD plus the per-user listing.

use serde_json::json;

use vidtube_core::{
    new_id, now_rfc3339, validate_reference, ListResult, PageParams, Principal, ServiceError,
};
use vidtube_store::{Pipeline, Value};

use crate::model::Tweet;
use crate::service::{from_docs, store_err, MediaService};

impl MediaService {
    pub fn create_tweet(&self, principal: &Principal, content: &str) -> Result<Tweet, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::Validation("tweet content is required".into()));
        }
        let now = now_rfc3339();
        let tweet = Tweet {
            id: new_id(),
            owner: principal.user_id().to_string(),
            content: content.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.insert_record("tweets", &tweet)?;
        Ok(tweet)
    }

    /// A user's tweets, newest first. The user must exist; no tweets is
    /// an empty page.
    pub fn user_tweets(
        &self,
        user_id: &str,
        page: PageParams,
    ) -> Result<ListResult<Tweet>, ServiceError> {
        validate_reference(user_id)?;
        self.get_profile(user_id)?;

        let docs = Pipeline::new("tweets")
            .match_eq("owner", json!(user_id))
            .sort("createdAt", true)
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let total = self
            .store
            .count("tweets", &[("owner", user_id.into())])
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    pub fn update_tweet(
        &self,
        principal: &Principal,
        tweet_id: &str,
        content: &str,
    ) -> Result<Tweet, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::Validation("tweet content is required".into()));
        }
        let mut tweet = self.owned_tweet(principal, tweet_id)?;
        tweet.content = content.trim().to_string();
        tweet.updated_at = now_rfc3339();
        self.update_record("tweets", tweet_id, &tweet)?;
        Ok(tweet)
    }

    pub fn delete_tweet(&self, principal: &Principal, tweet_id: &str) -> Result<(), ServiceError> {
        self.owned_tweet(principal, tweet_id)?;
        let filters: &[(&str, Value)] = &[("id", tweet_id.into())];
        self.store.delete_one("tweets", filters).map_err(store_err)?;
        Ok(())
    }

    fn owned_tweet(&self, principal: &Principal, tweet_id: &str) -> Result<Tweet, ServiceError> {
        validate_reference(tweet_id)?;
        let tweet: Tweet = self.get_record("tweets", tweet_id)?;
        if tweet.owner != principal.user_id() {
            return Err(ServiceError::Forbidden(
                "only the owner may modify this tweet".into(),
            ));
        }
        Ok(tweet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{principal, register, svc};

    #[test]
    fn tweet_crud_round_trip() {
        let s = svc();
        let alice = register(&s, "alice");
        let p = principal(&alice);

        let tweet = s.create_tweet(&p, "hello").unwrap();
        let updated = s.update_tweet(&p, &tweet.id, "edited").unwrap();
        assert_eq!(updated.content, "edited");

        let list = s.user_tweets(&alice.id, PageParams::default()).unwrap();
        assert_eq!(list.total, 1);

        s.delete_tweet(&p, &tweet.id).unwrap();
        let list = s.user_tweets(&alice.id, PageParams::default()).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn tweets_list_newest_first() {
        let s = svc();
        let alice = register(&s, "alice");
        let p = principal(&alice);
        s.create_tweet(&p, "first").unwrap();
        s.create_tweet(&p, "second").unwrap();

        let list = s.user_tweets(&alice.id, PageParams::default()).unwrap();
        let contents: Vec<&str> = list.items.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[test]
    fn tweets_of_a_missing_user_are_not_found() {
        let s = svc();
        let missing = vidtube_core::new_id();
        assert!(matches!(
            s.user_tweets(&missing, PageParams::default()),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn only_the_author_may_edit() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = principal(&register(&s, "bob"));
        let tweet = s.create_tweet(&alice, "mine").unwrap();
        assert!(matches!(
            s.update_tweet(&bob, &tweet.id, "hijack"),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
