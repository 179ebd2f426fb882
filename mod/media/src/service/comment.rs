//! Comment CRUD. Listing lives in the views module.

use serde::Deserialize;

use vidtube_core::{new_id, now_rfc3339, validate_reference, Principal, ServiceError};
use vidtube_store::Value;

use crate::model::{Comment, Video};
use crate::service::{store_err, MediaService};

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

impl MediaService {
    /// Attach a comment to an existing video.
    pub fn add_comment(
        &self,
        principal: &Principal,
        video_id: &str,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        validate_reference(video_id)?;
        if content.trim().is_empty() {
            return Err(ServiceError::Validation("comment content is required".into()));
        }
        let _: Video = self.get_record("videos", video_id)?;

        let now = now_rfc3339();
        let comment = Comment {
            id: new_id(),
            owner: principal.user_id().to_string(),
            video: video_id.to_string(),
            content: content.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.insert_record("comments", &comment)?;
        Ok(comment)
    }

    /// Edit a comment's text. Owner only.
    pub fn update_comment(
        &self,
        principal: &Principal,
        comment_id: &str,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::Validation("comment content is required".into()));
        }
        let mut comment = self.owned_comment(principal, comment_id)?;
        comment.content = content.trim().to_string();
        comment.updated_at = now_rfc3339();
        self.update_record("comments", comment_id, &comment)?;
        Ok(comment)
    }

    /// Delete a comment. Owner only.
    pub fn delete_comment(
        &self,
        principal: &Principal,
        comment_id: &str,
    ) -> Result<(), ServiceError> {
        self.owned_comment(principal, comment_id)?;
        let filters: &[(&str, Value)] = &[("id", comment_id.into())];
        self.store.delete_one("comments", filters).map_err(store_err)?;
        Ok(())
    }

    fn owned_comment(
        &self,
        principal: &Principal,
        comment_id: &str,
    ) -> Result<Comment, ServiceError> {
        validate_reference(comment_id)?;
        let comment: Comment = self.get_record("comments", comment_id)?;
        if comment.owner != principal.user_id() {
            return Err(ServiceError::Forbidden(
                "only the owner may modify this comment".into(),
            ));
        }
        Ok(comment)
    }
}
