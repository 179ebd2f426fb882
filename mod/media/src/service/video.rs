//! Video lifecycle: publish, fetch, edit, delete, publish toggle.
//! Media bytes are uploaded to the blob store first; records reference
//! them by key and publishing validates the keys exist.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use vidtube_core::{new_id, now_rfc3339, validate_reference, Principal, ServiceError};
use vidtube_store::Pipeline;

use crate::model::{Video, VideoWithOwner};
use crate::service::{store_err, MediaService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideoInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration: f64,
    pub video_file: String,
    pub thumbnail: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl MediaService {
    /// Publish a new video. Both media keys must already be uploaded.
    pub fn publish_video(
        &self,
        principal: &Principal,
        input: PublishVideoInput,
    ) -> Result<Video, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::Validation("title is required".into()));
        }
        if !input.duration.is_finite() || input.duration < 0.0 {
            return Err(ServiceError::Validation("duration must be non-negative".into()));
        }
        self.ensure_media_key(&input.video_file)?;
        self.ensure_media_key(&input.thumbnail)?;

        let now = now_rfc3339();
        let video = Video {
            id: new_id(),
            owner: principal.user_id().to_string(),
            video_file: input.video_file,
            thumbnail: input.thumbnail,
            title: input.title.trim().to_string(),
            description: input.description,
            duration: input.duration,
            views: 0,
            is_published: true,
            created_at: now.clone(),
            updated_at: now,
        };
        self.insert_record("videos", &video)?;
        info!(video = %video.id, owner = principal.user_id(), "video published");
        Ok(video)
    }

    /// Fetch one video with its owner card and bump the view counter.
    pub fn get_video(&self, video_id: &str) -> Result<VideoWithOwner, ServiceError> {
        validate_reference(video_id)?;

        let mut video: Video = self.get_record("videos", video_id)?;
        video.views += 1;
        self.update_record("videos", video_id, &video)?;

        let docs = Pipeline::new("users")
            .match_eq("id", json!(video.owner))
            .project(&["id", "username", "fullname", "avatar"])
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;
        let owner_details = docs
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(crate::service::internal)?;

        Ok(VideoWithOwner {
            video,
            owner_details,
        })
    }

    /// Edit title, description or thumbnail. Owner only.
    pub fn update_video(
        &self,
        principal: &Principal,
        video_id: &str,
        input: UpdateVideoInput,
    ) -> Result<Video, ServiceError> {
        let mut video = self.owned_video(principal, video_id)?;
        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation("title must not be empty".into()));
            }
            video.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            video.description = description;
        }
        if let Some(thumbnail) = input.thumbnail {
            self.ensure_media_key(&thumbnail)?;
            // Old thumbnail becomes unreferenced; drop its bytes.
            let _ = self.media.delete(&video.thumbnail);
            video.thumbnail = thumbnail;
        }
        video.updated_at = now_rfc3339();
        self.update_record("videos", video_id, &video)?;
        Ok(video)
    }

    /// Delete a video and its media bytes. Owner only. Likes and
    /// comments referencing it are left behind; the views drop them.
    pub fn delete_video(&self, principal: &Principal, video_id: &str) -> Result<(), ServiceError> {
        let video = self.owned_video(principal, video_id)?;
        self.store
            .delete_one("videos", &[("id", video_id.into())])
            .map_err(store_err)?;
        let _ = self.media.delete(&video.video_file);
        let _ = self.media.delete(&video.thumbnail);
        info!(video = video_id, owner = principal.user_id(), "video deleted");
        Ok(())
    }

    /// Flip a video between published and draft. Owner only.
    pub fn toggle_publish(
        &self,
        principal: &Principal,
        video_id: &str,
    ) -> Result<Video, ServiceError> {
        let mut video = self.owned_video(principal, video_id)?;
        video.is_published = !video.is_published;
        video.updated_at = now_rfc3339();
        self.update_record("videos", video_id, &video)?;
        Ok(video)
    }

    fn owned_video(&self, principal: &Principal, video_id: &str) -> Result<Video, ServiceError> {
        validate_reference(video_id)?;
        let video: Video = self.get_record("videos", video_id)?;
        if video.owner != principal.user_id() {
            return Err(ServiceError::Forbidden(
                "only the owner may modify this video".into(),
            ));
        }
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{principal, publish, register, svc};
    use vidtube_blob::BlobStore;

    #[test]
    fn publish_requires_uploaded_media_keys() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let err = s
            .publish_video(
                &alice,
                PublishVideoInput {
                    title: "clip".into(),
                    description: String::new(),
                    duration: 10.0,
                    video_file: "videos/none.mp4".into(),
                    thumbnail: "thumbnails/none.png".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn get_video_attaches_owner_and_counts_the_view() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");

        let first = s.get_video(&video.id).unwrap();
        assert_eq!(first.video.views, 1);
        assert_eq!(first.owner_details.unwrap().username, "alice");

        let second = s.get_video(&video.id).unwrap();
        assert_eq!(second.video.views, 2);
    }

    #[test]
    fn only_the_owner_may_update_or_delete() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = principal(&register(&s, "bob"));
        let video = publish(&s, &alice, "clip");

        assert!(matches!(
            s.update_video(
                &bob,
                &video.id,
                UpdateVideoInput {
                    title: Some("stolen".into()),
                    description: None,
                    thumbnail: None
                }
            ),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            s.delete_video(&bob, &video.id),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn delete_removes_record_and_blobs() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");

        s.delete_video(&alice, &video.id).unwrap();
        assert!(matches!(
            s.get_video(&video.id),
            Err(ServiceError::NotFound(_))
        ));
        assert!(!s.media.exists(&video.video_file).unwrap());
    }

    #[test]
    fn publish_toggle_flips_the_flag() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");
        assert!(video.is_published);
        assert!(!s.toggle_publish(&alice, &video.id).unwrap().is_published);
        assert!(s.toggle_publish(&alice, &video.id).unwrap().is_published);
    }
}
