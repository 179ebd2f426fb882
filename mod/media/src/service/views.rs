//! Derived views over the entity store, each a fixed aggregation
//! pipeline. Every read runs under the service's view deadline; an
//! empty result is a successful empty list, never NotFound.

use serde_json::json;
use tracing::debug;

use vidtube_core::{authorize_owner, validate_reference, ListResult, PageParams, Principal, ServiceError};
use vidtube_store::{Accumulator, Group, Lookup, Pipeline, Stage};

use crate::model::{
    ChannelEntry, ChannelStats, CommentView, LikedVideoView, SubscriberEntry, Video,
    VideoWithOwner,
};
use crate::service::{from_docs, store_err, MediaService};

/// Default page size of the liked-videos feed.
const LIKED_VIDEOS_PAGE: usize = 20;

/// Caller-selected catalog ordering.
#[derive(Debug, Clone)]
pub struct CatalogSort {
    pub field: String,
    pub descending: bool,
}

impl Default for CatalogSort {
    fn default() -> Self {
        Self {
            field: "createdAt".to_string(),
            descending: true,
        }
    }
}

/// Projection lookup attaching a user card under `as_field`. The field
/// list is the view's redaction boundary.
fn user_lookup(local_field: &str, as_field: &str, fields: &[&str]) -> Lookup {
    Lookup {
        from: "users".into(),
        local_field: local_field.into(),
        foreign_field: "id".into(),
        as_field: as_field.into(),
        pipeline: vec![Stage::Project {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }],
    }
}

impl MediaService {
    /// Comments on a video in insertion order, each with its author
    /// card. The video must exist; no comments yields an empty page.
    pub fn video_comments(
        &self,
        video_id: &str,
        page: PageParams,
    ) -> Result<ListResult<CommentView>, ServiceError> {
        validate_reference(video_id)?;
        let _: Video = self.get_record("videos", video_id)?;

        // No sort stage: comments page in insertion order.
        let docs = Pipeline::new("comments")
            .match_eq("video", json!(video_id))
            .lookup(user_lookup("owner", "owner", &["id", "username", "fullname", "avatar"]))
            .first("owner")
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let total = self
            .store
            .count("comments", &[("video", video_id.into())])
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    /// The caller's liked videos, newest video first. Each like is
    /// joined with its video and the video's owner card; likes whose
    /// video has since been deleted drop out of the feed.
    pub fn liked_videos(
        &self,
        principal: &Principal,
        page: PageParams,
    ) -> Result<ListResult<LikedVideoView>, ServiceError> {
        let page = page.or_limit(LIKED_VIDEOS_PAGE);

        let video_lookup = Lookup {
            from: "videos".into(),
            local_field: "targetId".into(),
            foreign_field: "id".into(),
            as_field: "video".into(),
            pipeline: vec![
                Stage::Lookup(user_lookup("owner", "owner", &["id", "username", "fullname", "avatar"])),
                Stage::First {
                    path: "owner".into(),
                },
                Stage::Project {
                    fields: [
                        "id",
                        "videoFile",
                        "thumbnail",
                        "title",
                        "duration",
                        "views",
                        "createdAt",
                        "owner",
                    ]
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                },
            ],
        };

        let docs = Pipeline::new("likes")
            .match_eq("likedBy", json!(principal.user_id()))
            .match_eq("targetKind", json!("VIDEO"))
            .lookup(video_lookup)
            .unwind("video", false)
            .sort("video.createdAt", true)
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        // Counts like rows, so a like on a deleted video still counts.
        let total = self
            .store
            .count(
                "likes",
                &[
                    ("likedBy", principal.user_id().into()),
                    ("targetKind", "VIDEO".into()),
                ],
            )
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    /// Who subscribes to a channel. Owner-only: a channel's subscriber
    /// list is visible to that channel alone.
    pub fn channel_subscribers(
        &self,
        principal: &Principal,
        channel_id: &str,
        page: PageParams,
    ) -> Result<ListResult<SubscriberEntry>, ServiceError> {
        validate_reference(channel_id)?;
        authorize_owner(principal.user_id(), channel_id)?;

        let docs = Pipeline::new("subscriptions")
            .match_eq("channel", json!(channel_id))
            .lookup(user_lookup(
                "subscriber",
                "subscriber",
                &["id", "username", "email", "fullname", "avatar"],
            ))
            .unwind("subscriber", false)
            .sort("createdAt", false)
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let total = self
            .store
            .count("subscriptions", &[("channel", channel_id.into())])
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    /// Which channels a user subscribes to. Owner-only, same gate as the
    /// subscriber list.
    pub fn subscribed_channels(
        &self,
        principal: &Principal,
        user_id: &str,
        page: PageParams,
    ) -> Result<ListResult<ChannelEntry>, ServiceError> {
        validate_reference(user_id)?;
        authorize_owner(principal.user_id(), user_id)?;

        let docs = Pipeline::new("subscriptions")
            .match_eq("subscriber", json!(user_id))
            .lookup(user_lookup("channel", "channel", &["id", "username", "avatar"]))
            .unwind("channel", false)
            .sort("createdAt", true)
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let total = self
            .store
            .count("subscriptions", &[("subscriber", user_id.into())])
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    /// Aggregated statistics for a channel: subscriber count plus video,
    /// view and like totals over the channel's videos. A channel with no
    /// videos reports zeros, not an absent row.
    pub fn channel_stats(&self, channel_id: &str) -> Result<ChannelStats, ServiceError> {
        validate_reference(channel_id)?;

        let subscriber_lookup = Lookup {
            from: "subscriptions".into(),
            local_field: "id".into(),
            foreign_field: "channel".into(),
            as_field: "subs".into(),
            pipeline: Vec::new(),
        };
        let video_lookup = Lookup {
            from: "videos".into(),
            local_field: "id".into(),
            foreign_field: "owner".into(),
            as_field: "videos".into(),
            pipeline: vec![
                Stage::Lookup(Lookup {
                    from: "likes".into(),
                    local_field: "id".into(),
                    foreign_field: "targetId".into(),
                    as_field: "likes".into(),
                    pipeline: vec![Stage::Match {
                        field: "targetKind".into(),
                        value: json!("VIDEO"),
                    }],
                }),
                Stage::AddCount {
                    path: "likes".into(),
                    target: "likesCount".into(),
                },
                Stage::Project {
                    fields: ["id", "views", "likesCount"]
                        .iter()
                        .map(|f| f.to_string())
                        .collect(),
                },
            ],
        };

        let docs = Pipeline::new("users")
            .match_eq("id", json!(channel_id))
            .lookup(subscriber_lookup)
            .add_count("subs", "totalSubscribers")
            .lookup(video_lookup)
            // Preserving the empty unwind is what keeps a zero-video
            // channel in the group with a null placeholder.
            .unwind("videos", true)
            .group(Group {
                by: "id".into(),
                fields: vec![
                    (
                        "totalSubscribers".into(),
                        Accumulator::First("totalSubscribers".into()),
                    ),
                    ("totalVideos".into(), Accumulator::CountNonNull("videos".into())),
                    ("totalViews".into(), Accumulator::Sum("videos.views".into())),
                    (
                        "totalLikes".into(),
                        Accumulator::Sum("videos.likesCount".into()),
                    ),
                ],
            })
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let doc = docs
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("channel '{}' not found", channel_id)))?;
        debug!(channel = channel_id, "channel stats computed");
        serde_json::from_value(doc).map_err(crate::service::internal)
    }

    /// Public catalog: published videos with owner cards. The caller
    /// picks the sort field and direction; default is newest first.
    pub fn all_videos(
        &self,
        page: PageParams,
        sort: CatalogSort,
    ) -> Result<ListResult<VideoWithOwner>, ServiceError> {
        let docs = Pipeline::new("videos")
            .match_eq("isPublished", json!(true))
            .lookup(user_lookup("owner", "ownerDetails", &["id", "username", "avatar"]))
            .first("ownerDetails")
            .sort(sort.field, sort.descending)
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let total = self
            .store
            .count("videos", &[("isPublished", true.into())])
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    /// Every video of the caller's channel, drafts included.
    pub fn dashboard_videos(&self, principal: &Principal) -> Result<Vec<Video>, ServiceError> {
        let docs = Pipeline::new("videos")
            .match_eq("owner", json!(principal.user_id()))
            .sort("createdAt", true)
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;
        from_docs(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LikeTarget;
    use crate::service::testutil::{principal, publish, register, svc, svc_with_timeout};
    use std::time::Duration;

    #[test]
    fn comments_view_attaches_author_and_redacts_credentials() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = principal(&register(&s, "bob"));
        let video = publish(&s, &alice, "clip");

        s.add_comment(&bob, &video.id, "first").unwrap();
        s.add_comment(&alice, &video.id, "thanks").unwrap();

        let list = s.video_comments(&video.id, PageParams::default()).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.items.len(), 2);
        // Insertion order; authors carry no credential fields by shape.
        assert_eq!(list.items[0].content, "first");
        let author = list.items[0].owner.as_ref().unwrap();
        assert_eq!(author.username, "bob");
        assert!(author.email.is_none());
    }

    #[test]
    fn comments_on_missing_video_are_not_found_but_zero_comments_are_empty() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");

        let list = s.video_comments(&video.id, PageParams::default()).unwrap();
        assert_eq!(list.total, 0);
        assert!(list.items.is_empty());

        let missing = vidtube_core::new_id();
        assert!(matches!(
            s.video_comments(&missing, PageParams::default()),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn liked_videos_feed_joins_video_and_owner_newest_video_first() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = principal(&register(&s, "bob"));
        let v1 = publish(&s, &alice, "one");
        let v2 = publish(&s, &alice, "two");

        s.toggle_like(&bob, LikeTarget::Video, &v1.id).unwrap();
        s.toggle_like(&bob, LikeTarget::Video, &v2.id).unwrap();

        let feed = s.liked_videos(&bob, PageParams::default()).unwrap();
        assert_eq!(feed.total, 2);
        let titles: Vec<&str> = feed.items.iter().map(|e| e.video.title.as_str()).collect();
        assert_eq!(titles, vec!["two", "one"]);
        assert_eq!(
            feed.items[0].video.owner.as_ref().unwrap().username,
            "alice"
        );
    }

    #[test]
    fn liked_videos_drop_likes_on_deleted_videos() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = principal(&register(&s, "bob"));
        let v1 = publish(&s, &alice, "one");
        let v2 = publish(&s, &alice, "two");

        s.toggle_like(&bob, LikeTarget::Video, &v1.id).unwrap();
        s.toggle_like(&bob, LikeTarget::Video, &v2.id).unwrap();
        s.delete_video(&alice, &v1.id).unwrap();

        let feed = s.liked_videos(&bob, PageParams::default()).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].video.title, "two");
    }

    #[test]
    fn subscriber_list_is_owner_only() {
        let s = svc();
        let alice = register(&s, "alice");
        let alice_p = principal(&alice);
        let bob = principal(&register(&s, "bob"));

        s.toggle_subscription(&bob, &alice.id).unwrap();

        let list = s
            .channel_subscribers(&alice_p, &alice.id, PageParams::default())
            .unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.items[0].subscriber.username, "bob");

        assert!(matches!(
            s.channel_subscribers(&bob, &alice.id, PageParams::default()),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn subscribed_channels_list_is_owner_only() {
        let s = svc();
        let alice = register(&s, "alice");
        let alice_p = principal(&alice);
        let bob = register(&s, "bob");
        let bob_p = principal(&bob);

        s.toggle_subscription(&bob_p, &alice.id).unwrap();

        let list = s
            .subscribed_channels(&bob_p, &bob.id, PageParams::default())
            .unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].channel.username, "alice");

        assert!(matches!(
            s.subscribed_channels(&alice_p, &bob.id, PageParams::default()),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn channel_stats_aggregate_videos_views_likes_and_subscribers() {
        let s = svc();
        let alice = register(&s, "alice");
        let alice_p = principal(&alice);
        let bob = principal(&register(&s, "bob"));

        let v1 = publish(&s, &alice_p, "one");
        let v2 = publish(&s, &alice_p, "two");
        s.get_video(&v1.id).unwrap();
        s.get_video(&v1.id).unwrap();
        s.get_video(&v2.id).unwrap();
        s.toggle_like(&bob, LikeTarget::Video, &v1.id).unwrap();
        s.toggle_subscription(&bob, &alice.id).unwrap();

        let stats = s.channel_stats(&alice.id).unwrap();
        assert_eq!(stats.id, alice.id);
        assert_eq!(stats.total_subscribers, 1);
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.total_views, 3);
        assert_eq!(stats.total_likes, 1);
    }

    #[test]
    fn channel_with_no_videos_reports_zeros() {
        let s = svc();
        let alice = register(&s, "alice");
        let bob = principal(&register(&s, "bob"));
        let carol = principal(&register(&s, "carol"));
        s.toggle_subscription(&bob, &alice.id).unwrap();
        s.toggle_subscription(&carol, &alice.id).unwrap();

        let stats = s.channel_stats(&alice.id).unwrap();
        assert_eq!(stats.total_subscribers, 2);
        assert_eq!(stats.total_videos, 0);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.total_likes, 0);
    }

    #[test]
    fn stats_for_a_missing_channel_are_not_found() {
        let s = svc();
        let missing = vidtube_core::new_id();
        assert!(matches!(
            s.channel_stats(&missing),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn catalog_shows_only_published_videos_with_owner_cards() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let v1 = publish(&s, &alice, "public");
        let v2 = publish(&s, &alice, "draft");
        s.toggle_publish(&alice, &v2.id).unwrap();

        let list = s
            .all_videos(PageParams::default(), CatalogSort::default())
            .unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.items[0].video.id, v1.id);
        assert_eq!(
            list.items[0].owner_details.as_ref().unwrap().username,
            "alice"
        );
    }

    #[test]
    fn catalog_sort_field_and_direction_are_caller_selected() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        publish(&s, &alice, "banana");
        publish(&s, &alice, "apple");

        let list = s
            .all_videos(
                PageParams::default(),
                CatalogSort {
                    field: "title".into(),
                    descending: false,
                },
            )
            .unwrap();
        let titles: Vec<&str> = list.items.iter().map(|v| v.video.title.as_str()).collect();
        assert_eq!(titles, vec!["apple", "banana"]);
    }

    #[test]
    fn pagination_sweep_covers_every_comment_exactly_once() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "clip");
        for i in 0..7 {
            s.add_comment(&alice, &video.id, &format!("c{}", i)).unwrap();
        }

        let mut seen = Vec::new();
        for page in 1.. {
            let list = s
                .video_comments(&video.id, PageParams::new(page, 3))
                .unwrap();
            if list.items.is_empty() {
                break;
            }
            seen.extend(list.items.into_iter().map(|c| c.id));
        }
        assert_eq!(seen.len(), 7);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn expired_view_deadline_surfaces_timeout() {
        let s = svc_with_timeout(Duration::ZERO);
        let alice = principal(&register(&s, "alice"));
        assert!(matches!(
            s.liked_videos(&alice, PageParams::default()),
            Err(ServiceError::Timeout(_))
        ));
    }
}
