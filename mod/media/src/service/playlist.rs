//! Playlists: named, ordered video collections.

use serde::Deserialize;
use serde_json::json;

use vidtube_core::{
    new_id, now_rfc3339, validate_reference, ListResult, PageParams, Principal, ServiceError,
};
use vidtube_store::{Pipeline, Value};

use crate::model::{Playlist, PlaylistWithOwner, Video};
use crate::service::{from_docs, store_err, MediaService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MediaService {
    pub fn create_playlist(
        &self,
        principal: &Principal,
        input: PlaylistInput,
    ) -> Result<Playlist, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation("playlist name is required".into()));
        }
        let now = now_rfc3339();
        let playlist = Playlist {
            id: new_id(),
            owner: principal.user_id().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            videos: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.insert_record("playlists", &playlist)?;
        Ok(playlist)
    }

    /// One playlist with its owner card.
    pub fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistWithOwner, ServiceError> {
        validate_reference(playlist_id)?;
        let playlist: Playlist = self.get_record("playlists", playlist_id)?;

        let docs = Pipeline::new("users")
            .match_eq("id", json!(playlist.owner))
            .project(&["id", "username", "fullname", "avatar"])
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;
        let owner_details = docs
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(crate::service::internal)?;

        Ok(PlaylistWithOwner {
            playlist,
            owner_details,
        })
    }

    /// A user's playlists, newest first.
    pub fn user_playlists(
        &self,
        user_id: &str,
        page: PageParams,
    ) -> Result<ListResult<Playlist>, ServiceError> {
        validate_reference(user_id)?;
        self.get_profile(user_id)?;

        let docs = Pipeline::new("playlists")
            .match_eq("owner", json!(user_id))
            .sort("createdAt", true)
            .skip(page.skip())
            .limit(page.limit())
            .run_with_deadline(self.store.as_ref(), self.view_deadline())
            .map_err(store_err)?;

        let total = self
            .store
            .count("playlists", &[("owner", user_id.into())])
            .map_err(store_err)? as usize;
        Ok(ListResult {
            items: from_docs(docs)?,
            total,
        })
    }

    /// Append a video reference. Duplicates are allowed; the sequence is
    /// the caller's to curate.
    pub fn add_video_to_playlist(
        &self,
        principal: &Principal,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<Playlist, ServiceError> {
        validate_reference(video_id)?;
        let mut playlist = self.owned_playlist(principal, playlist_id)?;
        let _: Video = self.get_record("videos", video_id)?;

        playlist.videos.push(video_id.to_string());
        playlist.updated_at = now_rfc3339();
        self.update_record("playlists", playlist_id, &playlist)?;
        Ok(playlist)
    }

    /// Remove the first occurrence of a video reference.
    pub fn remove_video_from_playlist(
        &self,
        principal: &Principal,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<Playlist, ServiceError> {
        validate_reference(video_id)?;
        let mut playlist = self.owned_playlist(principal, playlist_id)?;

        let pos = playlist
            .videos
            .iter()
            .position(|v| v == video_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("video '{}' is not in this playlist", video_id))
            })?;
        playlist.videos.remove(pos);
        playlist.updated_at = now_rfc3339();
        self.update_record("playlists", playlist_id, &playlist)?;
        Ok(playlist)
    }

    pub fn update_playlist(
        &self,
        principal: &Principal,
        playlist_id: &str,
        input: UpdatePlaylistInput,
    ) -> Result<Playlist, ServiceError> {
        let mut playlist = self.owned_playlist(principal, playlist_id)?;
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation("playlist name must not be empty".into()));
            }
            playlist.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            playlist.description = description;
        }
        playlist.updated_at = now_rfc3339();
        self.update_record("playlists", playlist_id, &playlist)?;
        Ok(playlist)
    }

    pub fn delete_playlist(
        &self,
        principal: &Principal,
        playlist_id: &str,
    ) -> Result<(), ServiceError> {
        self.owned_playlist(principal, playlist_id)?;
        let filters: &[(&str, Value)] = &[("id", playlist_id.into())];
        self.store
            .delete_one("playlists", filters)
            .map_err(store_err)?;
        Ok(())
    }

    fn owned_playlist(
        &self,
        principal: &Principal,
        playlist_id: &str,
    ) -> Result<Playlist, ServiceError> {
        validate_reference(playlist_id)?;
        let playlist: Playlist = self.get_record("playlists", playlist_id)?;
        if playlist.owner != principal.user_id() {
            return Err(ServiceError::Forbidden(
                "only the owner may modify this playlist".into(),
            ));
        }
        Ok(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{principal, publish, register, svc};

    fn make(s: &crate::service::MediaService, p: &Principal, name: &str) -> Playlist {
        s.create_playlist(
            p,
            PlaylistInput {
                name: name.into(),
                description: String::new(),
            },
        )
        .unwrap()
    }

    #[test]
    fn add_and_remove_keep_order_and_take_first_occurrence() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let v1 = publish(&s, &alice, "one");
        let v2 = publish(&s, &alice, "two");
        let playlist = make(&s, &alice, "mix");

        s.add_video_to_playlist(&alice, &playlist.id, &v1.id).unwrap();
        s.add_video_to_playlist(&alice, &playlist.id, &v2.id).unwrap();
        let p = s.add_video_to_playlist(&alice, &playlist.id, &v1.id).unwrap();
        assert_eq!(p.videos, vec![v1.id.clone(), v2.id.clone(), v1.id.clone()]);

        let p = s
            .remove_video_from_playlist(&alice, &playlist.id, &v1.id)
            .unwrap();
        assert_eq!(p.videos, vec![v2.id.clone(), v1.id.clone()]);
    }

    #[test]
    fn removing_an_absent_video_is_not_found() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let video = publish(&s, &alice, "one");
        let playlist = make(&s, &alice, "mix");
        assert!(matches!(
            s.remove_video_from_playlist(&alice, &playlist.id, &video.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn playlist_detail_attaches_owner() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let playlist = make(&s, &alice, "mix");
        let detail = s.get_playlist(&playlist.id).unwrap();
        assert_eq!(detail.owner_details.unwrap().username, "alice");
    }

    #[test]
    fn only_the_owner_may_curate() {
        let s = svc();
        let alice = principal(&register(&s, "alice"));
        let bob = principal(&register(&s, "bob"));
        let video = publish(&s, &alice, "one");
        let playlist = make(&s, &alice, "mix");
        assert!(matches!(
            s.add_video_to_playlist(&bob, &playlist.id, &video.id),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            s.delete_playlist(&bob, &playlist.id),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn user_playlists_lists_only_that_user() {
        let s = svc();
        let alice = register(&s, "alice");
        let alice_p = principal(&alice);
        let bob = principal(&register(&s, "bob"));
        make(&s, &alice_p, "mix");
        make(&s, &bob, "other");

        let list = s.user_playlists(&alice.id, PageParams::default()).unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.items[0].name, "mix");
    }
}
