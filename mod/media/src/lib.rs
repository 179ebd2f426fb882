pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use vidtube_core::Module;

use service::MediaService;

/// Media module — users, videos, tweets, comments, likes,
/// subscriptions, playlists and the derived views over them.
pub struct MediaModule {
    service: Arc<MediaService>,
}

impl MediaModule {
    pub fn new(service: MediaService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Wrap an already-shared service (the binary also hands it to the
    /// login endpoint).
    pub fn with_service(service: Arc<MediaService>) -> Self {
        Self { service }
    }
}

impl Module for MediaModule {
    fn name(&self) -> &str {
        "media"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
