pub mod comment;
pub mod playlist;
pub mod schema;
pub mod toggle;
pub mod tweet;
pub mod user;
pub mod video;
pub mod views;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use vidtube_blob::BlobStore;
use vidtube_core::ServiceError;
use vidtube_store::{EntityStore, StoreError, Value};

/// Media service — holds the entity and media stores and provides all
/// business logic (toggles, derived views, content CRUD).
pub struct MediaService {
    pub(crate) store: Arc<dyn EntityStore>,
    pub(crate) media: Arc<dyn BlobStore>,
    view_timeout: Duration,
}

impl MediaService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        media: Arc<dyn BlobStore>,
        view_timeout: Duration,
    ) -> Self {
        Self {
            store,
            media,
            view_timeout,
        }
    }

    /// Deadline applied to every aggregation-view read.
    pub(crate) fn view_deadline(&self) -> Option<Instant> {
        Some(Instant::now() + self.view_timeout)
    }

    // ── Generic record helpers ──

    pub(crate) fn insert_record<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<(), ServiceError> {
        let doc = serde_json::to_value(record).map_err(internal)?;
        self.store.insert(collection, &doc).map_err(store_err)
    }

    /// Get a record by id, or NotFound.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        self.try_get_record(collection, id)?
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{} not found", collection, id)))
    }

    pub(crate) fn try_get_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, ServiceError> {
        let doc = self
            .store
            .find_one(collection, &[("id", Value::from(id))])
            .map_err(store_err)?;
        doc.map(|d| serde_json::from_value(d).map_err(internal))
            .transpose()
    }

    pub(crate) fn update_record<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        record: &T,
    ) -> Result<(), ServiceError> {
        let doc = serde_json::to_value(record).map_err(internal)?;
        self.store.update_one(collection, id, &doc).map_err(store_err)
    }
}

/// Map store failures onto the service taxonomy. Conflict, NotFound and
/// Timeout keep their meaning; everything else is a storage failure.
pub(crate) fn store_err(e: StoreError) -> ServiceError {
    match e {
        StoreError::Conflict(msg) => ServiceError::Conflict(msg),
        StoreError::NotFound(msg) => ServiceError::NotFound(msg),
        StoreError::Timeout(msg) => ServiceError::Timeout(msg),
        other => ServiceError::Storage(other.to_string()),
    }
}

pub(crate) fn internal(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Internal(e.to_string())
}

pub(crate) fn from_docs<T: DeserializeOwned>(
    docs: Vec<serde_json::Value>,
) -> Result<Vec<T>, ServiceError> {
    docs.into_iter()
        .map(|d| serde_json::from_value(d).map_err(internal))
        .collect()
}
