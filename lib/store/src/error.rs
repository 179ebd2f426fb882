use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A write hit a uniqueness constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No row matched a targeted update.
    #[error("not found: {0}")]
    NotFound(String),

    /// The collection was not registered at open time.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// An aggregation exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A stored document failed to parse or is not an object.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// Underlying database failure.
    #[error("storage error: {0}")]
    Storage(String),
}
