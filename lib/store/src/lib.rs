pub mod error;
pub mod path;
pub mod pipeline;
pub mod sqlite;
pub mod traits;

pub use error::StoreError;
pub use pipeline::{Accumulator, Group, Lookup, Pipeline, Stage};
pub use sqlite::SqliteStore;
pub use traits::{CollectionSpec, Document, EntityStore, Value};
