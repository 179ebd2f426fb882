use crate::error::StoreError;

/// A stored record. Documents are JSON objects carrying at least an
/// `id` field (32 lowercase hex chars) and a `createdAt` timestamp.
pub type Document = serde_json::Value;

/// A dynamically-typed indexed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Convert a JSON value to its indexed representation. Booleans are
    /// stored as 0/1; arrays and objects are not indexable and map to
    /// Null.
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Integer(*b as i64),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Real(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Value::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Integer(b as i64)
    }
}

/// Static description of a collection, registered at open time.
///
/// `indexed` names the document fields extracted into their own columns
/// so equality predicates can be pushed down; `unique` names the field
/// tuples the store must reject duplicates for. Relation collections
/// (likes, subscriptions) rely on `unique` to turn a racing duplicate
/// create into a safe conflict instead of a second record.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub indexed: &'static [&'static str],
    pub unique: &'static [&'static [&'static str]],
}

/// The Entity Store: document storage with equality matching and
/// uniqueness constraints. All reads return documents in insertion
/// order so sort ties stay deterministic.
pub trait EntityStore: Send + Sync {
    /// Insert a document. Indexed fields are extracted from the document
    /// itself; a uniqueness violation maps to [`StoreError::Conflict`].
    fn insert(&self, collection: &str, doc: &Document) -> Result<(), StoreError>;

    /// All documents matching the equality predicates, insertion order.
    fn find(&self, collection: &str, filters: &[(&str, Value)])
        -> Result<Vec<Document>, StoreError>;

    /// First matching document, if any.
    fn find_one(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Option<Document>, StoreError>;

    /// Replace the document with the given id.
    /// [`StoreError::NotFound`] when no row matches.
    fn update_one(&self, collection: &str, id: &str, doc: &Document) -> Result<(), StoreError>;

    /// Delete at most one matching document. Returns the affected count.
    fn delete_one(&self, collection: &str, filters: &[(&str, Value)])
        -> Result<u64, StoreError>;

    /// Count documents matching the equality predicates.
    fn count(&self, collection: &str, filters: &[(&str, Value)]) -> Result<u64, StoreError>;

    /// Whether a field has an extracted column in this collection —
    /// the aggregation executor uses this to decide which Match stages
    /// can be pushed down into `find`.
    fn is_indexed(&self, collection: &str, field: &str) -> bool;
}
