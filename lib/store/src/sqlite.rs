use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{CollectionSpec, Document, EntityStore, Value};

/// SqliteStore is an EntityStore backed by rusqlite (bundled SQLite).
///
/// Each collection gets one table: `id TEXT PRIMARY KEY`, the full JSON
/// document in a `data TEXT` column, one typeless column per indexed
/// field (values keep their natural affinity), and a `UNIQUE(...)`
/// clause per unique tuple. Insertion order is the implicit rowid.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    specs: HashMap<&'static str, CollectionSpec>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path and register
    /// the collections.
    pub fn open(path: &Path, specs: &[CollectionSpec]) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Storage(e.to_string()))?;

        // WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Self::init(conn, specs)
    }

    /// Create an in-memory database (useful for tests).
    pub fn open_in_memory(specs: &[CollectionSpec]) -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Storage(e.to_string()))?;
        Self::init(conn, specs)
    }

    fn init(conn: Connection, specs: &[CollectionSpec]) -> Result<Self, StoreError> {
        for spec in specs {
            conn.execute_batch(&ddl_for(spec))
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            debug!(collection = spec.name, "collection registered");
        }
        Ok(Self {
            conn: Mutex::new(conn),
            specs: specs.iter().map(|s| (s.name, *s)).collect(),
        })
    }

    fn spec(&self, collection: &str) -> Result<&CollectionSpec, StoreError> {
        self.specs
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
    }
}

/// DDL for one collection table plus secondary indexes.
fn ddl_for(spec: &CollectionSpec) -> String {
    let mut cols = vec!["id TEXT PRIMARY KEY".to_string(), "data TEXT NOT NULL".to_string()];
    for field in spec.indexed {
        cols.push((*field).to_string());
    }
    for tuple in spec.unique {
        cols.push(format!("UNIQUE({})", tuple.join(", ")));
    }
    let mut ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n",
        spec.name,
        cols.join(",\n    "),
    );
    for field in spec.indexed {
        ddl.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{field} ON {table}({field});\n",
            table = spec.name,
            field = field,
        ));
    }
    ddl
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
            }
        })
        .collect()
}

fn where_clause(filters: &[(&str, Value)]) -> (String, Vec<Value>) {
    if filters.is_empty() {
        return (String::new(), Vec::new());
    }
    let mut clauses = Vec::new();
    let mut params = Vec::new();
    for (i, (field, value)) in filters.iter().enumerate() {
        clauses.push(format!("{} = ?{}", field, i + 1));
        params.push(value.clone());
    }
    (format!(" WHERE {}", clauses.join(" AND ")), params)
}

fn doc_id(doc: &Document) -> Result<&str, StoreError> {
    doc.get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| StoreError::Corrupt("document has no string 'id' field".into()))
}

fn map_write_err(e: rusqlite::Error) -> StoreError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint") {
        StoreError::Conflict(msg)
    } else {
        StoreError::Storage(msg)
    }
}

impl EntityStore for SqliteStore {
    fn insert(&self, collection: &str, doc: &Document) -> Result<(), StoreError> {
        let spec = self.spec(collection)?;
        let id = doc_id(doc)?;
        let json = serde_json::to_string(doc).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];
        for field in spec.indexed {
            cols.push(field);
            placeholders.push(format!("?{}", params.len() + 1));
            params.push(Value::from_json(doc.get(*field).unwrap_or(&serde_json::Value::Null)));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            collection,
            cols.join(", "),
            placeholders.join(", "),
        );

        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let bound = bind_params(&params);
        let refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        conn.execute(&sql, refs.as_slice()).map_err(map_write_err)?;
        Ok(())
    }

    fn find(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Document>, StoreError> {
        self.spec(collection)?;
        let (where_sql, params) = where_clause(filters);
        let sql = format!(
            "SELECT data FROM {}{} ORDER BY rowid ASC",
            collection, where_sql
        );

        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let bound = bind_params(&params);
        let refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

        let rows = stmt
            .query_map(refs.as_slice(), |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut docs = Vec::new();
        for row in rows {
            let data = row.map_err(|e| StoreError::Storage(e.to_string()))?;
            docs.push(
                serde_json::from_str(&data).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            );
        }
        Ok(docs)
    }

    fn find_one(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Option<Document>, StoreError> {
        self.spec(collection)?;
        let (where_sql, params) = where_clause(filters);
        let sql = format!(
            "SELECT data FROM {}{} ORDER BY rowid ASC LIMIT 1",
            collection, where_sql
        );

        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let bound = bind_params(&params);
        let refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

        let mut rows = stmt
            .query_map(refs.as_slice(), |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        match rows.next() {
            Some(row) => {
                let data = row.map_err(|e| StoreError::Storage(e.to_string()))?;
                Ok(Some(
                    serde_json::from_str(&data).map_err(|e| StoreError::Corrupt(e.to_string()))?,
                ))
            }
            None => Ok(None),
        }
    }

    fn update_one(&self, collection: &str, id: &str, doc: &Document) -> Result<(), StoreError> {
        let spec = self.spec(collection)?;
        let json = serde_json::to_string(doc).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params = vec![Value::Text(json)];
        for field in spec.indexed {
            sets.push(format!("{} = ?{}", field, params.len() + 1));
            params.push(Value::from_json(doc.get(*field).unwrap_or(&serde_json::Value::Null)));
        }
        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            collection,
            sets.join(", "),
            id_idx,
        );

        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let bound = bind_params(&params);
        let refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        let affected = conn.execute(&sql, refs.as_slice()).map_err(map_write_err)?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("{}/{}", collection, id)));
        }
        Ok(())
    }

    fn delete_one(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<u64, StoreError> {
        self.spec(collection)?;
        let (where_sql, params) = where_clause(filters);
        let sql = format!(
            "DELETE FROM {table} WHERE rowid IN \
             (SELECT rowid FROM {table}{where_sql} ORDER BY rowid ASC LIMIT 1)",
            table = collection,
            where_sql = where_sql,
        );

        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let bound = bind_params(&params);
        let refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        let affected = conn
            .execute(&sql, refs.as_slice())
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(affected as u64)
    }

    fn count(&self, collection: &str, filters: &[(&str, Value)]) -> Result<u64, StoreError> {
        self.spec(collection)?;
        let (where_sql, params) = where_clause(filters);
        let sql = format!("SELECT COUNT(*) FROM {}{}", collection, where_sql);

        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let bound = bind_params(&params);
        let refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        let count: i64 = conn
            .query_row(&sql, refs.as_slice(), |row| row.get(0))
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(count as u64)
    }

    fn is_indexed(&self, collection: &str, field: &str) -> bool {
        // id is the primary key, always indexed.
        self.specs
            .get(collection)
            .map(|spec| field == "id" || spec.indexed.contains(&field))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPECS: &[CollectionSpec] = &[
        CollectionSpec {
            name: "likes",
            indexed: &["likedBy", "targetId", "targetKind"],
            unique: &[&["likedBy", "targetId", "targetKind"]],
        },
        CollectionSpec {
            name: "videos",
            indexed: &["owner", "isPublished"],
            unique: &[],
        },
    ];

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(SPECS).unwrap()
    }

    fn like(id: &str, user: &str, target: &str) -> Document {
        json!({"id": id, "likedBy": user, "targetId": target, "targetKind": "VIDEO"})
    }

    #[test]
    fn insert_and_find_by_indexed_field() {
        let s = store();
        s.insert("likes", &like("a".repeat(32).as_str(), "u1", "v1")).unwrap();
        s.insert("likes", &like("b".repeat(32).as_str(), "u2", "v1")).unwrap();

        let docs = s.find("likes", &[("targetId", "v1".into())]).unwrap();
        assert_eq!(docs.len(), 2);
        let docs = s.find("likes", &[("likedBy", "u1".into())]).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn duplicate_relation_is_a_conflict() {
        let s = store();
        s.insert("likes", &like("a".repeat(32).as_str(), "u1", "v1")).unwrap();
        let err = s
            .insert("likes", &like("b".repeat(32).as_str(), "u1", "v1"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn delete_one_removes_a_single_row() {
        let s = store();
        s.insert("likes", &like("a".repeat(32).as_str(), "u1", "v1")).unwrap();
        assert_eq!(s.delete_one("likes", &[("likedBy", "u1".into())]).unwrap(), 1);
        assert_eq!(s.delete_one("likes", &[("likedBy", "u1".into())]).unwrap(), 0);
    }

    #[test]
    fn find_returns_insertion_order() {
        let s = store();
        for i in 0..5 {
            let id = format!("{:032x}", i);
            s.insert("videos", &json!({"id": id, "owner": "u1", "isPublished": true, "n": i}))
                .unwrap();
        }
        let docs = s.find("videos", &[("owner", "u1".into())]).unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn boolean_filters_match_as_integers() {
        let s = store();
        s.insert(
            "videos",
            &json!({"id": "a".repeat(32), "owner": "u1", "isPublished": true}),
        )
        .unwrap();
        s.insert(
            "videos",
            &json!({"id": "b".repeat(32), "owner": "u1", "isPublished": false}),
        )
        .unwrap();
        let published = s.find("videos", &[("isPublished", true.into())]).unwrap();
        assert_eq!(published.len(), 1);
    }

    #[test]
    fn update_one_replaces_document_and_indexes() {
        let s = store();
        let id = "a".repeat(32);
        s.insert("videos", &json!({"id": &id, "owner": "u1", "isPublished": false}))
            .unwrap();
        s.update_one("videos", &id, &json!({"id": &id, "owner": "u1", "isPublished": true}))
            .unwrap();
        assert_eq!(s.count("videos", &[("isPublished", true.into())]).unwrap(), 1);

        let err = s
            .update_one("videos", "missing", &json!({"id": "missing"}))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn unknown_collection_is_rejected() {
        let s = store();
        let err = s.find("nope", &[]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownCollection(_)));
    }

    #[test]
    fn open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        {
            let s = SqliteStore::open(&path, SPECS).unwrap();
            s.insert("likes", &like("a".repeat(32).as_str(), "u1", "v1")).unwrap();
        }
        let s = SqliteStore::open(&path, SPECS).unwrap();
        assert_eq!(s.count("likes", &[]).unwrap(), 1);
    }
}
