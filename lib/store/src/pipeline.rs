//! The aggregation pipeline: read-only derived views over the Entity
//! Store, built from Match/Lookup/Unwind/Project/Group/Sort stages.
//!
//! Leading Match stages on indexed fields are pushed down into the
//! store's `find`; everything else executes in memory over the fetched
//! documents. Lookups are left-outer one-to-many joins and may carry a
//! nested pipeline (projection or a further lookup), bounded at depth 2.
//!
//! Reads are not transactionally isolated from concurrent writes: a
//! pipeline may observe a different snapshot at different join stages.
//! Acceptable for these social-feature views.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value as Json;

use crate::error::StoreError;
use crate::path::{get_path, set_path};
use crate::traits::{Document, EntityStore, Value};

const MAX_LOOKUP_DEPTH: usize = 2;

/// One pipeline stage.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Equality filter on a document field.
    Match { field: String, value: Json },
    /// Left-outer one-to-many join attaching an array of documents.
    Lookup(Lookup),
    /// One output document per array element. With preservation on, a
    /// document whose array is empty or missing survives with the path
    /// set to null.
    Unwind {
        path: String,
        preserve_null_and_empty: bool,
    },
    /// Collapse a joined array to its first element (or null).
    First { path: String },
    /// Keep only the named top-level fields.
    Project { fields: Vec<String> },
    /// Attach an array's length as a number.
    AddCount { path: String, target: String },
    /// Collapse to one document per group key.
    Group(Group),
    /// Stable sort; ties keep insertion order.
    Sort { field: String, descending: bool },
    Skip(usize),
    Limit(usize),
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
    pub pipeline: Vec<Stage>,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub by: String,
    pub fields: Vec<(String, Accumulator)>,
}

#[derive(Debug, Clone)]
pub enum Accumulator {
    /// Number of documents in the group where the path is present and
    /// non-null. A preserve-empty unwind leaves null placeholders; this
    /// is how a zero-video owner aggregates to zero instead of one.
    CountNonNull(String),
    /// Numeric sum over the path; missing or null contributes 0.
    Sum(String),
    /// The path's value in the group's first document.
    First(String),
}

/// A fixed sequence of stages over a source collection.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: String,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            stages: Vec::new(),
        }
    }

    pub fn match_eq(mut self, field: impl Into<String>, value: Json) -> Self {
        self.stages.push(Stage::Match {
            field: field.into(),
            value,
        });
        self
    }

    pub fn lookup(mut self, lookup: Lookup) -> Self {
        self.stages.push(Stage::Lookup(lookup));
        self
    }

    pub fn unwind(mut self, path: impl Into<String>, preserve_null_and_empty: bool) -> Self {
        self.stages.push(Stage::Unwind {
            path: path.into(),
            preserve_null_and_empty,
        });
        self
    }

    pub fn first(mut self, path: impl Into<String>) -> Self {
        self.stages.push(Stage::First { path: path.into() });
        self
    }

    pub fn project(mut self, fields: &[&str]) -> Self {
        self.stages.push(Stage::Project {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    pub fn add_count(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.stages.push(Stage::AddCount {
            path: path.into(),
            target: target.into(),
        });
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.stages.push(Stage::Group(group));
        self
    }

    pub fn sort(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.stages.push(Stage::Sort {
            field: field.into(),
            descending,
        });
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.stages.push(Stage::Skip(n));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.stages.push(Stage::Limit(n));
        self
    }

    /// Run without a deadline.
    pub fn run(&self, store: &dyn EntityStore) -> Result<Vec<Document>, StoreError> {
        self.run_with_deadline(store, None)
    }

    /// Run the pipeline. Exceeding the deadline surfaces
    /// [`StoreError::Timeout`], never a partial result.
    pub fn run_with_deadline(
        &self,
        store: &dyn EntityStore,
        deadline: Option<Instant>,
    ) -> Result<Vec<Document>, StoreError> {
        check_deadline(deadline)?;

        // Push leading indexed Match stages down into the store read.
        let mut filters: Vec<(&str, Value)> = Vec::new();
        let mut rest = self.stages.as_slice();
        while let [Stage::Match { field, value }, tail @ ..] = rest {
            if !store.is_indexed(&self.source, field) {
                break;
            }
            filters.push((field.as_str(), Value::from_json(value)));
            rest = tail;
        }

        let docs = store.find(&self.source, &filters)?;
        apply_stages(docs, rest, store, deadline, 0)
    }
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), StoreError> {
    if let Some(deadline) = deadline {
        if Instant::now() >= deadline {
            return Err(StoreError::Timeout("aggregation deadline exceeded".into()));
        }
    }
    Ok(())
}

fn apply_stages(
    mut docs: Vec<Document>,
    stages: &[Stage],
    store: &dyn EntityStore,
    deadline: Option<Instant>,
    depth: usize,
) -> Result<Vec<Document>, StoreError> {
    for stage in stages {
        check_deadline(deadline)?;
        docs = match stage {
            Stage::Match { field, value } => docs
                .into_iter()
                .filter(|doc| get_path(doc, field) == Some(value))
                .collect(),
            Stage::Lookup(lookup) => apply_lookup(docs, lookup, store, deadline, depth)?,
            Stage::Unwind {
                path,
                preserve_null_and_empty,
            } => apply_unwind(docs, path, *preserve_null_and_empty),
            Stage::First { path } => {
                for doc in &mut docs {
                    let first = get_path(doc, path)
                        .and_then(|v| v.as_array())
                        .and_then(|a| a.first())
                        .cloned()
                        .unwrap_or(Json::Null);
                    set_path(doc, path, first);
                }
                docs
            }
            Stage::Project { fields } => {
                for doc in &mut docs {
                    if let Some(obj) = doc.as_object_mut() {
                        obj.retain(|key, _| fields.iter().any(|f| f == key));
                    }
                }
                docs
            }
            Stage::AddCount { path, target } => {
                for doc in &mut docs {
                    let count = get_path(doc, path)
                        .and_then(|v| v.as_array())
                        .map(|a| a.len())
                        .unwrap_or(0);
                    set_path(doc, target, Json::from(count));
                }
                docs
            }
            Stage::Group(group) => apply_group(docs, group),
            Stage::Sort { field, descending } => {
                // Stable sort: equal keys keep insertion order, so a
                // quiescent pagination sweep is deterministic.
                docs.sort_by(|a, b| {
                    let ord = compare_values(get_path(a, field), get_path(b, field));
                    if *descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                });
                docs
            }
            Stage::Skip(n) => docs.into_iter().skip(*n).collect(),
            Stage::Limit(n) => docs.into_iter().take(*n).collect(),
        };
    }
    Ok(docs)
}

fn apply_lookup(
    mut docs: Vec<Document>,
    lookup: &Lookup,
    store: &dyn EntityStore,
    deadline: Option<Instant>,
    depth: usize,
) -> Result<Vec<Document>, StoreError> {
    if depth >= MAX_LOOKUP_DEPTH {
        return Err(StoreError::Storage(format!(
            "lookup nesting exceeds depth {}",
            MAX_LOOKUP_DEPTH
        )));
    }

    for doc in &mut docs {
        check_deadline(deadline)?;
        let local = get_path(doc, &lookup.local_field).cloned().unwrap_or(Json::Null);
        if local.is_null() {
            // Left-outer: a missing local key attaches nothing. When the
            // parent path itself is null (preserved empty unwind), the
            // set below is a no-op as well.
            set_path(doc, &lookup.as_field, Json::Array(Vec::new()));
            continue;
        }
        let matched = store.find(
            &lookup.from,
            &[(lookup.foreign_field.as_str(), Value::from_json(&local))],
        )?;
        let matched = apply_stages(matched, &lookup.pipeline, store, deadline, depth + 1)?;
        set_path(doc, &lookup.as_field, Json::Array(matched));
    }
    Ok(docs)
}

fn apply_unwind(docs: Vec<Document>, path: &str, preserve: bool) -> Vec<Document> {
    let mut out = Vec::new();
    for mut doc in docs {
        let elements = get_path(&doc, path)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        if elements.is_empty() {
            if preserve {
                set_path(&mut doc, path, Json::Null);
                out.push(doc);
            }
            continue;
        }
        for element in elements {
            let mut clone = doc.clone();
            set_path(&mut clone, path, element);
            out.push(clone);
        }
    }
    out
}

fn apply_group(docs: Vec<Document>, group: &Group) -> Vec<Document> {
    // First-seen key order keeps the output deterministic.
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Document>> = HashMap::new();

    for doc in docs {
        let key_value = get_path(&doc, &group.by).cloned().unwrap_or(Json::Null);
        let key = key_value.to_string();
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(doc);
    }

    order
        .into_iter()
        .map(|key| {
            let members = &buckets[&key];
            let key_value = get_path(&members[0], &group.by).cloned().unwrap_or(Json::Null);
            let mut out = serde_json::Map::new();
            out.insert("id".to_string(), key_value);
            for (name, acc) in &group.fields {
                out.insert(name.clone(), accumulate(members, acc));
            }
            Json::Object(out)
        })
        .collect()
}

fn accumulate(members: &[Document], acc: &Accumulator) -> Json {
    match acc {
        Accumulator::CountNonNull(path) => {
            let count = members
                .iter()
                .filter(|doc| get_path(doc, path).is_some_and(|v| !v.is_null()))
                .count();
            Json::from(count)
        }
        Accumulator::Sum(path) => {
            let sum: f64 = members
                .iter()
                .filter_map(|doc| get_path(doc, path))
                .filter_map(|v| v.as_f64())
                .sum();
            if sum.fract() == 0.0 {
                Json::from(sum as i64)
            } else {
                Json::from(sum)
            }
        }
        Accumulator::First(path) => members
            .first()
            .and_then(|doc| get_path(doc, path))
            .cloned()
            .unwrap_or(Json::Null),
    }
}

fn compare_values(a: Option<&Json>, b: Option<&Json>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Json::Number(x)), Some(Json::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Json::String(x)), Some(Json::String(y))) => x.cmp(y),
        (Some(Json::Bool(x)), Some(Json::Bool(y))) => x.cmp(y),
        (None | Some(Json::Null), None | Some(Json::Null)) => Ordering::Equal,
        (None | Some(Json::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Json::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;
    use crate::traits::CollectionSpec;
    use serde_json::json;
    use std::time::Duration;

    const SPECS: &[CollectionSpec] = &[
        CollectionSpec {
            name: "users",
            indexed: &["username"],
            unique: &[&["username"]],
        },
        CollectionSpec {
            name: "videos",
            indexed: &["owner", "isPublished"],
            unique: &[],
        },
        CollectionSpec {
            name: "likes",
            indexed: &["likedBy", "targetId", "targetKind"],
            unique: &[&["likedBy", "targetId", "targetKind"]],
        },
    ];

    fn seeded() -> SqliteStore {
        let s = SqliteStore::open_in_memory(SPECS).unwrap();
        s.insert(
            "users",
            &json!({"id": "u1", "username": "alice", "passwordHash": "secret"}),
        )
        .unwrap();
        s.insert(
            "users",
            &json!({"id": "u2", "username": "bob", "passwordHash": "secret"}),
        )
        .unwrap();
        s.insert(
            "videos",
            &json!({"id": "v1", "owner": "u1", "isPublished": true, "views": 10,
                    "createdAt": "2026-01-01T00:00:00+00:00"}),
        )
        .unwrap();
        s.insert(
            "videos",
            &json!({"id": "v2", "owner": "u1", "isPublished": false, "views": 5,
                    "createdAt": "2026-02-01T00:00:00+00:00"}),
        )
        .unwrap();
        s.insert(
            "likes",
            &json!({"id": "l1", "likedBy": "u2", "targetId": "v1", "targetKind": "VIDEO"}),
        )
        .unwrap();
        s
    }

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

    #[test]
    fn match_lookup_first_projects_and_redacts() {
        let s = seeded();
        let docs = Pipeline::new("videos")
            .match_eq("isPublished", json!(true))
            .lookup(user_lookup("owner", "owner", &["username"]))
            .first("owner")
            .run(&s)
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["owner"], json!({"username": "alice"}));
        assert!(docs[0]["owner"].get("passwordHash").is_none());
    }

    #[test]
    fn lookup_with_no_match_attaches_empty_array() {
        let s = seeded();
        s.insert(
            "videos",
            &json!({"id": "v3", "owner": "ghost", "isPublished": true}),
        )
        .unwrap();
        let docs = Pipeline::new("videos")
            .match_eq("owner", json!("ghost"))
            .lookup(user_lookup("owner", "owner", &["username"]))
            .run(&s)
            .unwrap();
        assert_eq!(docs[0]["owner"], json!([]));
    }

    #[test]
    fn unwind_preserves_empty_when_asked() {
        let docs = vec![json!({"id": "a", "xs": [1, 2]}), json!({"id": "b", "xs": []})];
        let kept = apply_unwind(docs.clone(), "xs", true);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[2], json!({"id": "b", "xs": null}));

        let dropped = apply_unwind(docs, "xs", false);
        assert_eq!(dropped.len(), 2);
    }

    #[test]
    fn group_counts_non_null_and_sums() {
        let docs = vec![
            json!({"owner": "u1", "videos": {"views": 10, "likesCount": 2}}),
            json!({"owner": "u1", "videos": {"views": 5, "likesCount": 0}}),
            json!({"owner": "u2", "videos": null}),
        ];
        let out = apply_group(
            docs,
            &Group {
                by: "owner".into(),
                fields: vec![
                    ("totalVideos".into(), Accumulator::CountNonNull("videos".into())),
                    ("totalViews".into(), Accumulator::Sum("videos.views".into())),
                    ("totalLikes".into(), Accumulator::Sum("videos.likesCount".into())),
                ],
            },
        );
        assert_eq!(
            out[0],
            json!({"id": "u1", "totalVideos": 2, "totalViews": 15, "totalLikes": 2})
        );
        assert_eq!(
            out[1],
            json!({"id": "u2", "totalVideos": 0, "totalViews": 0, "totalLikes": 0})
        );
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let s = SqliteStore::open_in_memory(SPECS).unwrap();
        for (id, created) in [("v1", "t1"), ("v2", "t1"), ("v3", "t0")] {
            s.insert(
                "videos",
                &json!({"id": id, "owner": "u1", "isPublished": true, "createdAt": created}),
            )
            .unwrap();
        }
        let docs = Pipeline::new("videos")
            .sort("createdAt", true)
            .run(&s)
            .unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        // v1/v2 tie on createdAt and keep insertion order.
        assert_eq!(ids, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn skip_limit_sweep_covers_everything_once() {
        let s = SqliteStore::open_in_memory(SPECS).unwrap();
        for i in 0..7 {
            s.insert(
                "videos",
                &json!({"id": format!("v{}", i), "owner": "u1", "isPublished": true}),
            )
            .unwrap();
        }
        let mut seen = Vec::new();
        for page in 1.. {
            let docs = Pipeline::new("videos")
                .skip((page - 1) * 3)
                .limit(3)
                .run(&s)
                .unwrap();
            if docs.is_empty() {
                break;
            }
            seen.extend(docs.iter().map(|d| d["id"].as_str().unwrap().to_string()));
        }
        assert_eq!(seen.len(), 7);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn expired_deadline_is_a_timeout_not_a_partial_result() {
        let s = seeded();
        let deadline = Instant::now() - Duration::from_millis(1);
        let err = Pipeline::new("videos")
            .run_with_deadline(&s, Some(deadline))
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout(_)));
    }

    #[test]
    fn nested_lookup_is_bounded_at_depth_two() {
        let s = seeded();
        let too_deep = Lookup {
            from: "users".into(),
            local_field: "owner".into(),
            foreign_field: "id".into(),
            as_field: "owner".into(),
            pipeline: vec![Stage::Lookup(Lookup {
                from: "users".into(),
                local_field: "id".into(),
                foreign_field: "id".into(),
                as_field: "again".into(),
                pipeline: vec![Stage::Lookup(user_lookup("id", "more", &["username"]))],
            })],
        };
        let err = Pipeline::new("videos").lookup(too_deep).run(&s).unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }
}
