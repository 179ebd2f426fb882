//! Dotted-path access into JSON documents (`videos.likesCount`).

/// Look up a dotted path. Returns None when any segment is missing or a
/// non-object is traversed.
pub fn get_path<'a>(doc: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a dotted path. Intermediate segments must already be objects;
/// if one is missing or null the write is a no-op (a join against a
/// null parent attaches nothing).
pub fn set_path(doc: &mut serde_json::Value, path: &str, value: serde_json::Value) {
    let mut segments = path.split('.').peekable();
    let mut current = doc;
    while let Some(segment) = segments.next() {
        let Some(obj) = current.as_object_mut() else {
            return;
        };
        if segments.peek().is_none() {
            obj.insert(segment.to_string(), value);
            return;
        }
        match obj.get_mut(segment) {
            Some(next) => current = next,
            None => return,
        }
    }
}
