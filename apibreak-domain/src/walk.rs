//! Structural walks over JSON values.

use serde_json::{Map, Value};

/// Rename object keys at every depth, including inside array elements.
///
/// `rename` returns the replacement for a key, or `None` to keep it. When a renamed key
/// collides with a key already present under the new name, the renamed value wins.
pub fn rename_keys<F>(value: Value, rename: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::Object(map) => {
            let mut kept = Map::new();
            let mut renamed = Vec::new();
            for (k, v) in map {
                let v = rename_keys(v, rename);
                match rename(&k) {
                    Some(new_key) => renamed.push((new_key, v)),
                    None => {
                        kept.insert(k, v);
                    }
                }
            }
            for (k, v) in renamed {
                kept.insert(k, v);
            }
            Value::Object(kept)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rename_keys(v, rename)).collect())
        }
        scalar => scalar,
    }
}

/// First of `candidates` present as a key of `value`, which must be an object.
///
/// Only the top level is inspected.
pub fn has_top_level_key<'a, I>(value: &Value, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let Value::Object(map) = value else {
        return None;
    };
    candidates.into_iter().find(|k| map.contains_key(*k))
}
