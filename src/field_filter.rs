//! Response pruning by a caller-supplied field mask.
//!
//! Opt-out semantics: a key is kept unless its mask entry is present and
//! falsy. Kept object values are pruned with the same mask, so a flat mask
//! such as `{"emails": false}` applies at every depth. A non-empty object
//! entry swaps in that nested mask for its value. Arrays and scalars pass
//! through untouched.

use serde_json::{Map, Value};

/// Prunes `tree` according to `mask`. A non-object mask keeps everything.
pub fn filter_fields(tree: Value, mask: &Value) -> Value {
    let Some(mask) = mask.as_object() else {
        return tree;
    };
    match tree {
        Value::Object(map) => Value::Object(filter_object(map, mask)),
        other => other,
    }
}

fn filter_object(map: Map<String, Value>, mask: &Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| {
            let entry = mask.get(&key);
            if entry.is_some_and(|entry| !is_truthy(entry)) {
                return None;
            }
            let value = match (entry, value) {
                (Some(Value::Object(nested)), Value::Object(inner)) => {
                    Value::Object(filter_object(inner, nested))
                }
                (_, Value::Object(inner)) => Value::Object(filter_object(inner, mask)),
                (_, other) => other,
            };
            Some((key, value))
        })
        .collect()
}

/// JSON truthiness: `false`, `null`, zero, `""`, `[]` and `{}` are falsy.
fn is_truthy(entry: &Value) -> bool {
    match entry {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
