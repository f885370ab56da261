//! Dotted property path resolution.

use std::borrow::Cow;
use tracing::trace;

use crate::value::Value;

/// Resolve `path` (e.g. `user.address.city`) against `context`.
///
/// Returns `None` for an empty path, a non-container context, or when any
/// segment is missing or lands on something without properties. Cells are
/// dereferenced on the root, at every step, and on the final value, so the
/// result never has a cell at its top level.
pub fn resolve(context: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = context.unwrapped();
    if !current.is_container() {
        return None;
    }

    for segment in path.split('.') {
        let next = match &current {
            Cow::Borrowed(node) => property(*node, segment)?,
            Cow::Owned(node) => Cow::Owned(property(node, segment)?.into_owned()),
        };
        current = unwrap_cow(next);
    }

    trace!(path, "resolved");
    Some(current.into_owned())
}

/// Like [`resolve`], but only succeeds when the value is an array.
pub fn resolve_array(context: &Value, path: &str) -> Option<Vec<Value>> {
    match resolve(context, path)? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

// Plain property access: object keys, plus array indices and `length`.
fn property<'a>(node: &'a Value, key: &str) -> Option<Cow<'a, Value>> {
    match node {
        Value::Object(map) => map.get(key).map(Cow::Borrowed),
        Value::Array(items) if key == "length" => Some(Cow::Owned(Value::from(items.len()))),
        Value::Array(items) => array_index(key)
            .and_then(|i| items.get(i))
            .map(Cow::Borrowed),
        _ => None,
    }
}

// Canonical decimal indices only: "01" or "+1" are ordinary (missing) keys.
fn array_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok()?;
    (index.to_string() == key).then_some(index)
}

fn unwrap_cow(value: Cow<'_, Value>) -> Cow<'_, Value> {
    match value {
        Cow::Borrowed(v) => v.unwrapped(),
        Cow::Owned(v) => Cow::Owned(v.into_unwrapped()),
    }
}
