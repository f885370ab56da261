//! Per-item scopes for `{{#each}}` bodies.

use crate::value::{Object, Value};

/// Build the scope an `#each` body is rendered against.
///
/// The item's own properties are copied (one level deep) and `@index`,
/// `@first` and `@last` are added on top. Nothing from the enclosing scope
/// is carried over: inside the body only the item and its metadata are
/// visible.
pub fn build_item_scope(item: &Value, index: usize, length: usize) -> Value {
    let mut scope = match item.unwrapped().as_ref() {
        Value::Object(map) => map.clone(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        _ => Object::new(),
    };
    scope.insert("@index".to_string(), Value::from(index));
    scope.insert("@first".to_string(), Value::Bool(index == 0));
    scope.insert("@last".to_string(), Value::Bool(index + 1 == length));
    Value::Object(scope)
}
