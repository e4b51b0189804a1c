//! Shape-preserving replacement of a matched field's value.
//!
//! Containers keep their size (arrays) or key set (objects) so the output still
//! shows the outline of what was there. No original content survives.

use serde_json::{Map, Value};

use crate::config::MaskToken;

/// Builds the replacement for a redacted value.
///
/// - `null` stays `null`.
/// - An array becomes an array of the same length filled with the token.
/// - An object keeps its keys; every value becomes the token.
/// - Strings, numbers and booleans become the token as a string.
///
/// The discarded content is torn down with [`discard`], so a matched subtree
/// of any depth is released without recursion.
pub fn mask_value(original: Value, token: &MaskToken) -> Value {
    let masked = || Value::String(token.as_str().to_owned());
    match original {
        Value::Null => Value::Null,
        Value::Array(items) => {
            let replacement = Value::Array(items.iter().map(|_| masked()).collect());
            discard(Value::Array(items));
            replacement
        }
        Value::Object(fields) => {
            let mut replaced = Map::with_capacity(fields.len());
            let mut children = Vec::with_capacity(fields.len());
            for (name, value) in fields {
                replaced.insert(name, masked());
                children.push(value);
            }
            discard(Value::Array(children));
            Value::Object(replaced)
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => masked(),
    }
}

/// Drops `root` one node at a time.
///
/// `Value`'s own `Drop` recurses once per nesting level, which overflows the
/// stack on trees nested a few tens of thousands of levels deep.
pub(crate) fn discard(root: Value) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        match node {
            Value::Array(items) => pending.extend(items),
            Value::Object(fields) => pending.extend(fields.into_iter().map(|(_, value)| value)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }
}
