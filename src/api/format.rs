//! Storage rows use snake_case column names; clients see camelCase keys.

use serde_json::{Map, Value};

/// `short_description` → `shortDescription`
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `shortDescription` → `short_description`; snake_case input is unchanged
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively rename object keys to camelCase. Values are left alone.
pub fn to_wire(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, v) in map {
                out.insert(to_camel_case(&key), to_wire(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(to_wire).collect()),
        other => other,
    }
}

/// Camel-case each dotted segment of a field path (`translations.0.meta_title`)
pub fn wire_path(path: &str) -> String {
    path.split('.').map(to_camel_case).collect::<Vec<_>>().join(".")
}
