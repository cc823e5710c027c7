//! Conversion between `serde_json::Value`, the shape every other part of
//! the evaluator speaks, and `cel_interpreter::Value`, the shape the
//! expression runtime speaks.

use cel_interpreter::objects::{Key, Map as CelMap};
use cel_interpreter::Value as CelValue;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use std::sync::Arc;

/// Lossless for the JSON data model: objects become CEL maps with
/// string keys, arrays become CEL lists, numbers become CEL `Int` when
/// they round-trip exactly or `Float` otherwise.
pub fn json_to_cel(value: &JsonValue) -> CelValue {
    match value {
        JsonValue::Null => CelValue::Null,
        JsonValue::Bool(b) => CelValue::Bool(*b),
        JsonValue::Number(n) => number_to_cel(n),
        JsonValue::String(s) => CelValue::String(Arc::new(s.clone())),
        JsonValue::Array(items) => CelValue::List(Arc::new(items.iter().map(json_to_cel).collect())),
        JsonValue::Object(fields) => CelValue::Map(CelMap {
            map: Arc::new(
                fields
                    .iter()
                    .map(|(k, v)| (Key::String(Arc::new(k.clone())), json_to_cel(v)))
                    .collect(),
            ),
        }),
    }
}

fn number_to_cel(n: &Number) -> CelValue {
    if let Some(i) = n.as_i64() {
        CelValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        CelValue::UInt(u)
    } else {
        CelValue::Float(n.as_f64().unwrap_or(0.0))
    }
}

/// The inverse conversion, used both to turn an evaluated expression's
/// result back into a template site and to render it as a string for
/// interpolation (`render_for_interpolation`/`require_exact_string` in
/// `compro-util` handle the scalar-to-string half once this has produced
/// a `serde_json::Value`).
pub fn cel_to_json(value: CelValue) -> Result<JsonValue, String> {
    match value {
        CelValue::Null => Ok(JsonValue::Null),
        CelValue::Bool(b) => Ok(JsonValue::Bool(b)),
        CelValue::Int(i) => Ok(JsonValue::Number(i.into())),
        CelValue::UInt(u) => Ok(JsonValue::Number(u.into())),
        CelValue::Float(f) => Number::from_f64(f).map(JsonValue::Number).ok_or_else(|| format!("expression result {f} is not a finite number")),
        CelValue::String(s) => Ok(JsonValue::String((*s).clone())),
        CelValue::Bytes(b) => Ok(JsonValue::String(String::from_utf8_lossy(&b).into_owned())),
        CelValue::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(cel_to_json(item.clone())?);
            }
            Ok(JsonValue::Array(out))
        }
        CelValue::Map(map) => {
            let mut out = JsonMap::new();
            for (k, v) in map.map.iter() {
                out.insert(key_to_string(k), cel_to_json(v.clone())?);
            }
            Ok(JsonValue::Object(out))
        }
        other => Err(format!("expression result {other:?} has no JSON representation")),
    }
}

fn key_to_string(key: &Key) -> String {
    match key {
        Key::Int(i) => i.to_string(),
        Key::Uint(u) => u.to_string(),
        Key::Bool(b) => b.to_string(),
        Key::String(s) => (**s).clone(),
    }
}
