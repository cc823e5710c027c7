//! Coercing a JSON value into the string form different interpolation
//! contexts need.
//!
//! spec.md §4.C: a yield-template leaf with literal text mixed around one
//! or more `${...}` sites always produces a string, and every evaluated
//! value — including objects and arrays — renders into it via a
//! last-resort debug rendering; it never fails
//! ([`render_for_interpolation`]).
//!
//! spec.md §4.D: a generator's string-valued fields (`query.name`,
//! `query.matchLabels` entries, `request.url`, header lines) require a
//! whole-value `${expr}` substitution to already BE a string — a number,
//! bool, or null binding is rejected rather than silently stringified
//! ([`require_exact_string`]).

use serde_json::Value;

/// Render any JSON value the way it appears spliced into a mixed-content
/// string leaf. Scalars render directly; arrays and objects fall back to
/// their compact JSON form (the canonical debug rendering `serde_json::to_string`
/// produces).
pub fn render_for_interpolation(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Require a value to already be a JSON string. Used for generator
/// fields where a whole-value `${expr}` substitution must resolve to a
/// string outright, rather than being coerced from another scalar type.
pub fn require_exact_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
