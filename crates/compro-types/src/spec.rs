//! The `Comprehension` document's `spec` field: generators, predicates and
//! the yield template.
//!
//! These types are deliberately permissive about the shape of embedded JSON
//! (`serde_json::Value`) — the comprehension evaluator, not this crate, is
//! responsible for deciding whether a given value is well-formed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `spec.for` plus `spec.yield` — the whole evaluator input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensionSpec {
    #[serde(rename = "for", default)]
    pub for_clauses: Vec<ForClause>,
    #[serde(rename = "yield")]
    pub yield_expr: YieldExpr,
}

/// A single `for` entry: `var in generator [when predicate]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForClause {
    pub var: String,
    #[serde(rename = "in")]
    pub generator: Generator,
    #[serde(default)]
    pub when: Option<String>,
}

/// The yield template: an arbitrary JSON-shaped value containing
/// interpolation sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldExpr {
    pub template: Value,
}

/// A generator is a tagged union with exactly one variant set; it is
/// represented untagged over the three recognised keys (`list`, `query`,
/// `request`) so the wire format stays `{ list: ... }` / `{ query: {...} }`
/// / `{ request: {...} }` rather than an internally-tagged enum.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Generator {
    #[serde(default)]
    pub list: Option<Value>,
    #[serde(default)]
    pub query: Option<ObjectQuery>,
    #[serde(default)]
    pub request: Option<HttpRequest>,
}

/// `query` generator: fetch one object by name, or a list by label
/// selector, from the object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectQuery {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub match_labels: Option<BTreeMap<String, String>>,
}

/// `request` generator: fetch a stream of JSON documents over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    #[serde(default)]
    pub headers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_generator_from_yaml() {
        let doc = "var: v\nin:\n  list: [foo, bar]\n";
        let clause: ForClause = serde_yaml::from_str(doc).unwrap();
        assert_eq!(clause.var, "v");
        assert_eq!(clause.generator.list, Some(serde_json::json!(["foo", "bar"])));
        assert!(clause.generator.query.is_none());
    }

    #[test]
    fn parses_query_generator_with_match_labels() {
        let doc = r#"
var: pods
in:
  query:
    apiVersion: v1
    kind: Pod
    matchLabels:
      app: web
"#;
        let clause: ForClause = serde_yaml::from_str(doc).unwrap();
        let query = clause.generator.query.expect("query generator");
        assert_eq!(query.api_version, "v1");
        assert_eq!(query.name, None);
        assert_eq!(query.match_labels.unwrap().get("app"), Some(&"web".to_string()));
    }

    #[test]
    fn round_trips_through_json() {
        let spec = ComprehensionSpec {
            for_clauses: vec![ForClause {
                var: "x".into(),
                generator: Generator {
                    list: Some(serde_json::json!([1, 2, 3])),
                    query: None,
                    request: None,
                },
                when: Some("x > 1".into()),
            }],
            yield_expr: YieldExpr {
                template: serde_json::json!("${x}"),
            },
        };
        let text = serde_json::to_string(&spec).unwrap();
        let back: ComprehensionSpec = serde_json::from_str(&text).unwrap();
        assert_eq!(back.for_clauses.len(), 1);
        assert_eq!(back.for_clauses[0].when.as_deref(), Some("x > 1"));
    }
}
