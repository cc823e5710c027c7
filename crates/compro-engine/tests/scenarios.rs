//! End-to-end scenarios against the in-memory store and a scripted
//! fetcher, exercising the full compile+instantiate pipeline from a
//! YAML document the way the CLI would receive one.

use compro_engine::compile;
use compro_store::{InMemoryStore, ScriptedFetcher};
use compro_types::ComprehensionSpec;
use serde_json::json;
use std::collections::BTreeMap;

fn from_yaml(doc: &str) -> ComprehensionSpec {
    serde_yaml::from_str(doc).expect("valid comprehension spec")
}

#[test]
fn request_generator_chains_into_a_nested_list_generator() {
    let doc = r#"
for:
- var: repo
  in:
    list: ["flux-whatif", "flux2"]
- var: pulls
  in:
    request:
      url: http://pulls.test/${repo}-pulls.json
- var: pr
  in:
    list: ${pulls}
yield:
  template: ${pr.url}
"#;
    let spec = from_yaml(doc);
    let compiled = compile(&spec).unwrap();

    let store = InMemoryStore::new();
    let fetcher = ScriptedFetcher::ok(vec![
        json!([{"url": "https://api.example.test/pulls/1"}, {"url": "https://api.example.test/pulls/2"}]),
    ]);

    let results = compiled.eval(&store, &fetcher).unwrap();
    // Each of the two `repo` values issues its own request, each
    // returning the same scripted two-item page.
    assert_eq!(results.len(), 4);
    assert_eq!(fetcher.call_count(), 2);
}

#[test]
fn query_generator_by_name_joins_object_fields_into_the_yield() {
    let mut store = InMemoryStore::new();
    store.insert(
        "v1",
        "ConfigMap",
        "settings",
        BTreeMap::new(),
        json!({"data": {"region": "eu-west-1"}}),
    );
    let fetcher = ScriptedFetcher::ok(vec![]);

    let doc = r#"
for:
- var: cfg
  in:
    query:
      apiVersion: v1
      kind: ConfigMap
      name: settings
yield:
  template:
    region: ${cfg.data.region}
"#;
    let spec = from_yaml(doc);
    let results = compile(&spec).unwrap().eval(&store, &fetcher).unwrap();
    assert_eq!(results, vec![json!({"region": "eu-west-1"})]);
}

#[test]
fn query_generator_by_label_selector_yields_one_tuple_per_match() {
    let mut store = InMemoryStore::new();
    let mut web_labels = BTreeMap::new();
    web_labels.insert("app".to_string(), "web".to_string());
    store.insert("v1", "Pod", "web-1", web_labels.clone(), json!({"metadata": {"name": "web-1"}}));
    store.insert("v1", "Pod", "web-2", web_labels, json!({"metadata": {"name": "web-2"}}));
    store.insert("v1", "Pod", "db-1", BTreeMap::new(), json!({"metadata": {"name": "db-1"}}));
    let fetcher = ScriptedFetcher::ok(vec![]);

    let doc = r#"
for:
- var: pod
  in:
    query:
      apiVersion: v1
      kind: Pod
      matchLabels:
        app: web
yield:
  template: ${pod.metadata.name}
"#;
    let spec = from_yaml(doc);
    let mut results: Vec<_> = compile(&spec)
        .unwrap()
        .eval(&store, &fetcher)
        .unwrap()
        .into_iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    results.sort();
    assert_eq!(results, vec!["web-1", "web-2"]);
}

#[test]
fn object_valued_whole_leaf_preserves_its_type() {
    let doc = r#"
for:
- var: v
  in:
    list:
    - foo: bar
yield:
  template: ${v}
"#;
    let spec = from_yaml(doc);
    let store = InMemoryStore::new();
    let fetcher = ScriptedFetcher::ok(vec![]);
    let results = compile(&spec).unwrap().eval(&store, &fetcher).unwrap();
    assert_eq!(results, vec![json!({"foo": "bar"})]);
}

#[test]
fn malformed_query_is_rejected_at_eval_time() {
    let doc = r#"
for:
- var: v
  in:
    query:
      apiVersion: v1
      kind: Pod
yield:
  template: "x"
"#;
    let spec = from_yaml(doc);
    let compiled = compile(&spec).unwrap();

    let store = InMemoryStore::new();
    let fetcher = ScriptedFetcher::ok(vec![]);
    assert!(compiled.eval(&store, &fetcher).is_err());
}

#[test]
fn successive_eval_calls_do_not_share_mutable_state() {
    let doc = r#"
for:
- var: v
  in:
    list:
    - items: [1]
yield:
  template:
    items: ${v.items}
"#;
    let spec = from_yaml(doc);
    let compiled = compile(&spec).unwrap();
    let store = InMemoryStore::new();
    let fetcher = ScriptedFetcher::ok(vec![]);

    let mut first = compiled.eval(&store, &fetcher).unwrap();
    let second = compiled.eval(&store, &fetcher).unwrap();

    if let Some(arr) = first[0]["items"].as_array_mut() {
        arr.push(json!(99));
    }

    assert_eq!(second[0]["items"], json!([1]));
}
