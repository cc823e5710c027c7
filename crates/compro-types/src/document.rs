//! The outer `Comprehension` document envelope (`apiVersion`/`kind`/`spec`),
//! as read from a YAML or JSON file by the CLI driver.

use crate::spec::ComprehensionSpec;
use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "generate.squaremo.dev/v1alpha1";
pub const KIND: &str = "Comprehension";

/// A parsed `Comprehension` document. `api_version`/`kind` are carried
/// through but not validated here — the reconciler (out of scope) is
/// responsible for admission/schema concerns; the evaluator only needs
/// `spec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensionDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub spec: ComprehensionSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document_from_yaml() {
        let doc = r#"
apiVersion: generate.squaremo.dev/v1alpha1
kind: Comprehension
spec:
  yield:
    template: "value=${v}"
  for:
    - var: v
      in:
        list: [foo, bar, baz]
"#;
        let parsed: ComprehensionDocument = serde_yaml::from_str(doc).unwrap();
        assert_eq!(parsed.api_version, API_VERSION);
        assert_eq!(parsed.kind, KIND);
        assert_eq!(parsed.spec.for_clauses.len(), 1);
    }
}
