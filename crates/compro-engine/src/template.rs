//! Component C: walk a JSON-shaped template, producing a "blank" skeleton
//! plus an ordered list of sites that patch a *clone* of the skeleton at
//! evaluate-time.
//!
//! The reference evaluator mutates a single shared blank in place and
//! deep-copies it on the way out; here each `evaluate` call clones the
//! skeleton first and mutates the clone by path, which gives the same
//! isolation guarantee (the skeleton itself is never mutated, and every
//! call gets an independent value) without needing interior mutability
//! to let site closures reach into a tree while it's also being walked.

use crate::binding::Scope;
use crate::error::{CompileError, EvalError};
use crate::expr::{self, CompiledExpr};
use crate::interpolation::{self, Token};
use compro_util::{render_for_interpolation, require_exact_string};
use serde_json::Value;
use std::collections::HashMap;

/// One piece of a compiled string leaf.
#[derive(Debug, Clone)]
pub enum JoinPart {
    Text(String),
    Expr(CompiledExpr),
}

/// A compiled string leaf: either the leaf is a single bare `${expr}`,
/// whose result is spliced in as-is (any JSON type), or it has literal
/// text woven in, in which case every expression result must coerce to
/// a string.
#[derive(Debug, Clone)]
pub enum LeafSite {
    Whole(CompiledExpr),
    Join(Vec<JoinPart>),
}

impl LeafSite {
    /// Compile a string leaf against `scope`. Returns `None` when the
    /// leaf has no interpolation at all (pure literal text, nothing to
    /// evaluate).
    pub fn compile(site: &str, s: &str, scope: &Scope) -> Result<Option<Self>, CompileError> {
        let tokens = interpolation::tokenize(site, s)?;
        if let Some(expr_src) = interpolation::is_sole_expression(&tokens) {
            return Ok(Some(LeafSite::Whole(expr::compile(expr_src, scope)?)));
        }
        if tokens.iter().all(|t| matches!(t, Token::Text(_))) {
            return Ok(None);
        }
        let parts = tokens
            .into_iter()
            .map(|t| match t {
                Token::Text(s) => Ok(JoinPart::Text(s)),
                Token::Expr(e) => Ok(JoinPart::Expr(expr::compile(&e, scope)?)),
            })
            .collect::<Result<Vec<_>, CompileError>>()?;
        Ok(Some(LeafSite::Join(parts)))
    }

    /// Evaluate the leaf, producing whatever JSON value it resolves to.
    /// A `Join` leaf always produces a string: every sub-expression's
    /// result, including a compound array/object, renders into it via a
    /// last-resort debug rendering (spec.md §4.C). A `Whole` leaf
    /// produces the expression's native result untouched.
    pub fn eval(&self, activation: &HashMap<String, Value>) -> Result<Value, EvalError> {
        match self {
            LeafSite::Whole(expr) => expr.eval(activation),
            LeafSite::Join(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        JoinPart::Text(s) => out.push_str(s),
                        JoinPart::Expr(expr) => {
                            let value = expr.eval(activation)?;
                            out.push_str(&render_for_interpolation(&value));
                        }
                    }
                }
                Ok(Value::String(out))
            }
        }
    }

    /// Evaluate and force the result to a string, for generator fields
    /// (query `apiVersion`/`kind`/`name`/`matchLabels` values, request
    /// `url`/headers) that are always strings. A `Join` leaf already
    /// evaluates to a string via [`Self::eval`]. A `Whole` leaf — a bare
    /// `${expr}` filling the entire field — requires the expression's
    /// result to already be a string (spec.md §4.D): a number, bool, or
    /// null binding is rejected rather than silently stringified.
    pub fn eval_to_string(&self, activation: &HashMap<String, Value>) -> Result<String, EvalError> {
        match self {
            LeafSite::Whole(expr) => {
                let value = expr.eval(activation)?;
                require_exact_string(&value).ok_or_else(|| EvalError::StringCoercionError { expr: expr.source().to_string() })
            }
            LeafSite::Join(_) => match self.eval(activation)? {
                Value::String(s) => Ok(s),
                _ => unreachable!("a Join leaf always evaluates to a string"),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone)]
struct Site {
    path: Vec<PathSegment>,
    leaf: LeafSite,
}

/// A compiled template: a skeleton value plus the sites within it that
/// need evaluating on every instantiation.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    skeleton: Value,
    sites: Vec<Site>,
}

/// Compile an arbitrary JSON-shaped template against `scope`.
pub fn compile_template(value: &Value, scope: &Scope) -> Result<CompiledTemplate, CompileError> {
    let mut sites = Vec::new();
    let mut path = Vec::new();
    walk(value, &mut path, &mut sites, scope)?;
    Ok(CompiledTemplate {
        skeleton: value.clone(),
        sites,
    })
}

fn walk(value: &Value, path: &mut Vec<PathSegment>, sites: &mut Vec<Site>, scope: &Scope) -> Result<(), CompileError> {
    match value {
        Value::String(s) => {
            let site_label = path_label(path);
            if let Some(leaf) = LeafSite::compile(&site_label, s, scope)? {
                sites.push(Site { path: path.clone(), leaf });
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(i));
                walk(item, path, sites, scope)?;
                path.pop();
            }
        }
        Value::Object(fields) => {
            for (k, v) in fields {
                path.push(PathSegment::Key(k.clone()));
                walk(v, path, sites, scope)?;
                path.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

fn path_label(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "$".to_string();
    }
    let mut out = String::from("$");
    for seg in path {
        match seg {
            PathSegment::Key(k) => {
                out.push('.');
                out.push_str(k);
            }
            PathSegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    out
}

fn navigate_mut<'a>(value: &'a mut Value, path: &[PathSegment]) -> &'a mut Value {
    let mut current = value;
    for seg in path {
        current = match seg {
            PathSegment::Key(k) => current.get_mut(k.as_str()).expect("path derived from skeleton structure"),
            PathSegment::Index(i) => current.get_mut(*i).expect("path derived from skeleton structure"),
        };
    }
    current
}

impl CompiledTemplate {
    /// Instantiate the template against an activation record. Every call
    /// gets an independent value; the skeleton is never mutated.
    pub fn evaluate(&self, activation: &HashMap<String, Value>) -> Result<Value, EvalError> {
        let mut out = self.skeleton.clone();
        for site in &self.sites {
            let new_value = site.leaf.eval(activation)?;
            *navigate_mut(&mut out, &site.path) = new_value;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activation(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn scope_with(names: &[&str]) -> Scope {
        let mut scope = Scope::new();
        for name in names {
            scope.push(name).unwrap();
        }
        scope
    }

    #[test]
    fn pure_literal_template_has_no_sites() {
        let tmpl = compile_template(&json!({"a": "b", "c": [1, 2]}), &Scope::new()).unwrap();
        let out = tmpl.evaluate(&activation(&[])).unwrap();
        assert_eq!(out, json!({"a": "b", "c": [1, 2]}));
    }

    #[test]
    fn sole_expression_splices_native_value() {
        let tmpl = compile_template(&json!("${x}"), &scope_with(&["x"])).unwrap();
        let out = tmpl.evaluate(&activation(&[("x", json!([1, 2, 3]))])).unwrap();
        assert_eq!(out, json!([1, 2, 3]));
    }

    #[test]
    fn mixed_leaf_coerces_to_string() {
        let tmpl = compile_template(&json!("value=${x}"), &scope_with(&["x"])).unwrap();
        let out = tmpl.evaluate(&activation(&[("x", json!(42))])).unwrap();
        assert_eq!(out, json!("value=42"));
    }

    #[test]
    fn nested_object_and_array_sites_are_patched_independently() {
        let tmpl = compile_template(
            &json!({
                "name": "${name}",
                "items": ["${a}", "static", "${b}"]
            }),
            &scope_with(&["name", "a", "b"]),
        )
        .unwrap();
        let out = tmpl
            .evaluate(&activation(&[("name", json!("svc")), ("a", json!(1)), ("b", json!(2))]))
            .unwrap();
        assert_eq!(out, json!({"name": "svc", "items": [1, "static", 2]}));
    }

    #[test]
    fn mixed_leaf_debug_renders_compound_value() {
        let tmpl = compile_template(&json!("value=${x}"), &scope_with(&["x"])).unwrap();
        let out = tmpl.evaluate(&activation(&[("x", json!([1, 2]))])).unwrap();
        assert_eq!(out, json!("value=[1,2]"));
    }

    #[test]
    fn compile_rejects_reference_to_an_unbound_variable() {
        let err = compile_template(&json!("${not_in_scope}"), &Scope::new()).unwrap_err();
        assert!(matches!(err, CompileError::UnboundVariable { var, .. } if var == "not_in_scope"));
    }

    #[test]
    fn each_evaluate_call_is_independent() {
        let tmpl = compile_template(&json!({"v": "${x}"}), &scope_with(&["x"])).unwrap();
        let first = tmpl.evaluate(&activation(&[("x", json!(1))])).unwrap();
        let second = tmpl.evaluate(&activation(&[("x", json!(2))])).unwrap();
        assert_eq!(first, json!({"v": 1}));
        assert_eq!(second, json!({"v": 2}));
    }
}
