//! Component D: compile each of the three generator kinds (`list`,
//! `query`, `request`) into an opaque `(collaborators, activation) ->
//! Vec<Value>` function.

use crate::binding::Scope;
use crate::error::{CompileError, EvalError};
use crate::expr::Activation;
use crate::template::{self, LeafSite};
use compro_store::{HttpFetcher, ObjectStoreClient};
use compro_types::{Generator, HttpRequest, ObjectQuery};
use serde_json::Value;
use std::collections::BTreeMap;

/// The collaborators a compiled generator may need at evaluate time.
/// Bundled together so `query` and `request` generators share one
/// signature with `list`, which needs neither.
pub struct Collaborators<'a> {
    pub store: &'a dyn ObjectStoreClient,
    pub fetcher: &'a dyn HttpFetcher,
}

/// A compiled generator. `is_memoizable` is set only for a `query` with
/// no interpolation anywhere in it — the driver uses it to call the
/// generator at most once per `Eval`, per spec.
pub struct CompiledGenerator {
    pub is_memoizable: bool,
    run: Box<dyn Fn(&Collaborators, &Activation) -> Result<Vec<Value>, EvalError>>,
}

impl CompiledGenerator {
    pub fn call(&self, collaborators: &Collaborators, activation: &Activation) -> Result<Vec<Value>, EvalError> {
        (self.run)(collaborators, activation)
    }
}

/// Compile a generator against `scope`: the binding environment as it
/// stands *before* this clause's own variable is pushed, since a
/// generator must not see its own not-yet-bound name (spec Invariant 1).
pub fn compile_generator(var: &str, generator: &Generator, scope: &Scope) -> Result<CompiledGenerator, CompileError> {
    match (&generator.list, &generator.query, &generator.request) {
        (Some(list), None, None) => compile_list(list, scope),
        (None, Some(query), None) => compile_query(var, query, scope),
        (None, None, Some(request)) => compile_request(request, scope),
        _ => Err(CompileError::UnknownGenerator { var: var.to_string() }),
    }
}

fn compile_list(value: &Value, scope: &Scope) -> Result<CompiledGenerator, CompileError> {
    let template = template::compile_template(value, scope)?;
    Ok(CompiledGenerator {
        is_memoizable: false,
        run: Box::new(move |_collaborators, activation| {
            let evaluated = template.evaluate(activation)?;
            match evaluated {
                Value::Array(items) => Ok(items),
                other => Err(EvalError::expression_eval_error(
                    "list",
                    format!("list generator must evaluate to an array, got {other}"),
                )),
            }
        }),
    })
}

fn compile_query(var: &str, query: &ObjectQuery, scope: &Scope) -> Result<CompiledGenerator, CompileError> {
    let var = var.to_string();
    let api_version = CompiledField::compile("query.apiVersion", &query.api_version, scope)?;
    let kind = CompiledField::compile("query.kind", &query.kind, scope)?;
    let name = query.name.as_ref().map(|n| CompiledField::compile("query.name", n, scope)).transpose()?;
    let match_labels = query
        .match_labels
        .as_ref()
        .map(|labels| {
            labels
                .iter()
                .map(|(k, v)| Ok((k.clone(), CompiledField::compile("query.matchLabels", v, scope)?)))
                .collect::<Result<Vec<(String, CompiledField)>, CompileError>>()
        })
        .transpose()?
        .unwrap_or_default();

    let is_memoizable = api_version.is_static() && kind.is_static() && name.as_ref().is_none_or(CompiledField::is_static) && match_labels.iter().all(|(_, f)| f.is_static());

    Ok(CompiledGenerator {
        is_memoizable,
        run: Box::new(move |collaborators, activation| {
            let api_version = api_version.resolve(activation)?;
            let kind = kind.resolve(activation)?;

            match (&name, match_labels.is_empty()) {
                (Some(name_field), true) => {
                    let name = name_field.resolve(activation)?;
                    let object = collaborators.store.get(&api_version, &kind, &name)?;
                    Ok(vec![object])
                }
                (None, false) => {
                    let mut labels = BTreeMap::new();
                    for (k, field) in &match_labels {
                        labels.insert(k.clone(), field.resolve(activation)?);
                    }
                    Ok(collaborators.store.list(&api_version, &kind, &labels)?)
                }
                _ => Err(EvalError::MalformedQuery { var: var.clone() }),
            }
        }),
    })
}

fn compile_request(request: &HttpRequest, scope: &Scope) -> Result<CompiledGenerator, CompileError> {
    let url = CompiledField::compile("request.url", &request.url, scope)?;
    let headers = request
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| CompiledField::compile(&format!("request.headers[{i}]"), h, scope))
        .collect::<Result<Vec<_>, CompileError>>()?;

    Ok(CompiledGenerator {
        is_memoizable: false,
        run: Box::new(move |collaborators, activation| {
            let url = url.resolve(activation)?;
            let mut resolved_headers = Vec::with_capacity(headers.len());
            for header in &headers {
                let line = header.resolve(activation)?;
                let (name, value) = split_header(&line);
                resolved_headers.push((name, value));
            }
            Ok(collaborators.fetcher.get(&url, &resolved_headers)?)
        }),
    })
}

fn split_header(line: &str) -> (String, String) {
    match line.split_once(':') {
        Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
        None => (line.trim().to_string(), String::new()),
    }
}

/// A compiled `String` field (query apiVersion/kind/name/matchLabels
/// values, request url/headers): either a static string with no
/// interpolation, or a compiled leaf evaluated fresh each call.
enum CompiledField {
    Static(String),
    Dynamic(LeafSite),
}

impl CompiledField {
    fn compile(site: &str, s: &str, scope: &Scope) -> Result<Self, CompileError> {
        Ok(match LeafSite::compile(site, s, scope)? {
            Some(leaf) => CompiledField::Dynamic(leaf),
            None => CompiledField::Static(s.to_string()),
        })
    }

    fn is_static(&self) -> bool {
        matches!(self, CompiledField::Static(_))
    }

    fn resolve(&self, activation: &Activation) -> Result<String, EvalError> {
        match self {
            CompiledField::Static(s) => Ok(s.clone()),
            CompiledField::Dynamic(leaf) => leaf.eval_to_string(activation),
        }
    }
}
