//! Component B: compile a single embedded expression against a known
//! set of variable names, returning a reusable handle.
//!
//! Expressions are CEL (Common Expression Language), via `cel-parser` /
//! `cel-interpreter`. Compilation parses the expression and then walks
//! the resulting AST for free variable references, rejecting any that
//! aren't already bound in `scope` — a forward or unknown reference is
//! caught here, before any generator with side effects (`query`,
//! `request`) has run, per spec Invariant 1.

use crate::binding::Scope;
use crate::celvalue::{cel_to_json, json_to_cel};
use crate::error::{CompileError, EvalError};
use cel_interpreter::Context;
use cel_parser::{Expression as CelAst, Member};
use serde_json::Value;
use std::collections::HashMap;

/// The per-tuple mapping of bound variable name to its current value.
pub type Activation = HashMap<String, Value>;

/// A parsed CEL expression, ready to be evaluated repeatedly against
/// different activations.
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    source: String,
    ast: CelAst,
}

/// Compile `source` as a CEL expression, rejecting it if it references
/// any name not already bound in `scope`.
pub fn compile(source: &str, scope: &Scope) -> Result<CompiledExpr, CompileError> {
    let ast = cel_parser::parse(source).map_err(|e| CompileError::expression_compile_error(source, e.to_string()))?;

    let mut idents = Vec::new();
    collect_identifiers(&ast, &mut idents);
    for name in idents {
        if !scope.contains(name) {
            return Err(CompileError::UnboundVariable {
                expr: source.to_string(),
                var: name.to_string(),
            });
        }
    }

    Ok(CompiledExpr {
        source: source.to_string(),
        ast,
    })
}

/// Walk a parsed expression, collecting every bare variable reference
/// (not a function name or an attribute/field name). Shaped after the
/// property-path walker in the CEL crate's own consumers: the same set
/// of AST node kinds, recursing into the same child positions, but
/// recording every `Ident` rather than only ones followed by a member
/// access.
fn collect_identifiers<'e>(expr: &'e CelAst, out: &mut Vec<&'e str>) {
    match expr {
        CelAst::Arithmetic(e1, _, e2) | CelAst::Relation(e1, _, e2) | CelAst::Ternary(e1, _, e2) | CelAst::Or(e1, e2) | CelAst::And(e1, e2) => {
            collect_identifiers(e1, out);
            collect_identifiers(e2, out);
        }
        CelAst::Unary(_, e) => {
            collect_identifiers(e, out);
        }
        CelAst::Member(e, member) => {
            if let Member::Index(index) = &**member {
                collect_identifiers(index, out);
            }
            collect_identifiers(e, out);
        }
        CelAst::FunctionCall(_, target, args) => {
            if let Some(target) = target {
                collect_identifiers(target, out);
            }
            for arg in args {
                collect_identifiers(arg, out);
            }
        }
        CelAst::List(items) => {
            for item in items {
                collect_identifiers(item, out);
            }
        }
        CelAst::Map(entries) => {
            for (k, v) in entries {
                collect_identifiers(k, out);
                collect_identifiers(v, out);
            }
        }
        CelAst::Atom(_) => {}
        CelAst::Ident(name) => out.push(name.as_str()),
    }
}

impl CompiledExpr {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against an activation record, returning the result as a
    /// `serde_json::Value`.
    pub fn eval(&self, activation: &HashMap<String, Value>) -> Result<Value, EvalError> {
        let mut ctx = Context::default();
        for (name, value) in activation {
            let cel_value = json_to_cel(value);
            ctx.add_variable_from_value(name, cel_value);
        }

        let result = cel_interpreter::Value::resolve(&self.ast, &ctx)
            .map_err(|e| EvalError::expression_eval_error(&self.source, e.to_string()))?;

        cel_to_json(result).map_err(|detail| EvalError::expression_eval_error(&self.source, detail))
    }
}

/// Truthiness per spec: anything but the literal boolean `false` is
/// truthy, including `0`, `""`, and `null`.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Bool(false))
}
