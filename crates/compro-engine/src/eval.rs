//! Component E: the instantiation driver. Builds the binding environment
//! incrementally while compiling, then walks the compiled generators as
//! a nested loop, producing a filtered cross-product of bindings and
//! yielding one template instantiation per surviving tuple.

use crate::binding::Scope;
use crate::error::{CompileError, EvalError};
use crate::expr::{self, Activation, CompiledExpr};
use crate::generator::{self, Collaborators, CompiledGenerator};
use crate::template::{self, CompiledTemplate};
use compro_store::{HttpFetcher, ObjectStoreClient};
use compro_types::ComprehensionSpec;
use compro_util::is_dns_label;
use serde_json::Value;
use std::cell::RefCell;

struct CompiledForClause {
    var: String,
    generator: CompiledGenerator,
    when: Option<CompiledExpr>,
}

/// A compiled comprehension, ready to be instantiated any number of
/// times against live collaborators.
pub struct CompiledComprehension {
    for_clauses: Vec<CompiledForClause>,
    yield_template: CompiledTemplate,
}

/// Compile a `ComprehensionSpec`: build the binding environment
/// incrementally, one `for` clause at a time, then compile the yield
/// template against the final environment.
pub fn compile(spec: &ComprehensionSpec) -> Result<CompiledComprehension, CompileError> {
    let mut scope = Scope::new();
    let mut for_clauses = Vec::with_capacity(spec.for_clauses.len());

    for clause in &spec.for_clauses {
        if !is_dns_label(&clause.var) {
            return Err(CompileError::InvalidVariableName { var: clause.var.clone() });
        }

        let compiled_generator = generator::compile_generator(&clause.var, &clause.generator, &scope)?;

        // The `when` predicate may reference this clause's own variable,
        // so bind it before compiling the predicate but after compiling
        // the generator (which must not see it).
        scope.push(&clause.var)?;

        let compiled_when = clause.when.as_deref().map(|w| expr::compile(w, &scope)).transpose()?;

        for_clauses.push(CompiledForClause {
            var: clause.var.clone(),
            generator: compiled_generator,
            when: compiled_when,
        });
    }

    let yield_template = template::compile_template(&spec.yield_expr.template, &scope)?;

    Ok(CompiledComprehension { for_clauses, yield_template })
}

impl CompiledComprehension {
    /// Instantiate against live collaborators, with no cancellation
    /// support (equivalent to a `cancel` that never fires).
    pub fn eval(&self, store: &dyn ObjectStoreClient, fetcher: &dyn HttpFetcher) -> Result<Vec<Value>, EvalError> {
        self.eval_cancellable(store, fetcher, &|| false)
    }

    /// Instantiate against live collaborators, checking `cancel` before
    /// each level's per-value loop so a long-running instantiation can
    /// be aborted between generator calls.
    pub fn eval_cancellable(&self, store: &dyn ObjectStoreClient, fetcher: &dyn HttpFetcher, cancel: &dyn Fn() -> bool) -> Result<Vec<Value>, EvalError> {
        let collaborators = Collaborators { store, fetcher };
        let memo: RefCell<Vec<Option<Vec<Value>>>> = RefCell::new(vec![None; self.for_clauses.len()]);
        let mut activation = Activation::new();
        let mut out = Vec::new();

        instantiate(&self.for_clauses, &self.yield_template, 0, &collaborators, &mut activation, &memo, cancel, &mut out)?;

        Ok(out)
    }
}

#[allow(clippy::too_many_arguments)]
fn instantiate(
    clauses: &[CompiledForClause],
    yield_template: &CompiledTemplate,
    level: usize,
    collaborators: &Collaborators,
    activation: &mut Activation,
    memo: &RefCell<Vec<Option<Vec<Value>>>>,
    cancel: &dyn Fn() -> bool,
    out: &mut Vec<Value>,
) -> Result<(), EvalError> {
    let Some(clause) = clauses.get(level) else {
        out.push(yield_template.evaluate(activation)?);
        return Ok(());
    };

    let values = if clause.generator.is_memoizable {
        if let Some(cached) = memo.borrow()[level].clone() {
            cached
        } else {
            let computed = clause.generator.call(collaborators, activation)?;
            memo.borrow_mut()[level] = Some(computed.clone());
            computed
        }
    } else {
        clause.generator.call(collaborators, activation)?
    };

    if cancel() {
        return Err(EvalError::Cancelled);
    }

    for value in values {
        activation.insert(clause.var.clone(), value);

        let keep = match &clause.when {
            Some(predicate) => expr::is_truthy(&predicate.eval(activation)?),
            None => true,
        };

        if keep {
            instantiate(clauses, yield_template, level + 1, collaborators, activation, memo, cancel, out)?;
        }
    }
    activation.remove(&clause.var);

    Ok(())
}
