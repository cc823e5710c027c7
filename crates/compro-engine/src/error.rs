//! The evaluator's two-phase error taxonomy: failures discovered while
//! compiling a spec (pure, no I/O) versus failures discovered while
//! instantiating it (may call the object store or an HTTP endpoint).

use compro_store::{HttpError, ObjectStoreError};
use thiserror::Error;

/// Errors raised while compiling a `ComprehensionSpec`, before any
/// generator has run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed interpolation in {site}: {detail}")]
    MalformedInterpolation { site: String, detail: String },

    #[error("failed to compile expression `{expr}`: {detail}")]
    ExpressionCompileError { expr: String, detail: String },

    #[error("generator for `{var}` has none of list, query, request set")]
    UnknownGenerator { var: String },

    #[error("duplicate binding `{var}`: a variable of this name is already in scope")]
    DuplicateBinding { var: String },

    #[error("`{var}` is not a valid DNS-label variable name")]
    InvalidVariableName { var: String },

    #[error("expression `{expr}` references `{var}`, which is not bound at this point")]
    UnboundVariable { expr: String, var: String },
}

impl CompileError {
    pub fn malformed_interpolation(site: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedInterpolation {
            site: site.into(),
            detail: detail.into(),
        }
    }

    pub fn expression_compile_error(expr: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExpressionCompileError {
            expr: expr.into(),
            detail: detail.into(),
        }
    }
}

/// Errors raised while instantiating a compiled spec: evaluating
/// expressions against a live activation, or calling out to a collaborator.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to evaluate expression `{expr}`: {detail}")]
    ExpressionEvalError { expr: String, detail: String },

    #[error("expression `{expr}` must resolve to a string here, but did not")]
    StringCoercionError { expr: String },

    #[error("query generator for `{var}` must set exactly one of name or matchLabels")]
    MalformedQuery { var: String },

    #[error(transparent)]
    NotFound(#[from] ObjectStoreError),

    /// Covers the spec's `RequestFailed(status)` (via [`HttpError::Status`])
    /// as well as transport and decode failures from the same call.
    #[error(transparent)]
    RequestFailed(#[from] HttpError),

    #[error("evaluation cancelled")]
    Cancelled,
}

impl EvalError {
    pub fn expression_eval_error(expr: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExpressionEvalError {
            expr: expr.into(),
            detail: detail.into(),
        }
    }
}
