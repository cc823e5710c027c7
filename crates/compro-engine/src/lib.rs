//! # Compro Engine
//!
//! The comprehension evaluator: a two-phase compile-then-instantiate
//! pipeline over a declarative `ComprehensionSpec` (see `compro-types`).
//! Compiling is pure and single-pass; instantiating may call out to an
//! object-store client or an HTTP fetcher through the interfaces in
//! `compro-store`.
//!
//! ## Pipeline
//!
//! - **`interpolation`**: split a string leaf into literal/expression tokens
//! - **`expr`**: compile and evaluate a single embedded CEL expression
//! - **`template`**: compile a JSON-shaped template into a skeleton plus sites
//! - **`generator`**: compile `list`/`query`/`request` generators
//! - **`binding`**: the compile-time variable scope
//! - **`eval`**: the nested-loop instantiation driver
//!
//! ## Usage
//!
//! ```rust
//! use compro_engine::compile;
//! use compro_store::{InMemoryStore, ScriptedFetcher};
//! use compro_types::ComprehensionSpec;
//!
//! let spec: ComprehensionSpec = serde_yaml::from_str(r#"
//! for:
//! - var: n
//!   in:
//!     list: [1, 2, 3]
//! yield:
//!   template: "${n * n}"
//! "#)?;
//!
//! let compiled = compile(&spec)?;
//! let store = InMemoryStore::new();
//! let fetcher = ScriptedFetcher::ok(vec![]);
//! let results = compiled.eval(&store, &fetcher)?;
//! assert_eq!(results.len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binding;
pub mod celvalue;
pub mod error;
pub mod eval;
pub mod expr;
pub mod generator;
pub mod interpolation;
pub mod template;

pub use error::{CompileError, EvalError};
pub use eval::{compile, CompiledComprehension};
pub use expr::Activation;
