//! Small shared helpers used by `compro-engine` and `compro-cli`: DNS-label
//! validation for `for` clause variable names, and scalar-to-string
//! coercion for interpolation.

pub mod dns_label;
pub mod scalar;

pub use dns_label::is_dns_label;
pub use scalar::{render_for_interpolation, require_exact_string};
