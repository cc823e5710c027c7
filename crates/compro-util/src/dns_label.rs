//! DNS-label validation for `for` clause variable names (spec.md §3:
//! `var` is "a DNS-label name").

use once_cell::sync::Lazy;
use regex::Regex;

static DNS_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());

/// RFC 1123 DNS label: lowercase alphanumerics and `-`, max 63 characters,
/// must not start or end with `-`.
pub fn is_dns_label(name: &str) -> bool {
    !name.is_empty() && name.len() <= 63 && DNS_LABEL.is_match(name)
}
