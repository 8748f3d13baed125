//! Route key matching logic.
//!
//! # Responsibilities
//! - Find the longest registered key that prefixes a request path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Keys are plain string prefixes, as derived from patterns
//! - Deterministic: ordered keys, independent of registration order
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;
use std::ops::Bound;

/// Return the entry whose key is the longest prefix of `path`.
///
/// Every prefix of `path` sorts at or before `path`, and a longer prefix sorts
/// after a shorter one, so the first prefix met walking backwards is the longest.
pub fn longest_prefix<'a, V>(
    entries: &'a BTreeMap<String, V>,
    path: &str,
) -> Option<(&'a String, &'a V)> {
    entries
        .range::<str, _>((Bound::Unbounded, Bound::Included(path)))
        .rev()
        .find(|(key, _)| path.starts_with(key.as_str()))
}
