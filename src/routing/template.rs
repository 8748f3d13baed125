//! Path template compilation.
//!
//! # Responsibilities
//! - Split paths into `/`-delimited segments
//! - Compile input patterns into parameter extractors
//! - Compile output patterns into path builders
//! - Derive the static route key of an input pattern
//!
//! # Pattern Syntax
//! ```text
//! /svc/:id/item/:item     `:name` captures exactly one segment
//! /files/*rest            `*name` captures every remaining segment (last only)
//! /static/assets          anything else is a literal
//! ```
//!
//! # Design Decisions
//! - Templates are immutable after compilation and shared freely across requests
//! - Literal segments are positional only; the route key already matched the prefix
//! - Parameters are keyed by their full marker (`:id`, `*rest`) so output
//!   placeholders resolve verbatim

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, RouterError};

const PARAM_MARKER: char = ':';
const WILDCARD_MARKER: char = '*';

/// Split a path into segments.
///
/// Exactly one trailing `/` is stripped and only the leading empty segment
/// produced by a leading `/` is dropped. Interior empty segments are kept.
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut segments: Vec<&str> = trimmed.split('/').collect();
    if segments.first() == Some(&"") {
        segments.remove(0);
    }
    segments
}

/// Derive the route key from an input pattern.
///
/// The key is the pattern truncated before the first `:`/`*` segment, without
/// its trailing `/`. A pattern that starts with a marker keys to `/`.
pub fn route_key(pattern: &str) -> String {
    let mut offset = 0;
    let mut end = pattern.len();
    for segment in pattern.split('/') {
        if segment.starts_with(PARAM_MARKER) || segment.starts_with(WILDCARD_MARKER) {
            end = offset;
            break;
        }
        offset += segment.len() + 1;
    }

    let key = &pattern[..end];
    let key = key.strip_suffix('/').unwrap_or(key);
    if key.is_empty() {
        "/".to_string()
    } else {
        key.to_string()
    }
}

/// One compiled template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `:name`, stored with its marker.
    Param(String),
    /// `*name`, stored with its marker.
    Wildcard(String),
}

impl Segment {
    fn parse(raw: &str, pattern: &str) -> Result<Self> {
        if let Some(name) = raw.strip_prefix(PARAM_MARKER) {
            if name.is_empty() {
                return Err(RouterError::invalid_pattern(pattern, "parameter without a name"));
            }
            Ok(Segment::Param(raw.to_string()))
        } else if let Some(name) = raw.strip_prefix(WILDCARD_MARKER) {
            if name.is_empty() {
                return Err(RouterError::invalid_pattern(pattern, "wildcard without a name"));
            }
            Ok(Segment::Wildcard(raw.to_string()))
        } else {
            Ok(Segment::Literal(raw.to_string()))
        }
    }

    /// The marker-prefixed name for placeholder segments.
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Param(name) | Segment::Wildcard(name) => Some(name),
        }
    }
}

fn compile_segments(pattern: &str) -> Result<Vec<Segment>> {
    if pattern.is_empty() {
        return Err(RouterError::invalid_pattern(pattern, "empty path"));
    }

    let raw = split_path(pattern);
    let mut segments = Vec::with_capacity(raw.len());
    for (i, part) in raw.iter().enumerate() {
        let segment = Segment::parse(part, pattern)?;
        if matches!(segment, Segment::Wildcard(_)) && i + 1 != raw.len() {
            return Err(RouterError::invalid_pattern(pattern, "wildcard must be the last segment"));
        }
        segments.push(segment);
    }
    Ok(segments)
}

/// Parameters extracted from a request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, marker: impl Into<String>, value: impl Into<String>) {
        self.values.insert(marker.into(), value.into());
    }

    /// Look up a parameter by marker (`:id`) or bare name (`id`).
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.values.get(name) {
            return Some(value);
        }
        [PARAM_MARKER, WILDCARD_MARKER]
            .iter()
            .find_map(|marker| self.values.get(&format!("{marker}{name}")))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Compiled input pattern: extracts parameters from request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl InputTemplate {
    pub fn compile(pattern: &str) -> Result<Self> {
        let segments = compile_segments(pattern)?;

        let mut seen = Vec::new();
        for name in segments.iter().filter_map(Segment::placeholder) {
            let bare = &name[1..];
            if seen.contains(&bare) {
                return Err(RouterError::invalid_pattern(
                    pattern,
                    format!("duplicate parameter {bare}"),
                ));
            }
            seen.push(bare);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Minimum number of request segments this template reads.
    pub fn min_path_len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the template binds the given placeholder (`:id` or `*rest`).
    pub fn binds(&self, placeholder: &str) -> bool {
        self.segments
            .iter()
            .filter_map(Segment::placeholder)
            .any(|name| name == placeholder)
    }

    /// Extract parameters from a request path.
    pub fn extract(&self, path: &str) -> Result<Params> {
        let parts = split_path(path);
        if parts.len() < self.min_path_len() {
            return Err(RouterError::PathTooShort {
                path: path.to_string(),
                required: self.min_path_len(),
                actual: parts.len(),
            });
        }

        let mut params = Params::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(_) => {}
                Segment::Param(name) => params.insert(name.as_str(), parts[i]),
                Segment::Wildcard(name) => {
                    params.insert(name.as_str(), format!("/{}", parts[i..].join("/")));
                    break;
                }
            }
        }
        Ok(params)
    }
}

impl fmt::Display for InputTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Compiled output pattern: builds backend paths from parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl OutputTemplate {
    pub fn compile(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: pattern.to_string(),
            segments: compile_segments(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholders referenced by this template, in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::placeholder)
    }

    /// Check every placeholder is bound by the input template.
    pub fn check_bound_by(&self, input: &InputTemplate) -> Result<()> {
        match self.placeholders().find(|name| !input.binds(name)) {
            Some(name) => Err(RouterError::invalid_pattern(
                &self.pattern,
                format!("{name} is not bound by input {}", input.pattern()),
            )),
            None => Ok(()),
        }
    }

    /// Build the backend path.
    ///
    /// Substituted segments are joined with `/`; a leading `/` is added only
    /// when the first segment lacks one.
    pub fn build(&self, params: &Params) -> Result<String> {
        let values = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => Ok(literal.as_str()),
                Segment::Param(name) | Segment::Wildcard(name) => {
                    params.get(name).ok_or_else(|| RouterError::MissingParameter {
                        name: name.clone(),
                    })
                }
            })
            .collect::<Result<Vec<&str>>>()?;

        let joined = values.join("/");
        if joined.starts_with('/') {
            Ok(joined)
        } else {
            Ok(format!("/{joined}"))
        }
    }
}

impl fmt::Display for OutputTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(split_path("/a/b/"), vec!["a", "b"]);
        assert_eq!(split_path("a/b"), vec!["a", "b"]);
        assert_eq!(split_path("/a//b"), vec!["a", "", "b"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_split_strips_one_trailing_slash() {
        assert_eq!(split_path("/ab/cd/"), vec!["ab", "cd"]);
        assert_eq!(split_path("/ab//"), vec!["ab", ""]);
    }

    #[test]
    fn test_route_key() {
        assert_eq!(route_key("/svc/:id/item/:item"), "/svc");
        assert_eq!(route_key("/files/*rest"), "/files");
        assert_eq!(route_key("/static/assets"), "/static/assets");
        assert_eq!(route_key("/static/assets/"), "/static/assets");
        assert_eq!(route_key("/:id"), "/");
        assert_eq!(route_key("/"), "/");
        assert_eq!(route_key("/a:b/:c"), "/a:b");
    }

    #[test]
    fn test_rewrite_example() {
        let input = InputTemplate::compile("/svc/:id/item/:item").unwrap();
        let output = OutputTemplate::compile("/v2/:item/:id").unwrap();

        let params = input.extract("/svc/42/item/99").unwrap();
        assert_eq!(params.get(":id"), Some("42"));
        assert_eq!(params.get("item"), Some("99"));
        assert_eq!(output.build(&params).unwrap(), "/v2/99/42");
    }

    #[test]
    fn test_wildcard_capture() {
        let input = InputTemplate::compile("/files/*rest").unwrap();
        let params = input.extract("/files/a/b/c").unwrap();
        assert_eq!(params.get("rest"), Some("/a/b/c"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_wildcard_rewrite() {
        let input = InputTemplate::compile("/files/*rest").unwrap();
        let params = input.extract("/files/a/b").unwrap();

        let root = OutputTemplate::compile("/*rest").unwrap();
        assert_eq!(root.build(&params).unwrap(), "/a/b");

        let nested = OutputTemplate::compile("/storage/*rest").unwrap();
        assert_eq!(nested.build(&params).unwrap(), "/storage//a/b");
    }

    #[test]
    fn test_output_segments_joined_with_slash() {
        let input = InputTemplate::compile("/files/*rest").unwrap();
        let params = input.extract("/files/a/b/c").unwrap();

        let output = OutputTemplate::compile("/storage/*rest").unwrap();
        assert_eq!(output.build(&params).unwrap(), "/storage//a/b/c");

        let input = InputTemplate::compile("/svc/:id").unwrap();
        let params = input.extract("/svc/7").unwrap();
        let output = OutputTemplate::compile("items/:id/detail").unwrap();
        assert_eq!(output.build(&params).unwrap(), "/items/7/detail");
    }

    #[test]
    fn test_path_too_short() {
        let input = InputTemplate::compile("/svc/:id/item/:item").unwrap();
        let err = input.extract("/svc/42").unwrap_err();
        assert_eq!(
            err,
            RouterError::PathTooShort {
                path: "/svc/42".into(),
                required: 4,
                actual: 2,
            }
        );

        let wildcard = InputTemplate::compile("/files/*rest").unwrap();
        assert!(matches!(wildcard.extract("/files/"), Err(RouterError::PathTooShort { .. })));
    }

    #[test]
    fn test_literals_are_positional() {
        let input = InputTemplate::compile("/svc/:id/item/:item").unwrap();
        let params = input.extract("/svc/1/other/2").unwrap();
        assert_eq!(params.get("item"), Some("2"));
    }

    #[test]
    fn test_missing_parameter() {
        let output = OutputTemplate::compile("/v2/:missing").unwrap();
        let err = output.build(&Params::new()).unwrap_err();
        assert_eq!(err, RouterError::MissingParameter { name: ":missing".into() });
    }

    #[test]
    fn test_output_without_leading_slash() {
        let output = OutputTemplate::compile("v1/:id").unwrap();
        let mut params = Params::new();
        params.insert(":id", "7");
        assert_eq!(output.build(&params).unwrap(), "/v1/7");
    }

    #[test]
    fn test_root_output() {
        let output = OutputTemplate::compile("/").unwrap();
        assert_eq!(output.build(&Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(InputTemplate::compile(""), Err(RouterError::InvalidPattern { .. })));
        assert!(matches!(
            InputTemplate::compile("/files/*rest/more"),
            Err(RouterError::InvalidPattern { .. })
        ));
        assert!(matches!(InputTemplate::compile("/a/:"), Err(RouterError::InvalidPattern { .. })));
        assert!(matches!(
            InputTemplate::compile("/a/:id/b/:id"),
            Err(RouterError::InvalidPattern { .. })
        ));
        assert!(matches!(OutputTemplate::compile("/*x/y"), Err(RouterError::InvalidPattern { .. })));
    }

    #[test]
    fn test_check_bound_by() {
        let input = InputTemplate::compile("/svc/:id").unwrap();
        assert!(OutputTemplate::compile("/v2/:id").unwrap().check_bound_by(&input).is_ok());
        assert!(OutputTemplate::compile("/v2/:other").unwrap().check_bound_by(&input).is_err());
    }
}
