//! Error types for the routing core.
//!
//! Every failure the core can produce is a variant of [`RouterError`]. None of
//! them are retried internally; the dispatcher turns each one into an explicit
//! response (see `http::response`).

use thiserror::Error;

/// Result type alias for routing operations.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Routing core error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// No registered route key is a prefix of the request path.
    #[error("no route matched path {path}")]
    NoRouteMatched { path: String },

    /// The request path has fewer segments than the input template reads.
    #[error("path {path} is too short for template (needs {required} segments, got {actual})")]
    PathTooShort {
        path: String,
        required: usize,
        actual: usize,
    },

    /// The output template references a parameter the input never bound.
    #[error("output template references unbound parameter {name}")]
    MissingParameter { name: String },

    /// The pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A mutation targeted a route key that is not registered.
    #[error("route {key} not found")]
    RouteNotFound { key: String },

    /// A mutation received an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The balancer found no enabled host in the route's pool.
    #[error("no available host for route {key}")]
    NoAvailableHost { key: String },
}

impl RouterError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// Short, stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::NoRouteMatched { .. } => "no_route_matched",
            RouterError::PathTooShort { .. } => "path_too_short",
            RouterError::MissingParameter { .. } => "missing_parameter",
            RouterError::InvalidPattern { .. } => "invalid_pattern",
            RouterError::RouteNotFound { .. } => "route_not_found",
            RouterError::InvalidArgument(_) => "invalid_argument",
            RouterError::NoAvailableHost { .. } => "no_available_host",
        }
    }
}
