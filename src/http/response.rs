//! Response handling for dispatch failures.
//!
//! # Responsibilities
//! - Map every routing error to a distinguishable HTTP status
//! - Render failures as plain-text responses
//!
//! # Design Decisions
//! - A failed dispatch always produces a response; nothing is dropped
//! - Output templates referencing unbound names are configuration errors (500)
//! - Upstream transport failures are mapped by the forwarder (502/504)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::RouterError;

impl RouterError {
    /// HTTP status reported to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouterError::NoRouteMatched { .. } | RouterError::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            RouterError::PathTooShort { .. } | RouterError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            RouterError::MissingParameter { .. } | RouterError::InvalidPattern { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RouterError::NoAvailableHost { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RouterError::NoRouteMatched { path: "/x".into() }, 404),
            (
                RouterError::PathTooShort { path: "/x".into(), required: 2, actual: 1 },
                400,
            ),
            (RouterError::MissingParameter { name: ":id".into() }, 500),
            (RouterError::NoAvailableHost { key: "/x".into() }, 503),
            (RouterError::RouteNotFound { key: "/x".into() }, 404),
            (RouterError::InvalidArgument("empty".into()), 400),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
        }
    }

    #[test]
    fn test_into_response() {
        let response = RouterError::NoAvailableHost { key: "/svc".into() }.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
