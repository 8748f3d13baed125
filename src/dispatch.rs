//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! request path
//!     → RouteRegistry::match_route    (NoRouteMatched   → 404)
//!     → InputTemplate::extract        (PathTooShort     → 400)
//!     → OutputTemplate::build         (MissingParameter → 500)
//!     → LoadBalancer::select          (NoAvailableHost  → 503)
//!     → Forwarder::forward(host, rewritten path, original request)
//! ```
//!
//! # Design Decisions
//! - Every failure becomes an explicit response; nothing is dropped
//! - The route snapshot is taken once; the rest of the dispatch never
//!   touches the registry lock again
//! - The dispatcher never inspects the backend response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::request::request_id_of;
use crate::load_balancer::{Host, SelectContext};
use crate::observability::metrics;
use crate::routing::RouteRegistry;

/// Where a request is sent.
#[derive(Debug, Clone)]
pub struct Target {
    pub route_key: String,
    pub host: Arc<Host>,
    pub path: String,
}

impl Target {
    pub fn address(&self) -> &str {
        self.host.address()
    }
}

/// The transport that performs the upstream call.
pub trait Forwarder: Send + Sync {
    fn forward(&self, target: Target, request: Request<Body>) -> BoxFuture<'static, Response>;
}

/// Orchestrates lookup, rewrite, host selection and handoff.
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    forwarder: Arc<dyn Forwarder>,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouteRegistry>, forwarder: Arc<dyn Forwarder>) -> Self {
        Self {
            registry,
            forwarder,
        }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// Resolve the target for a path without forwarding.
    pub fn resolve(&self, path: &str, client_addr: Option<SocketAddr>) -> Result<Target> {
        let route = self.registry.match_route(path)?;
        let rewritten = route.rewrite(path)?;
        let host = route.select(&SelectContext { path, client_addr })?;

        Ok(Target {
            route_key: route.key().to_string(),
            host,
            path: rewritten,
        })
    }

    /// Dispatch a request end to end.
    pub async fn dispatch(&self, request: Request<Body>, client_addr: Option<SocketAddr>) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();
        let path = request.uri().path().to_string();
        let request_id = request_id_of(&request).to_string();

        let target = match self.resolve(&path, client_addr) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(
                    request_id = %request_id,
                    path = %path,
                    kind = err.kind(),
                    error = %err,
                    "Dispatch failed"
                );
                metrics::record_dispatch_failure(err.kind());
                let response = err.into_response();
                metrics::record_request(&method, response.status().as_u16(), "none", start);
                return response;
            }
        };

        tracing::debug!(
            request_id = %request_id,
            route = %target.route_key,
            host = %target.address(),
            upstream_path = %target.path,
            "Forwarding request"
        );

        let route_key = target.route_key.clone();
        let response = self.forwarder.forward(target, request).await;
        metrics::record_request(&method, response.status().as_u16(), &route_key, start);
        response
    }
}
