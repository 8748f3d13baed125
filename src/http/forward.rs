//! Upstream forwarding engine.
//!
//! # Responsibilities
//! - Rewrite the request URI to `http://{host}{path}[?query]`
//! - Send the request with the shared client and stream the response back
//! - Bound every upstream call by the request timeout
//! - Report outcomes to the host for passive disabling
//!
//! # Design Decisions
//! - Headers are forwarded unchanged; the original `Host` is kept
//! - Connection errors map to 502, timeouts to 504
//! - No retries here; a failed forward is reported once

use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{PathAndQuery, Scheme};
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{PassiveHealthConfig, TimeoutConfig};
use crate::dispatch::{Forwarder, Target};
use crate::observability::metrics;

/// Forwards requests over plain HTTP with a pooled hyper client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    passive_health: PassiveHealthConfig,
}

impl HttpForwarder {
    pub fn new(timeouts: &TimeoutConfig, passive_health: PassiveHealthConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
            passive_health,
        }
    }

    fn report(&self, target: &Target, failed: bool) {
        if !self.passive_health.enabled {
            return;
        }
        if !failed {
            target.host.mark_success();
            return;
        }
        if target.host.mark_failure(self.passive_health.failure_threshold) {
            tracing::warn!(
                route = %target.route_key,
                host = %target.address(),
                threshold = self.passive_health.failure_threshold,
                "Host disabled after consecutive failures"
            );
            metrics::record_host_enabled(&target.route_key, target.address(), false);
        }
    }

    async fn send(self, target: Target, request: Request<Body>) -> Response {
        let _in_flight = target.host.connection_guard();

        let uri = match upstream_uri(&target, request.uri()) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(host = %target.address(), path = %target.path, error = %e, "Invalid upstream URI");
                return (StatusCode::BAD_GATEWAY, "Invalid upstream address").into_response();
            }
        };

        let (mut parts, body) = request.into_parts();
        parts.uri = uri;
        let upstream = Request::from_parts(parts, body);

        match tokio::time::timeout(self.request_timeout, self.client.request(upstream)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                let failed = matches!(
                    status,
                    StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
                );
                self.report(&target, failed);

                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
            Ok(Err(e)) => {
                tracing::error!(host = %target.address(), error = %e, "Upstream error");
                self.report(&target, true);
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
            Err(_) => {
                tracing::error!(host = %target.address(), timeout = ?self.request_timeout, "Upstream timed out");
                self.report(&target, true);
                (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
            }
        }
    }
}

impl Forwarder for HttpForwarder {
    fn forward(&self, target: Target, request: Request<Body>) -> BoxFuture<'static, Response> {
        Box::pin(self.clone().send(target, request))
    }
}

/// Build the upstream URI from the target and the original query string.
fn upstream_uri(target: &Target, original: &Uri) -> Result<Uri, axum::http::Error> {
    let path_and_query = match original.query() {
        Some(query) => format!("{}?{}", target.path, query),
        None => target.path.clone(),
    };

    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(target.address())
        .path_and_query(PathAndQuery::try_from(path_and_query)?)
        .build()
}
