//! Administrative API.
//!
//! ```text
//! GET    /admin/status
//! GET    /admin/routes
//! POST   /admin/routes   {input, output, balancer}   set_route
//! DELETE /admin/routes   {key}                       remove_route
//! POST   /admin/hosts    {route, address}            add_host
//! PUT    /admin/hosts    {route, address, enabled}   set_host_enabled
//! ```

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::routing::RouteRegistry;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<RouteRegistry>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route(
            "/admin/routes",
            get(list_routes).post(set_route).delete(remove_route),
        )
        .route("/admin/hosts", post(add_host).put(set_host_state))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> (Router, Arc<RouteRegistry>) {
        let registry = Arc::new(RouteRegistry::new());
        let state = AdminState {
            registry: registry.clone(),
            api_key: Arc::from("secret"),
        };
        (setup_admin_router(state), registry)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer secret")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_requires_auth() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::builder().uri("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_route_and_host_lifecycle() {
        let (app, registry) = app();

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/routes",
                serde_json::json!({"input": "/svc/:id", "output": "/v1/:id"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/hosts",
                serde_json::json!({"route": "/svc", "address": "10.0.0.1:80"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(registry.get("/svc").unwrap().hosts().len(), 1);

        let res = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/admin/hosts",
                serde_json::json!({"route": "/svc", "address": "10.0.0.1:80", "enabled": false}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(!registry.get("/svc").unwrap().hosts()[0].is_enabled());

        let res = app
            .clone()
            .oneshot(json_request("DELETE", "/admin/routes", serde_json::json!({"key": "/svc"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (app, _) = app();

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/hosts",
                serde_json::json!({"route": "/missing", "address": "10.0.0.1:80"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/routes",
                serde_json::json!({"input": "/a/*rest/b", "output": "/"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
