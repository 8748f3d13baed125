use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::error::RouterError;
use crate::load_balancer::BalancerKind;
use crate::observability::metrics;
use crate::routing::Route;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HostStatus {
    pub address: String,
    pub enabled: bool,
    pub active_connections: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteStatus {
    pub key: String,
    pub input: String,
    pub output: String,
    pub balancer: String,
    pub min_path_len: usize,
    pub hosts: Vec<HostStatus>,
}

impl From<&Route> for RouteStatus {
    fn from(route: &Route) -> Self {
        Self {
            key: route.key().to_string(),
            input: route.input().pattern().to_string(),
            output: route.output().pattern().to_string(),
            balancer: route.balancer().name().to_string(),
            min_path_len: route.min_path_len(),
            hosts: route
                .hosts()
                .iter()
                .map(|h| HostStatus {
                    address: h.address().to_string(),
                    enabled: h.is_enabled(),
                    active_connections: h.active_connections(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetRouteRequest {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub balancer: BalancerKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetRouteResponse {
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveRouteRequest {
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddHostRequest {
    pub route: String,
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HostStateRequest {
    pub route: String,
    pub address: String,
    pub enabled: bool,
}

/// Registry error rendered as a JSON body.
///
/// Pattern errors are the caller's fault here, unlike during dispatch.
pub struct AdminError(RouterError);

impl From<RouterError> for AdminError {
    fn from(err: RouterError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            RouterError::InvalidPattern { .. } => StatusCode::BAD_REQUEST,
            ref other => other.status_code(),
        };
        let body = serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: state.registry.len(),
    })
}

pub async fn list_routes(State(state): State<AdminState>) -> Json<Vec<RouteStatus>> {
    let routes = state.registry.routes();
    Json(routes.iter().map(|r| RouteStatus::from(r.as_ref())).collect())
}

pub async fn set_route(
    State(state): State<AdminState>,
    Json(req): Json<SetRouteRequest>,
) -> Result<(StatusCode, Json<SetRouteResponse>), AdminError> {
    let key = state.registry.set_route(&req.input, &req.output, &req.balancer)?;
    Ok((StatusCode::CREATED, Json(SetRouteResponse { key })))
}

pub async fn remove_route(
    State(state): State<AdminState>,
    Json(req): Json<RemoveRouteRequest>,
) -> Result<StatusCode, AdminError> {
    state.registry.remove_route(&req.key)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_host(
    State(state): State<AdminState>,
    Json(req): Json<AddHostRequest>,
) -> Result<StatusCode, AdminError> {
    state.registry.add_host(&req.route, &req.address)?;
    metrics::record_host_enabled(&crate::routing::route_key(&req.route), &req.address, true);
    Ok(StatusCode::CREATED)
}

pub async fn set_host_state(
    State(state): State<AdminState>,
    Json(req): Json<HostStateRequest>,
) -> Result<StatusCode, AdminError> {
    state
        .registry
        .set_host_enabled(&req.route, &req.address, req.enabled)?;
    metrics::record_host_enabled(&crate::routing::route_key(&req.route), &req.address, req.enabled);
    Ok(StatusCode::NO_CONTENT)
}
