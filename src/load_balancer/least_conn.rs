//! Least Connections load balancing strategy.

use std::sync::Arc;

use crate::error::Result;
use crate::load_balancer::{no_available_host, Host, LoadBalancer, SelectContext};
use crate::routing::Route;

/// Least connections selector.
/// Selects the enabled host with the fewest in-flight forwards.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn name(&self) -> &'static str {
        "least_connections"
    }

    fn select(&self, route: &Route, _ctx: &SelectContext<'_>) -> Result<Arc<Host>> {
        // In case of tie, the first one is selected (stability)
        route
            .hosts()
            .iter()
            .filter(|h| h.is_enabled())
            .min_by_key(|h| h.active_connections())
            .cloned()
            .ok_or_else(|| no_available_host(route))
    }
}
