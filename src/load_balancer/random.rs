//! Random load balancing strategy.

use std::sync::Arc;

use crate::error::Result;
use crate::load_balancer::{no_available_host, Host, LoadBalancer, SelectContext};
use crate::routing::Route;

/// Uniform random selector over enabled hosts.
#[derive(Debug, Default)]
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(&self, route: &Route, _ctx: &SelectContext<'_>) -> Result<Arc<Host>> {
        let hosts = route.hosts();
        let enabled = hosts.iter().filter(|h| h.is_enabled()).count();
        if enabled == 0 {
            return Err(no_available_host(route));
        }

        // A host may flip between the count and the pick; fall back to the first enabled.
        let pick = fastrand::usize(..enabled);
        hosts
            .iter()
            .filter(|h| h.is_enabled())
            .nth(pick)
            .or_else(|| hosts.iter().find(|h| h.is_enabled()))
            .cloned()
            .ok_or_else(|| no_available_host(route))
    }
}
