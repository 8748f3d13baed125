//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn configured routes into registry entries
//! - Re-apply routes on configuration reload
//!
//! # Design Decisions
//! - Fail fast at startup: a route that does not compile is fatal
//! - Reload is additive: routes are set, missing hosts appended, nothing removed

use crate::config::RouteConfig;
use crate::error::Result;
use crate::routing::RouteRegistry;

/// Build a registry holding the configured routes.
pub fn build_registry(routes: &[RouteConfig]) -> Result<RouteRegistry> {
    let registry = RouteRegistry::new();
    apply_routes(&registry, routes)?;
    Ok(registry)
}

/// Set every configured route and append hosts not already in its pool.
///
/// Returns the number of hosts added.
pub fn apply_routes(registry: &RouteRegistry, routes: &[RouteConfig]) -> Result<usize> {
    let mut added = 0;
    for route in routes {
        let key = registry.set_route(&route.input, &route.output, &route.balancer)?;
        let existing: Vec<String> = registry
            .get(&key)
            .map(|r| r.hosts().iter().map(|h| h.address().to_string()).collect())
            .unwrap_or_default();

        for address in route.hosts.iter().filter(|a| !existing.contains(a)) {
            registry.add_host(&key, address)?;
            added += 1;
        }
    }

    tracing::info!(routes = routes.len(), hosts_added = added, "Routes applied");
    Ok(added)
}
