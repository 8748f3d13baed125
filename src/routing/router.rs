//! Route registry: lookup and administrative mutation.
//!
//! # Responsibilities
//! - Store routes by key, behind a read-write lock
//! - Look up the longest-prefix route for a request path
//! - Register, replace and remove routes; grow host pools
//!
//! # Design Decisions
//! - Routes are `Arc` snapshots replaced copy-on-write; readers never see a
//!   half-updated host list
//! - Ordered map keeps matching deterministic
//! - Re-registering a key keeps its host pool; only `add_host` grows it
//! - Explicit errors rather than silent defaults

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, RouterError};
use crate::load_balancer::{BalancerFactory, Host};
use crate::routing::matcher::longest_prefix;
use crate::routing::route::Route;
use crate::routing::template::{route_key, InputTemplate, OutputTemplate};

const HOST_POOL_CAPACITY: usize = 20;

/// Concurrency-safe mapping from route key to route.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: RwLock<BTreeMap<String, Arc<Route>>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never leave the map half-updated, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<Route>>> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<Route>>> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register or replace the route derived from `input`.
    ///
    /// Returns the route key. An existing route keeps its host pool.
    pub fn set_route(
        &self,
        input: &str,
        output: &str,
        factory: &dyn BalancerFactory,
    ) -> Result<String> {
        let key = route_key(input);
        let input_template = InputTemplate::compile(input)?;
        let output_template = OutputTemplate::compile(output)?;
        output_template.check_bound_by(&input_template)?;
        let balancer = factory.create();

        let mut routes = self.write();
        let route = match routes.get(&key) {
            Some(existing) => {
                tracing::info!(key = %key, input, output, balancer = balancer.name(), "Route updated");
                existing.reconfigured(input_template, output_template, balancer)
            }
            None => {
                tracing::info!(key = %key, input, output, balancer = balancer.name(), "Route registered");
                Route::new(
                    key.clone(),
                    input_template,
                    output_template,
                    Vec::with_capacity(HOST_POOL_CAPACITY),
                    balancer,
                )
            }
        };
        routes.insert(key.clone(), Arc::new(route));
        Ok(key)
    }

    /// Remove a route by key (or by the pattern it was registered with).
    pub fn remove_route(&self, key: &str) -> Result<()> {
        let key = route_key(key);
        let mut routes = self.write();
        match routes.remove(&key) {
            Some(_) => {
                tracing::info!(key = %key, "Route removed");
                Ok(())
            }
            None => Err(RouterError::RouteNotFound { key }),
        }
    }

    /// Append an enabled host to a route's pool.
    pub fn add_host(&self, route: &str, address: &str) -> Result<()> {
        if route.is_empty() {
            return Err(RouterError::InvalidArgument("route identifier is empty".into()));
        }
        if address.is_empty() {
            return Err(RouterError::InvalidArgument("host address is empty".into()));
        }

        let key = route_key(route);
        let mut routes = self.write();
        let current = routes
            .get(&key)
            .ok_or_else(|| RouterError::RouteNotFound { key: key.clone() })?;
        let next = current.with_host(Arc::new(Host::new(address)));
        let pool_size = next.hosts().len();
        routes.insert(key.clone(), Arc::new(next));

        tracing::info!(key = %key, address, pool_size, "Host added");
        Ok(())
    }

    /// Enable or disable every host with `address` in a route's pool.
    pub fn set_host_enabled(&self, route: &str, address: &str, enabled: bool) -> Result<()> {
        let key = route_key(route);
        let snapshot = self
            .get(&key)
            .ok_or_else(|| RouterError::RouteNotFound { key: key.clone() })?;

        let mut found = false;
        for host in snapshot.hosts().iter().filter(|h| h.address() == address) {
            host.set_enabled(enabled);
            found = true;
        }
        if !found {
            return Err(RouterError::InvalidArgument(format!(
                "host {address} not in route {key}"
            )));
        }

        tracing::info!(key = %key, address, enabled, "Host state changed");
        Ok(())
    }

    /// Find the route whose key is the longest prefix of `path`.
    pub fn match_route(&self, path: &str) -> Result<Arc<Route>> {
        let routes = self.read();
        match longest_prefix(&routes, path) {
            Some((_, route)) => Ok(route.clone()),
            None => Err(RouterError::NoRouteMatched {
                path: path.to_string(),
            }),
        }
    }

    /// Get a route snapshot by key.
    pub fn get(&self, key: &str) -> Option<Arc<Route>> {
        self.read().get(key).cloned()
    }

    /// Snapshot of all routes, ordered by key.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::BalancerKind;

    const RR: BalancerKind = BalancerKind::RoundRobin;

    #[test]
    fn test_set_and_match() {
        let registry = RouteRegistry::new();
        let key = registry.set_route("/svc/:id/item/:item", "/v2/:item/:id", &RR).unwrap();
        assert_eq!(key, "/svc");

        let route = registry.match_route("/svc/42/item/99").unwrap();
        assert_eq!(route.key(), "/svc");
        assert_eq!(route.min_path_len(), 4);
        assert_eq!(route.rewrite("/svc/42/item/99").unwrap(), "/v2/99/42");
    }

    #[test]
    fn test_longest_prefix_independent_of_order() {
        let forward = RouteRegistry::new();
        forward.set_route("/api/*rest", "/*rest", &RR).unwrap();
        forward.set_route("/api/v2/*rest", "/*rest", &RR).unwrap();

        let backward = RouteRegistry::new();
        backward.set_route("/api/v2/*rest", "/*rest", &RR).unwrap();
        backward.set_route("/api/*rest", "/*rest", &RR).unwrap();

        for registry in [&forward, &backward] {
            assert_eq!(registry.match_route("/api/v2/users").unwrap().key(), "/api/v2");
            assert_eq!(registry.match_route("/api/v1/users").unwrap().key(), "/api");
        }
    }

    #[test]
    fn test_no_route_matched() {
        let registry = RouteRegistry::new();
        registry.set_route("/api/*rest", "/*rest", &RR).unwrap();
        assert_eq!(
            registry.match_route("/images/a.png").unwrap_err(),
            RouterError::NoRouteMatched { path: "/images/a.png".into() }
        );
    }

    #[test]
    fn test_add_host_errors() {
        let registry = RouteRegistry::new();
        assert_eq!(
            registry.add_host("/missing", "127.0.0.1:9000").unwrap_err(),
            RouterError::RouteNotFound { key: "/missing".into() }
        );

        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        assert!(matches!(
            registry.add_host("/svc", "").unwrap_err(),
            RouterError::InvalidArgument(_)
        ));
        assert!(matches!(
            registry.add_host("", "127.0.0.1:9000").unwrap_err(),
            RouterError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_add_host_by_pattern_or_key() {
        let registry = RouteRegistry::new();
        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        registry.add_host("/svc/:id", "10.0.0.1:80").unwrap();
        registry.add_host("/svc", "10.0.0.2:80").unwrap();

        let route = registry.get("/svc").unwrap();
        let addrs: Vec<&str> = route.hosts().iter().map(|h| h.address()).collect();
        assert_eq!(addrs, vec!["10.0.0.1:80", "10.0.0.2:80"]);
        assert!(route.hosts().iter().all(|h| h.is_enabled()));
    }

    #[test]
    fn test_reregister_preserves_hosts() {
        let registry = RouteRegistry::new();
        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        registry.add_host("/svc", "10.0.0.1:80").unwrap();
        registry.add_host("/svc", "10.0.0.2:80").unwrap();

        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        assert_eq!(registry.get("/svc").unwrap().hosts().len(), 2);

        registry
            .set_route("/svc/:id/x", "/v3/:id", &BalancerKind::LeastConnections)
            .unwrap();
        let route = registry.get("/svc").unwrap();
        assert_eq!(route.hosts().len(), 2);
        assert_eq!(route.output().pattern(), "/v3/:id");
        assert_eq!(route.balancer().name(), "least_connections");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_route() {
        let registry = RouteRegistry::new();
        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        registry.remove_route("/svc").unwrap();
        assert!(registry.is_empty());
        assert_eq!(
            registry.remove_route("/svc").unwrap_err(),
            RouterError::RouteNotFound { key: "/svc".into() }
        );
    }

    #[test]
    fn test_set_route_rejects_bad_patterns() {
        let registry = RouteRegistry::new();
        assert!(matches!(
            registry.set_route("", "/x", &RR).unwrap_err(),
            RouterError::InvalidPattern { .. }
        ));
        assert!(matches!(
            registry.set_route("/svc/:id", "/:other", &RR).unwrap_err(),
            RouterError::InvalidPattern { .. }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_add() {
        let registry = RouteRegistry::new();
        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        registry.add_host("/svc", "10.0.0.1:80").unwrap();

        let snapshot = registry.match_route("/svc/1").unwrap();
        registry.add_host("/svc", "10.0.0.2:80").unwrap();

        assert_eq!(snapshot.hosts().len(), 1);
        assert_eq!(registry.match_route("/svc/1").unwrap().hosts().len(), 2);
    }

    #[test]
    fn test_set_host_enabled() {
        let registry = RouteRegistry::new();
        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        registry.add_host("/svc", "10.0.0.1:80").unwrap();
        let snapshot = registry.get("/svc").unwrap();

        registry.set_host_enabled("/svc", "10.0.0.1:80", false).unwrap();
        assert!(!snapshot.hosts()[0].is_enabled());

        assert_eq!(
            registry.set_host_enabled("/nope", "10.0.0.1:80", false).unwrap_err(),
            RouterError::RouteNotFound { key: "/nope".into() }
        );
    }

    #[test]
    fn test_set_host_enabled_unknown_address() {
        let registry = RouteRegistry::new();
        registry.set_route("/svc/:id", "/:id", &RR).unwrap();
        registry.add_host("/svc", "10.0.0.1:80").unwrap();

        let err = registry.set_host_enabled("/svc", "10.0.0.9:80", false).unwrap_err();
        assert_eq!(
            err,
            RouterError::InvalidArgument("host 10.0.0.9:80 not in route /svc".into())
        );
        assert!(registry.get("/svc").unwrap().hosts()[0].is_enabled());
    }
}
