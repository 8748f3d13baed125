//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → route snapshot (hosts + balancer)
//!     → Apply the route's own balancer instance:
//!         - round_robin.rs (rotate through enabled hosts)
//!         - random.rs (uniform pick among enabled hosts)
//!         - least_conn.rs (pick enabled host with fewest in-flight forwards)
//!     → host.rs (count in-flight forward)
//!     → Return host or NoAvailableHost
//! ```
//!
//! # Design Decisions
//! - One balancer instance per route, created by a factory at registration
//! - Balancer state is atomic; safe under concurrent `select`
//! - Disabled hosts are never selected
//! - Pool is read from the route snapshot, never indexed across snapshots

pub mod host;
pub mod least_conn;
pub mod random;
pub mod round_robin;

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::routing::Route;

pub use host::{Host, HostConnectionGuard};
pub use least_conn::LeastConnections;
pub use random::Random;
pub use round_robin::RoundRobin;

/// Per-request information available to balancers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectContext<'a> {
    pub path: &'a str,
    pub client_addr: Option<SocketAddr>,
}

/// A host selection strategy.
pub trait LoadBalancer: Send + Sync + fmt::Debug {
    /// Strategy name, as used in configuration.
    fn name(&self) -> &'static str;

    /// Select one enabled host from the route's pool.
    fn select(&self, route: &Route, ctx: &SelectContext<'_>) -> Result<Arc<Host>>;
}

/// Creates a fresh balancer instance for each registered route.
pub trait BalancerFactory: Send + Sync {
    fn create(&self) -> Arc<dyn LoadBalancer>;
}

impl<F> BalancerFactory for F
where
    F: Fn() -> Arc<dyn LoadBalancer> + Send + Sync,
{
    fn create(&self) -> Arc<dyn LoadBalancer> {
        self()
    }
}

/// Built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancerKind {
    #[default]
    RoundRobin,
    Random,
    LeastConnections,
}

impl BalancerFactory for BalancerKind {
    fn create(&self) -> Arc<dyn LoadBalancer> {
        match self {
            BalancerKind::RoundRobin => Arc::new(RoundRobin::new()),
            BalancerKind::Random => Arc::new(Random::new()),
            BalancerKind::LeastConnections => Arc::new(LeastConnections::new()),
        }
    }
}

fn no_available_host(route: &Route) -> RouterError {
    RouterError::NoAvailableHost {
        key: route.key().to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_creates_named_balancer() {
        assert_eq!(BalancerKind::RoundRobin.create().name(), "round_robin");
        assert_eq!(BalancerKind::Random.create().name(), "random");
        assert_eq!(BalancerKind::LeastConnections.create().name(), "least_connections");
    }

    #[test]
    fn test_factory_creates_fresh_instances() {
        let a = BalancerKind::RoundRobin.create();
        let b = BalancerKind::RoundRobin.create();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_closure_factory() {
        let factory = || Arc::new(Random::new()) as Arc<dyn LoadBalancer>;
        assert_eq!(factory.create().name(), "random");
    }

    #[test]
    fn test_kind_deserializes_snake_case() {
        let kind: BalancerKind = serde_json::from_str("\"least_connections\"").unwrap();
        assert_eq!(kind, BalancerKind::LeastConnections);
    }
}
