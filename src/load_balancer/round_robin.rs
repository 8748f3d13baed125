//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::load_balancer::{no_available_host, Host, LoadBalancer, SelectContext};
use crate::routing::Route;

/// Round-robin selector.
/// Stores a cursor pointing just past the last selected host.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn select(&self, route: &Route, _ctx: &SelectContext<'_>) -> Result<Arc<Host>> {
        let hosts = route.hosts();
        let len = hosts.len();
        if len == 0 {
            return Err(no_available_host(route));
        }

        let mut cursor = self.cursor.load(Ordering::Relaxed);
        loop {
            // The pool may have changed size since the cursor was stored.
            let start = if cursor >= len { 0 } else { cursor };
            let index = (0..len)
                .map(|i| (start + i) % len)
                .find(|&i| hosts[i].is_enabled())
                .ok_or_else(|| no_available_host(route))?;

            match self.cursor.compare_exchange_weak(
                cursor,
                index + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(hosts[index].clone()),
                Err(actual) => cursor = actual,
            }
        }
    }
}
