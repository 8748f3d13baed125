//! Backend host abstraction.
//!
//! # Responsibilities
//! - Represent a single backend address in a route's pool
//! - Track whether the host may currently be selected
//! - Track in-flight forwards (for Least Connections)
//! - Count consecutive upstream failures for passive disabling

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A single backend host.
///
/// State is atomic so route snapshots taken before and after a pool
/// mutation observe the same flags and counters.
#[derive(Debug)]
pub struct Host {
    address: String,
    enabled: AtomicBool,
    active_connections: AtomicUsize,
    consecutive_failures: AtomicUsize,
}

impl Host {
    /// Create a new, enabled host.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            enabled: AtomicBool::new(true),
            active_connections: AtomicUsize::new(0),
            consecutive_failures: AtomicUsize::new(0),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Return true if the host may be selected.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enable or disable the host. Re-enabling clears the failure streak.
    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.consecutive_failures.store(0, Ordering::Relaxed);
        }
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Get the current number of in-flight forwards.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Create a guard counting one in-flight forward until dropped.
    pub fn connection_guard(self: &Arc<Self>) -> HostConnectionGuard {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        HostConnectionGuard { host: self.clone() }
    }

    /// Report a successful forward.
    pub fn mark_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    /// Report a failed forward.
    ///
    /// Returns true if this failure disabled the host.
    pub fn mark_failure(&self, failure_threshold: usize) -> bool {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= failure_threshold {
            return self.enabled.swap(false, Ordering::AcqRel);
        }
        false
    }
}

/// A RAII guard that manages the in-flight forward count.
#[derive(Debug)]
pub struct HostConnectionGuard {
    host: Arc<Host>,
}

impl Deref for HostConnectionGuard {
    type Target = Host;
    fn deref(&self) -> &Self::Target {
        &self.host
    }
}

impl Drop for HostConnectionGuard {
    fn drop(&mut self) {
        self.host.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
