//! Path-based reverse-proxy router.
//!
//! Matches request paths against registered route templates, rewrites them
//! for a backend and picks a host with a per-route load balancer.

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use dispatch::{Dispatcher, Forwarder, Target};
pub use error::{Result, RouterError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{BalancerFactory, BalancerKind, LoadBalancer};
pub use routing::{Route, RouteRegistry};
