//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (registry lookup under shared lock)
//!     → matcher.rs (longest key prefix)
//!     → Return: Route snapshot or NoRouteMatched
//!     → route.rs (extract params via input template, build backend path)
//!
//! Route registration (admin / config):
//!     input pattern + output pattern + balancer factory
//!     → template.rs (derive key, compile templates)
//!     → router.rs (insert / replace under exclusive lock)
//! ```
//!
//! # Design Decisions
//! - Routes are mutable at runtime through the registry only
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Longest key prefix wins

pub mod matcher;
pub mod route;
pub mod router;
pub mod template;

pub use route::Route;
pub use router::RouteRegistry;
pub use template::{route_key, split_path, InputTemplate, OutputTemplate, Params, Segment};
