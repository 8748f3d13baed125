//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route)
//!     → request.rs (assign / propagate request ID)
//!     → dispatch (route match, rewrite, host selection)
//!     → forward.rs (upstream call, streamed response)
//!     → response.rs (dispatch failures as explicit statuses)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::HttpForwarder;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
