//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Serve the proxy and (optionally) the admin API
//! - Apply configuration reloads to the live registry

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::ProxyConfig;
use crate::dispatch::{Dispatcher, Forwarder};
use crate::error::Result;
use crate::http::forward::HttpForwarder;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::signalled;
use crate::lifecycle::startup::{apply_routes, build_registry};
use crate::routing::RouteRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: Arc<RouteRegistry>,
}

impl HttpServer {
    /// Create a server with routes from the configuration and the HTTP forwarder.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let registry = Arc::new(build_registry(&config.routes)?);
        let forwarder = HttpForwarder::new(&config.timeouts, config.passive_health.clone());
        Ok(Self::with_parts(config, registry, Arc::new(forwarder)))
    }

    /// Create a server over an existing registry and forwarding engine.
    pub fn with_parts(
        config: ProxyConfig,
        registry: Arc<RouteRegistry>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(registry.clone(), forwarder)),
        };
        let router = Self::build_router(state);
        Self {
            router,
            config,
            registry,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The live route registry.
    pub fn registry(&self) -> Arc<RouteRegistry> {
        self.registry.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run until shutdown, accepting proxy traffic on `listener`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.registry.len(), "HTTP server starting");

        let reload_registry = self.registry.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => {
                            if let Err(e) = apply_routes(&reload_registry, &config.routes) {
                                tracing::error!(error = %e, "Failed to apply reloaded routes");
                            }
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            let admin_state = AdminState {
                registry: self.registry.clone(),
                api_key: Arc::from(self.config.admin.api_key.as_str()),
            };
            let admin_app = setup_admin_router(admin_state);
            let admin_shutdown = shutdown.resubscribe();
            tracing::info!(address = %admin_listener.local_addr()?, "Admin API starting");
            tokio::spawn(async move {
                if let Err(e) = axum::serve(admin_listener, admin_app)
                    .with_graceful_shutdown(signalled(admin_shutdown))
                    .await
                {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            });
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the dispatcher.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    state.dispatcher.dispatch(request, Some(addr)).await
}
