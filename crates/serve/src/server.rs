//! HTTP server for the agency directory

use crate::api::create_routes;
use crate::handlers::AppState;
use crate::ServerConfig;
use agency_core::{DirectoryError, ListingService, Result};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Agency directory HTTP server
pub struct AgencyServer {
    config: ServerConfig,
    app: Router,
}

impl AgencyServer {
    /// Create a new server instance around a listing service
    pub fn new(config: ServerConfig, listing: Arc<ListingService>) -> Self {
        let app = create_app(&config, AppState::new(listing));
        Self { config, app }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| DirectoryError::validation(format!("Invalid address {}: {}", addr, e)))?;

        tracing::info!("Starting agency directory server on {}", addr);

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .map_err(|e| DirectoryError::network(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, self.app)
            .await
            .map_err(|e| DirectoryError::network(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The assembled router, with middleware
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Create the Axum application with middleware
pub fn create_app(config: &ServerConfig, state: AppState) -> Router {
    let mut app = create_routes().with_state(state);

    app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.max_request_size)),
    );

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers([ACCEPT, CONTENT_TYPE]);

        app = app.layer(cors);
    }

    app
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn with_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    /// Set maximum request size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.max_request_size = size;
        self
    }

    /// Build the server
    pub fn build(self, listing: Arc<ListingService>) -> AgencyServer {
        AgencyServer::new(self.config, listing)
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_core::{InMemoryStore, ManualClock};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn listing() -> Arc<ListingService> {
        Arc::new(ListingService::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(ManualClock::default()),
            10,
        ))
    }

    #[test]
    fn test_server_builder() {
        let builder = ServerBuilder::new()
            .host("0.0.0.0")
            .port(8080)
            .cors(false)
            .max_request_size(5 * 1024 * 1024);

        assert_eq!(builder.config.host, "0.0.0.0");
        assert_eq!(builder.config.port, 8080);
        assert!(!builder.config.cors_enabled);
        assert_eq!(builder.config.max_request_size, 5 * 1024 * 1024);

        let server = builder.build(listing());
        assert_eq!(server.config().port, 8080);
    }

    #[tokio::test]
    async fn test_cors_header_on_get() {
        let server = ServerBuilder::new().build(listing());
        let test = TestServer::new(server.router()).unwrap();

        let response = test
            .get("/agencies")
            .add_header(
                axum::http::header::ORIGIN,
                axum::http::HeaderValue::from_static("https://example.com"),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.header("access-control-allow-origin"),
            axum::http::HeaderValue::from_static("*")
        );
    }

    #[tokio::test]
    async fn test_start_rejects_bad_address() {
        let server = ServerBuilder::new().host("not an address").build(listing());
        assert!(server.start().await.is_err());
    }
}
