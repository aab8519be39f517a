//! Collector server
//!
//! Wraps the router from [`api`](super::api) with CORS and request tracing
//! and runs it until the shutdown signal fires.

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{Error, Result};

use super::api::{create_router, ApiState};
use super::config::CollectorConfig;

pub struct CollectorServer {
    config: CollectorConfig,
    state: ApiState,
}

impl CollectorServer {
    pub fn new(config: CollectorConfig) -> Self {
        let state = ApiState::new(config.data_dir.clone(), config.capacity);
        Self { config, state }
    }

    pub fn state(&self) -> &ApiState {
        &self.state
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Serve until `shutdown_signal` completes
    ///
    /// Fails before binding if the graph artifacts are missing.
    pub async fn start_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.config.check_preconditions()?;
        let addr = self.config.socket_addr()?;

        let mut app = create_router(self.state, self.config.static_dir.as_deref());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        if self.config.enable_tracing {
            app = app.layer(TraceLayer::new_for_http());
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind: {}", e)))?;

        info!(
            %addr,
            data_dir = %self.config.data_dir.display(),
            capacity = self.config.capacity,
            "Collector listening on http://{}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

        info!("Collector shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = CollectorConfig {
            port: 0,
            ..CollectorConfig::default()
        }
        .with_data_dir(dir.path());

        let err = CollectorServer::new(config)
            .start_with_shutdown(async {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("objects.json"), r#"{"nodes":[],"edges":[]}"#).unwrap();
        std::fs::write(dir.path().join("mapping.json"), "{}").unwrap();

        let config = CollectorConfig {
            host: "127.0.0.1".into(),
            port: 0,
            static_dir: None,
            ..CollectorConfig::default()
        }
        .with_data_dir(dir.path());

        // resolves immediately, so the server stops right after binding
        CollectorServer::new(config)
            .start_with_shutdown(async {})
            .await
            .unwrap();
    }
}
