mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use whisperpod_config::Config;

/// Port the worker listens on when none is configured
pub const DEFAULT_PORT: u16 = 8000;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration, loading the engine
    ///
    /// # Errors
    ///
    /// Returns an error if the transcription engine fails to initialize
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let transcriber = stt::build_server(config)?;
        Ok(Self::with_transcriber(config, transcriber))
    }

    /// Build the server around an existing request handler
    pub fn with_transcriber(config: &Config, transcriber: Arc<stt::Server>) -> Self {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(stt::endpoint_router(&config.server.worker.path).with_state(transcriber));

        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. In-flight requests
    /// are allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn default_listen_address() {
        let server = Server::new(&Config::default()).unwrap();
        assert_eq!(server.listen_address(), SocketAddr::from(([0, 0, 0, 0], 8000)));
    }

    #[tokio::test]
    async fn health_route_follows_config() {
        let mut config = Config::default();
        config.server.health.path = "/ping".to_string();

        let response = Server::new(&config)
            .unwrap()
            .into_router()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn worker_route_follows_config() {
        let mut config = Config::default();
        config.server.worker.path = "/v2/jobs".to_string();

        let request = Request::post("/v2/jobs")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"input": {}}"#))
            .unwrap();

        let response = Server::new(&config).unwrap().into_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
