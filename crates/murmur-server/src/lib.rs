mod cors;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use murmur_config::Config;
use tower_http::trace::TraceLayer;
use tts::TtsState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    tts: Arc<TtsState>,
}

impl Server {
    /// Build the server from configuration
    ///
    /// Loads the speech model once; the resulting provider is shared by
    /// every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact directory cannot be prepared or the
    /// model configuration is unusable
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let tts_state = tts::build_state(&config.tts).await?;

        Ok(Self::with_state(config, tts_state))
    }

    /// Build the server around an already constructed speech state
    pub fn with_state(config: &Config, tts_state: Arc<TtsState>) -> Self {
        let mut app = tts::endpoint_router();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(tts::health));
        }

        let mut app = app.with_state(Arc::clone(&tts_state));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if config.server.cors.enabled {
            app = app.layer(cors::cors_layer(&config.server.cors));
        }

        Self {
            router: app,
            listen_address: config.server.listen_address,
            tts: tts_state,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Speech state shared with the handlers
    #[must_use]
    pub fn tts(&self) -> &TtsState {
        &self.tts
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.listen_address))?;
        let local_addr = listener.local_addr()?;

        let tts = self.tts();
        let server_type = if tts.model_loaded() { "model" } else { "silence" };
        tracing::info!(%local_addr, provider = tts.provider().name(), "{server_type} TTS server listening");
        tracing::info!("artifacts in {}", tts.store().root().display());
        tracing::info!("GET  /health     - health check");
        tracing::info!("POST /api/tts    - text-to-speech");
        tracing::info!("GET  /api/voices - active voice");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
