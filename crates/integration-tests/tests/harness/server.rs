//! Test server wrapper that starts murmur on a random port

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use murmur_config::Config;
use murmur_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    artifacts: PathBuf,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(&config).await?;
        let artifacts = server.tts().store().root().to_path_buf();
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            addr,
            artifacts,
            shutdown,
            client,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Directory the server writes artifacts to
    pub fn artifact_root(&self) -> &Path {
        &self.artifacts
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send `{"text": ...}` plus extra fields to the synthesis endpoint
    pub async fn synthesize(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/tts"))
            .json(&body)
            .send()
            .await
            .expect("request must reach the test server")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
