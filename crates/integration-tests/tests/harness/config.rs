//! Programmatic configuration builder for integration tests

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use murmur_config::{ArtifactConfig, Config, CorsConfig, ModelConfig, ServerConfig, TtsConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults and no model
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: SocketAddr::from(([127, 0, 0, 1], 0)),
                    ..ServerConfig::default()
                },
                tts: TtsConfig::default(),
                ..Config::default()
            },
        }
    }

    /// Point the model chain at an engine binary and voice files
    pub fn with_model(mut self, binary: &Path, models: &[PathBuf]) -> Self {
        self.config.tts.model = Some(ModelConfig {
            binary: binary.to_path_buf(),
            models: models.to_vec(),
            timeout: Some("10s".to_owned()),
        });
        self
    }

    /// Keep artifacts in a fixed directory
    pub fn with_artifacts(mut self, directory: &Path, max_files: Option<usize>) -> Self {
        self.config.tts.artifacts = ArtifactConfig {
            directory: Some(directory.to_path_buf()),
            max_files,
        };
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
