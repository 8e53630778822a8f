use std::{sync::Arc, time::Duration};

use murmur_config::TtsConfig;

use crate::{
    engine::piper::PiperEngine,
    provider::{TtsProvider, model::ModelProvider, silence::SilenceProvider},
    store::ArtifactStore,
    types::{HealthResponse, ProviderKind, VoicesResponse},
};

/// Shared state behind the speech endpoints
///
/// Holds the provider chosen at startup and the store it writes into.
pub struct TtsState {
    provider: Box<dyn TtsProvider>,
    store: Arc<ArtifactStore>,
    supported_languages: Vec<String>,
}

impl TtsState {
    pub fn new(provider: Box<dyn TtsProvider>, store: Arc<ArtifactStore>, supported_languages: Vec<String>) -> Self {
        Self {
            provider,
            store,
            supported_languages,
        }
    }

    pub fn provider(&self) -> &dyn TtsProvider {
        self.provider.as_ref()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Whether a speech model loaded at startup
    pub fn model_loaded(&self) -> bool {
        self.provider.kind() == ProviderKind::Model
    }

    pub fn health(&self) -> HealthResponse {
        let mode = if self.model_loaded() { "real" } else { "mock" };

        HealthResponse {
            status: "healthy".to_string(),
            model_loaded: self.model_loaded(),
            cuda_available: false,
            version: format!("{}-{mode}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn voices(&self) -> VoicesResponse {
        VoicesResponse {
            model: self.provider.name().to_string(),
            loaded: self.model_loaded(),
            supported_languages: self.supported_languages.clone(),
        }
    }
}

/// Builder for constructing the speech state from configuration
pub struct TtsStateBuilder<'a> {
    config: &'a TtsConfig,
}

impl<'a> TtsStateBuilder<'a> {
    pub const fn new(config: &'a TtsConfig) -> Self {
        Self { config }
    }

    pub async fn build(self) -> anyhow::Result<TtsState> {
        let store = Arc::new(
            ArtifactStore::from_config(&self.config.artifacts)
                .map_err(|e| anyhow::anyhow!("failed to prepare artifact directory: {e}"))?,
        );

        tracing::debug!("Artifact directory: {}", store.root().display());

        let provider: Box<dyn TtsProvider> = match self.load_model(&store).await? {
            Some(provider) => Box::new(provider),
            None => Box::new(SilenceProvider::new(Arc::clone(&store))),
        };

        Ok(TtsState::new(
            provider,
            store,
            self.config.supported_languages.clone(),
        ))
    }

    /// Load the configured model chain, `None` when no model is configured or none loads
    pub async fn load_model(&self, store: &Arc<ArtifactStore>) -> anyhow::Result<Option<ModelProvider>> {
        let Some(ref model_config) = self.config.model else {
            tracing::info!("No speech model configured, serving silence");
            return Ok(None);
        };

        let timeout = model_config.timeout.as_deref().map(parse_timeout).transpose()?;

        let Some(engine) = PiperEngine::load_first(model_config).await else {
            return Ok(None);
        };

        Ok(Some(
            ModelProvider::new(Box::new(engine), Arc::clone(store)).with_timeout(timeout),
        ))
    }
}

fn parse_timeout(raw: &str) -> anyhow::Result<Duration> {
    duration_str::parse(raw).map_err(|e| anyhow::anyhow!("invalid synthesis timeout '{raw}': {e}"))
}
