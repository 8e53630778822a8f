use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    engine::{EngineError, SpeechEngine},
    error::TtsError,
    store::{Artifact, ArtifactStore},
    types::{ProviderKind, SynthesisRequest, SynthesisResult},
};

use super::{TtsProvider, silence::SilenceProvider};

/// Provider backed by a loaded speech model
///
/// Engine failures are logged and answered with silence instead of an error,
/// with the result marked as a fallback.
pub struct ModelProvider {
    engine: Box<dyn SpeechEngine>,
    store: Arc<ArtifactStore>,
    fallback: SilenceProvider,
    timeout: Option<Duration>,
}

impl ModelProvider {
    pub fn new(engine: Box<dyn SpeechEngine>, store: Arc<ArtifactStore>) -> Self {
        Self {
            engine,
            fallback: SilenceProvider::new(Arc::clone(&store)),
            store,
            timeout: None,
        }
    }

    /// Bound every engine call by `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render with the engine only, surfacing its failure instead of falling back
    pub async fn render(&self, request: &SynthesisRequest) -> Result<Artifact, EngineError> {
        let staged = self.store.stage()?;

        let call = self
            .engine
            .synthesize_to_file(&request.text, request.speed, staged.path());

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| EngineError::TimedOut(limit))??,
            None => call.await?,
        }

        if tokio::fs::metadata(staged.path()).await?.len() == 0 {
            return Err(EngineError::NoOutput);
        }

        let store = Arc::clone(&self.store);
        let name = ArtifactStore::artifact_name(ProviderKind::Model, request);

        let artifact = tokio::task::spawn_blocking(move || store.commit(staged, &name))
            .await
            .map_err(std::io::Error::other)??;

        Ok(artifact)
    }
}

#[async_trait]
impl TtsProvider for ModelProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> crate::error::Result<SynthesisResult> {
        match self.render(request).await {
            Ok(artifact) => {
                tracing::info!(
                    "Speech generated with {}: {}",
                    self.engine.model_name(),
                    artifact.path.display()
                );

                Ok(SynthesisResult {
                    path: artifact.path,
                    audio: artifact.file,
                    provider: ProviderKind::Model,
                    fallback: false,
                })
            }
            Err(e) => {
                tracing::warn!("Model synthesis failed, falling back to silence: {e}");

                let result = self.fallback.synthesize(request).await.map_err(|fallback_error| {
                    TtsError::Synthesis(format!("{e}; silence fallback also failed: {fallback_error}"))
                })?;

                Ok(SynthesisResult {
                    fallback: true,
                    ..result
                })
            }
        }
    }

    fn name(&self) -> &str {
        self.engine.model_name()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Model
    }
}
