use std::{
    io::{self, BufWriter},
    sync::Arc,
};

use async_trait::async_trait;

use crate::{
    error::TtsError,
    store::ArtifactStore,
    types::{ProviderKind, SynthesisRequest, SynthesisResult},
    wav,
};

use super::TtsProvider;

/// Fallback provider writing one second of silence
///
/// Speed is ignored. Failures here have nowhere left to fall back to and are
/// returned to the caller.
pub struct SilenceProvider {
    store: Arc<ArtifactStore>,
}

impl SilenceProvider {
    pub const fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TtsProvider for SilenceProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> crate::error::Result<SynthesisResult> {
        let store = Arc::clone(&self.store);
        let name = ArtifactStore::artifact_name(ProviderKind::Silence, request);
        let target = self.store.root().join(&name);

        let artifact = tokio::task::spawn_blocking(move || {
            let mut staged = store.stage()?;
            wav::write_silence(BufWriter::new(staged.as_file_mut())).map_err(io::Error::other)?;
            store.commit(staged, &name)
        })
        .await
        .map_err(|e| TtsError::Synthesis(format!("silence generation task failed: {e}")))?
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TtsError::OutputMissing(target),
            _ => TtsError::Io(e),
        })?;

        tracing::info!("Silent audio generated: {}", artifact.path.display());

        Ok(SynthesisResult {
            path: artifact.path,
            audio: artifact.file,
            provider: ProviderKind::Silence,
            fallback: false,
        })
    }

    fn name(&self) -> &str {
        "silence"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Silence
    }
}
