pub mod model;
pub mod silence;

use async_trait::async_trait;

use crate::types::{ProviderKind, SynthesisRequest, SynthesisResult};

/// Trait for synthesis provider implementations
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Render the request into a WAV artifact
    async fn synthesize(&self, request: &SynthesisRequest) -> crate::error::Result<SynthesisResult>;

    /// Descriptor reported by the voices endpoint
    fn name(&self) -> &str;

    /// Which variant this provider is
    fn kind(&self) -> ProviderKind;
}
