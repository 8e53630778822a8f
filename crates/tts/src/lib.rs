#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod engine;
mod error;
pub mod provider;
mod request;
mod server;
pub mod store;
mod types;
pub mod wav;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    response::Response,
    routing::{get, post},
};
use murmur_config::TtsConfig;
use tokio_util::io::ReaderStream;

pub use error::{Result, TtsError};
pub use server::{TtsState, TtsStateBuilder};
pub use types::{
    DEFAULT_LANGUAGE, DEFAULT_SPEED, HealthResponse, ProviderKind, SpeechPayload, SpeedValue, SynthesisRequest,
    SynthesisResult, VoicesResponse,
};
use request::ExtractPayload;

/// Header naming the provider that produced the audio
pub const PROVIDER_HEADER: &str = "x-synthesis-provider";

/// Header set to `true` when the model failed and silence was substituted
pub const FALLBACK_HEADER: &str = "x-synthesis-fallback";

/// Build the speech state from configuration, loading the model once
pub async fn build_state(config: &TtsConfig) -> anyhow::Result<Arc<TtsState>> {
    let state = TtsStateBuilder::new(config)
        .build()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize TTS: {e}"))?;

    Ok(Arc::new(state))
}

/// Create the endpoint router for speech synthesis and voice listing
pub fn endpoint_router() -> Router<Arc<TtsState>> {
    Router::new()
        .route("/api/tts", post(synthesize))
        .route("/api/voices", get(voices))
}

/// Report model status
pub async fn health(State(state): State<Arc<TtsState>>) -> Json<HealthResponse> {
    Json(state.health())
}

async fn voices(State(state): State<Arc<TtsState>>) -> Json<VoicesResponse> {
    Json(state.voices())
}

/// Handle speech synthesis requests
async fn synthesize(
    State(state): State<Arc<TtsState>>,
    ExtractPayload(payload): ExtractPayload<Option<SpeechPayload>>,
) -> Result<Response> {
    let request = payload.ok_or(TtsError::MissingText)?.into_request()?;

    tracing::info!(
        "TTS request: {} (lang: {}, speed: {})",
        request.preview(),
        request.language,
        request.speed
    );

    let SynthesisResult {
        path,
        audio,
        provider,
        fallback,
    } = state.provider().synthesize(&request).await?;

    let file = tokio::fs::File::from_std(audio);
    let length = file.metadata().await?.len();

    tracing::debug!("Streaming {length} bytes from {}", path.display());

    audio_response(provider, fallback, length, Body::from_stream(ReaderStream::new(file)))
}

fn audio_response(provider: ProviderKind, fallback: bool, length: u64, body: Body) -> Result<Response> {
    Response::builder()
        .header(http::header::CONTENT_TYPE, "audio/wav")
        .header(http::header::CONTENT_LENGTH, length)
        .header(http::header::CONTENT_DISPOSITION, "inline; filename=\"speech.wav\"")
        .header(PROVIDER_HEADER, provider.as_str())
        .header(FALLBACK_HEADER, if fallback { "true" } else { "false" })
        .body(body)
        .map_err(|e| TtsError::Synthesis(format!("failed to build audio response: {e}")))
}
