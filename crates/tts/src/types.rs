use std::{fmt, fs::File, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TtsError;

/// Language used when the request does not name one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Speed used when the request does not name one
pub const DEFAULT_SPEED: f64 = 1.0;

/// Raw `POST /api/tts` body before validation
#[derive(Debug, Default, Deserialize)]
pub struct SpeechPayload {
    /// Text to synthesize into speech
    #[serde(default)]
    pub text: Option<String>,
    /// Language tag, passed through to the provider
    #[serde(default)]
    pub language: Option<String>,
    /// Speech speed multiplier, number or numeric string
    #[serde(default)]
    pub speed: Option<SpeedValue>,
}

/// Speed as sent by clients, some of which send it as a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SpeedValue {
    Number(f64),
    Text(String),
}

impl SpeedValue {
    fn resolve(self) -> crate::error::Result<f64> {
        let speed = match self {
            Self::Number(value) => value,
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| TtsError::InvalidRequest(format!("Invalid speed: '{text}' is not a number")))?,
        };

        if !speed.is_finite() || speed <= 0.0 {
            return Err(TtsError::InvalidRequest(format!(
                "Invalid speed: {speed}, must be a positive number"
            )));
        }

        Ok(speed)
    }
}

impl SpeechPayload {
    /// Validate the payload into a synthesis request
    pub fn into_request(self) -> crate::error::Result<SynthesisRequest> {
        let text = self.text.ok_or(TtsError::MissingText)?;
        let text = text.trim();

        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let speed = self.speed.map_or(Ok(DEFAULT_SPEED), SpeedValue::resolve)?;

        Ok(SynthesisRequest {
            text: text.to_string(),
            language: self.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            speed,
        })
    }
}

/// Validated synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Trimmed, non-empty text
    pub text: String,
    pub language: String,
    /// Finite, strictly positive
    pub speed: f64,
}

impl SynthesisRequest {
    /// Build a request with the default language and speed
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            speed: DEFAULT_SPEED,
        }
    }

    #[must_use]
    pub const fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// First 50 characters of the text, for logs
    pub fn preview(&self) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(50).collect();

        if chars.next().is_some() { format!("{head}...") } else { head }
    }
}

/// Which provider variant produced an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// A loaded speech model
    Model,
    /// The silent fallback
    Silence,
}

impl ProviderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Silence => "silence",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A WAV file produced by a provider
#[derive(Debug)]
pub struct SynthesisResult {
    /// Location inside the artifact store
    pub path: PathBuf,
    /// Handle opened at commit time; stays readable if the file is evicted
    pub audio: File,
    /// Provider that wrote the file
    pub provider: ProviderKind,
    /// Set when the model failed and silence was substituted
    pub fallback: bool,
}

/// `GET /health` body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub cuda_available: bool,
    pub version: String,
}

/// `GET /api/voices` body
#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub model: String,
    pub loaded: bool,
    pub supported_languages: Vec<String>,
}
