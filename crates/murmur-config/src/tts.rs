use std::path::PathBuf;

use serde::Deserialize;

/// Top-level speech synthesis configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Language tags reported by the voices endpoint
    #[serde(default = "default_languages")]
    pub supported_languages: Vec<String>,
    /// Speech model to load at startup, silence-only when absent
    #[serde(default)]
    pub model: Option<ModelConfig>,
    /// Scratch directory holding generated audio
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            supported_languages: default_languages(),
            model: None,
            artifacts: ArtifactConfig::default(),
        }
    }
}

/// Speech engine and the voice models it may load
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Engine executable, resolved through `PATH` when not absolute
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Voice model files in order of preference
    ///
    /// The first one that loads becomes the active model.
    pub models: Vec<PathBuf>,
    /// Upper bound on a single synthesis call (e.g. "30s", "2m")
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Artifact store configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactConfig {
    /// Fixed directory for artifacts
    ///
    /// When unset a temporary directory is created at startup and removed on
    /// shutdown.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Maximum number of artifacts kept, oldest are removed first
    #[serde(default)]
    pub max_files: Option<usize>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_binary() -> PathBuf {
    PathBuf::from("piper")
}
