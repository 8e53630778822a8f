pub mod piper;

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

/// Failures of a speech engine
///
/// These never reach API consumers directly: the model provider recovers
/// from them by substituting silence.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Model could not be loaded at startup
    #[error("failed to load model {model}: {reason}")]
    Load { model: String, reason: String },

    /// Engine process could not be started
    #[error("failed to start speech engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O with the engine or its output file failed
    #[error("speech engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Engine exited unsuccessfully
    #[error("speech engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// Engine exceeded the configured time budget
    #[error("speech engine timed out after {0:?}")]
    TimedOut(Duration),

    /// Engine reported success but wrote nothing
    #[error("speech engine produced no audio")]
    NoOutput,
}

/// A loaded speech model able to render text to a WAV file
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Render `text` at `speed` into a WAV file at `output`
    ///
    /// `output` already exists and is empty; the engine overwrites it.
    async fn synthesize_to_file(&self, text: &str, speed: f64, output: &Path) -> Result<(), EngineError>;

    /// Name of the loaded voice model
    fn model_name(&self) -> &str;
}
