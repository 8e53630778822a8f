use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use murmur_config::ModelConfig;
use tokio::{
    io::AsyncWriteExt,
    process::{ChildStdin, Command},
};

use super::{EngineError, SpeechEngine};

/// How long the `--version` probe may take during loading
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest stderr excerpt carried in an error
const STDERR_EXCERPT: usize = 512;

/// Piper neural TTS driven as a subprocess
///
/// Each synthesis spawns `piper --model <voice> --output_file <path>` and
/// feeds the text on stdin.
#[derive(Debug, Clone)]
pub struct PiperEngine {
    binary: PathBuf,
    model: PathBuf,
    name: String,
}

impl PiperEngine {
    /// Load a voice model, checking that the file exists and the binary runs
    pub async fn load(binary: &Path, model: &Path) -> Result<Self, EngineError> {
        let load_error = |reason: String| EngineError::Load {
            model: model.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(model)
            .await
            .map_err(|e| load_error(format!("model file unavailable: {e}")))?;

        if !metadata.is_file() {
            return Err(load_error("model path is not a file".to_string()));
        }

        let probe = Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        let status = tokio::time::timeout(PROBE_TIMEOUT, probe)
            .await
            .map_err(|_| load_error(format!("{} did not answer --version", binary.display())))?
            .map_err(|e| load_error(format!("cannot run {}: {e}", binary.display())))?;

        if !status.success() {
            return Err(load_error(format!("{} --version exited with {status}", binary.display())));
        }

        let name = model
            .file_stem()
            .map_or_else(|| model.display().to_string(), |stem| stem.to_string_lossy().into_owned());

        Ok(Self {
            binary: binary.to_path_buf(),
            model: model.to_path_buf(),
            name,
        })
    }

    /// Try each configured model in order and keep the first that loads
    pub async fn load_first(config: &ModelConfig) -> Option<Self> {
        for model in &config.models {
            tracing::info!("Loading speech model {}", model.display());

            match Self::load(&config.binary, model).await {
                Ok(engine) => {
                    tracing::info!("Speech model {} loaded", engine.name);
                    return Some(engine);
                }
                Err(e) => tracing::error!("{e}"),
            }
        }

        tracing::warn!("No speech model could be loaded, serving silence");

        None
    }
}

async fn feed(stdin: &mut ChildStdin, text: &str) -> std::io::Result<()> {
    stdin.write_all(text.as_bytes()).await?;
    stdin.write_all(b"\n").await
}

/// Piper expresses tempo as phoneme length, the inverse of speed
fn length_scale(speed: f64) -> f64 {
    1.0 / speed
}

fn excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();

    match text.char_indices().rev().nth(STDERR_EXCERPT - 1) {
        Some((start, _)) => text[start..].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl SpeechEngine for PiperEngine {
    async fn synthesize_to_file(&self, text: &str, speed: f64, output: &Path) -> Result<(), EngineError> {
        tracing::debug!(
            "Piper request: model={}, speed={speed}, input_len={}",
            self.name,
            text.len()
        );

        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output)
            .arg("--length_scale")
            .arg(length_scale(speed).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            match feed(&mut stdin, text).await {
                Ok(()) => {}
                // Exit status and stderr below carry the cause
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("Piper closed stdin before reading the text");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let result = child.wait_with_output().await?;

        if !result.status.success() {
            return Err(EngineError::Failed {
                status: result.status.to_string(),
                stderr: excerpt(&result.stderr),
            });
        }

        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
