#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod logging;
pub mod server;
pub mod tts;

use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use logging::*;
pub use server::*;
pub use tts::*;

/// Top-level murmur configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech synthesis configuration
    #[serde(default)]
    pub tts: TtsConfig,
    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
