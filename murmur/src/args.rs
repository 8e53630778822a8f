use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Text-to-speech HTTP server with a silent fallback
#[derive(Debug, Parser)]
#[command(name = "murmur", version, about = "Text-to-speech over HTTP with a silent fallback")]
pub struct Args {
    /// Path to configuration file, defaults apply when omitted
    #[arg(short, long, global = true, env = "MURMUR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override the listen address
        #[arg(long, env = "MURMUR_LISTEN")]
        listen: Option<std::net::SocketAddr>,
    },
    /// Load the configured model and synthesize one sentence without fallback
    Check {
        /// Sentence to synthesize
        #[arg(long, default_value = "Hello, this is a test of the speech engine.")]
        text: String,
    },
}
