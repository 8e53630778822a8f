#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::sync::Arc;

use args::{Args, Command};
use clap::Parser;
use murmur_config::Config;
use murmur_server::Server;
use tokio_util::sync::CancellationToken;
use tts::{SynthesisRequest, TtsStateBuilder, store::ArtifactStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize logging
    murmur_telemetry::init(&config.logging)?;

    if let Some(ref path) = args.config {
        tracing::info!(config_path = %path.display(), "configuration loaded");
    }

    match args.command {
        Some(Command::Check { text }) => check(&config, &text).await,
        Some(Command::Serve { listen }) => {
            if let Some(listen) = listen {
                config.server.listen_address = listen;
            }
            serve(&config).await
        }
        None => serve(&config).await,
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!("starting murmur");

    let server = Server::new(config).await?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("murmur stopped");
    Ok(())
}

/// Synthesize one sentence with the configured model, never falling back
async fn check(config: &Config, text: &str) -> anyhow::Result<()> {
    let store = Arc::new(ArtifactStore::from_config(&config.tts.artifacts)?);

    let Some(provider) = TtsStateBuilder::new(&config.tts).load_model(&store).await? else {
        anyhow::bail!("no speech model could be loaded, check [tts.model] in the configuration");
    };

    let request = SynthesisRequest::new(text.trim());
    if request.text.is_empty() {
        anyhow::bail!("check text must not be empty");
    }

    let artifact = provider
        .render(&request)
        .await
        .map_err(|e| anyhow::anyhow!("speech engine test failed: {e}"))?;
    let path = artifact.path;

    let size = artifact.file.metadata()?.len();
    let summary = tts::wav::inspect(&path).map_err(|e| anyhow::anyhow!("engine wrote an unreadable WAV: {e}"))?;

    println!("audio generated: {}", path.display());
    println!("  size:        {size} bytes");
    println!(
        "  format:      {} Hz, {} channel(s), {}-bit",
        summary.sample_rate, summary.channels, summary.bits_per_sample
    );
    println!("  duration:    {:.2}s", summary.duration().as_secs_f64());

    if config.tts.artifacts.directory.is_none() {
        println!("  (temporary directory, removed on exit)");
    }

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
