use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use iapi::config::Settings;
use iapi::nlp::NlpService;
use iapi::server::ApiServer;

/// Command line overrides for the configured server address
#[derive(Parser)]
#[command(name = "iapi", version, about = "Local NLP API server")]
struct Cli {
    /// Host address to bind, overriding the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overriding the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Skip eager model loading at startup; models load on first request
    #[arg(long)]
    no_preload: bool,
}

/// Main entry point for the iapi application
///
/// Loads settings, initializes file logging, optionally pre-loads the NLP
/// models and starts the HTTP server.
///
/// # Errors
/// Returns an error if configuration is invalid or the server fails to bind
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load settings first
    let settings = Settings::new()?;

    // Initialize the subscriber first, before any file operations
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        // Use log file path from settings, or default to "logs"
        settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs")),
        "iapi",
    );

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_env_filter(EnvFilter::new(settings.logging.level.clone()))
        .init();

    info!("iapi starting up...");

    let log_path = settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs"));
    std::fs::create_dir_all(log_path)?;
    let full_log_path = std::fs::canonicalize(log_path)?;
    info!("Log directory: {}", full_log_path.display());

    // Models directory location
    let models_path = std::fs::canonicalize(&settings.models.directory)?;
    info!("Models directory: {}", models_path.display());

    info!("Settings loaded");

    let host = cli.host.unwrap_or_else(|| settings.server.host.clone());
    let port = cli.port.unwrap_or(settings.server.port);

    // Create the NLP service holding the model cache
    let service = Arc::new(NlpService::new(settings));

    // Warm the model cache so the first request does not pay the load;
    // failures fall back to lazy per-request loading
    if cli.no_preload {
        info!("Skipping model pre-load (--no-preload)");
    } else {
        let warmup = Arc::clone(&service);
        tokio::task::spawn_blocking(move || warmup.preload()).await?;
    }

    // Create and start the server
    let server = ApiServer::new(service, host, port);
    server.start().await?;

    Ok(())
}
