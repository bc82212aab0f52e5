use anyhow::Context;
use clap::Parser;
use mentoria_core::GeminiClient;
use mentoria_server::config::AppConfig;
use mentoria_server::http_server::{self, AppState};
use mentoria_tutor::{InMemoryChatSessionStore, TutorService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mentoria-daemon", about = "MentorIA AI tutor HTTP daemon")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini API key
    #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model to use
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Base URL of the Gemini REST API
    #[arg(long)]
    api_base_url: Option<String>,

    /// HTTP server address
    #[arg(long, env = "MENTORIA_HTTP_ADDR")]
    http_addr: Option<SocketAddr>,

    /// Attempts per model call, including the first
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds of inactivity before a chat session is evicted
    #[arg(long)]
    session_idle_timeout_secs: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .init();

    info!("Starting MentorIA daemon");

    let mut config = match &args.config {
        Some(path) => {
            let config = AppConfig::load_from_file(path).context("Configuration error")?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => AppConfig::load_from_default().context("Configuration error")?,
    };

    // CLI flags win over the file
    if let Some(api_key) = args.api_key {
        config.gemini.api_key = Some(api_key);
    }
    if let Some(model) = args.model {
        config.gemini.model_name = Some(model);
    }
    if let Some(api_base_url) = args.api_base_url {
        config.gemini.api_base_url = Some(api_base_url);
    }
    if let Some(http_addr) = args.http_addr {
        config.http_addr = http_addr;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.retry = config.retry.with_max_attempts(max_attempts);
    }
    if let Some(secs) = args.session_idle_timeout_secs {
        config.session_idle_timeout_secs = secs;
    }

    let session_idle_timeout = config
        .session_idle_timeout()
        .context("Configuration error")?;

    let gemini = config.gemini.clone().with_env_api_key();
    if !gemini.has_api_key() {
        warn!(
            "No Gemini API key configured; every model call will fail until GEMINI_API_KEY is set"
        );
    }

    let client = GeminiClient::new(gemini).context("Failed to initialize Gemini client")?;
    info!(model = %client.config().model(), "Initialized Gemini client");

    let state = AppState::new(
        TutorService::with_retry(Arc::new(client), config.retry),
        Arc::new(InMemoryChatSessionStore::new()),
        session_idle_timeout,
    );

    http_server::run_server(state, config.http_addr).await?;

    info!("MentorIA daemon shutting down");
    Ok(())
}
