use clap::Parser;
use kisan_core::client::GeminiClient;
use kisan_core::config::KisanConfig;
use kisan_service::config::{AppConfig, DEFAULT_HTTP_ADDR};
use kisan_service::coordinator::Coordinator;
use kisan_service::gateway::GeminiGateway;
use kisan_service::http_server;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "kisan-daemon", about = "Kisan Mitra farming assistant API")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini API key (defaults to the API_KEY environment variable)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Gemini model to use
    #[arg(short = 'o', long)]
    model: Option<String>,

    /// Base URL of the Gemini REST API
    #[arg(long)]
    api_base_url: Option<String>,

    /// HTTP server address
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets may live in a local .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    info!("Starting Kisan Mitra daemon");

    let args = Args::parse();

    let overrides = KisanConfig {
        api_key: args.api_key,
        model_name: args.model,
        api_base_url: args.api_base_url,
        system_instruction: None,
        region_context: None,
        request_timeout_secs: None,
    };

    let config = match AppConfig::load(args.config.as_deref(), &overrides, args.http_addr) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        }
    };

    // Initialize Gemini client
    let gemini_client = match GeminiClient::new(&config.kisan) {
        Ok(client) => {
            info!(model = client.model_name(), "Initialized Gemini client");
            client
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Gemini client");
            return Err(anyhow::anyhow!("Failed to initialize Gemini client: {}", e));
        }
    };

    let gateway = Arc::new(GeminiGateway::new(gemini_client, &config.kisan));
    let coordinator = Arc::new(Coordinator::new(gateway));

    http_server::run_server(coordinator, config.http_addr).await?;

    info!("Kisan Mitra daemon shutting down");
    Ok(())
}
