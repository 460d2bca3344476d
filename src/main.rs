use clap::Parser;
use std::sync::Arc;

use waitlist::{
    auth::{HttpTokenVerifier, OAuthConfig, SessionConfig},
    db::Database,
    logging,
    servers::{ApiConfig, ApiServer},
    state::AppState,
    WaitlistServerError,
};

#[derive(Parser, Debug)]
#[command(name = "waitlist", version, about)]
struct Config {
    /// Address to bind the API server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port for the API server
    #[arg(short = 'p', long, default_value_t = 3001)]
    port: u16,

    /// Path to the SQLite database
    #[arg(long, default_value = "data/waitlist.db")]
    db_path: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write rotated log files to this directory instead of stderr
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> waitlist::Result<()> {
    let config = Config::parse();
    let _logger = logging::setup_logging(&config.log_level, config.log_dir.as_deref())?;

    let session_config = SessionConfig::from_env().ok_or_else(|| {
        WaitlistServerError::Config("JWT_SECRET must be set to a non-empty value".to_string())
    })?;
    let oauth_config = OAuthConfig::from_env();
    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = Database::new(&config.db_path)?;
    log::info!("🗄️ Database ready at {}", config.db_path);

    let state = AppState::new(
        db,
        &session_config,
        oauth_config,
        Arc::new(HttpTokenVerifier::new()),
        frontend_url,
    );
    log::info!(
        "🔐 Redirect login providers: {:?}",
        state.oauth.get_configured_providers()
    );

    let server = ApiServer::new(
        ApiConfig {
            host: config.host,
            port: config.port,
        },
        state,
    );
    server.start().await
}
