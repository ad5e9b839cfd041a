// src/main.rs - Loads configuration, seeds the directory and serves the API
use clap::Parser;
use rbac_directory::config::{self, Config};
use rbac_directory::web::api::{AppState, build_state, create_router};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "rbac-directory", version, about = "Role-gated user directory service")]
struct Cli {
    /// Path to a TOML configuration file; built-in defaults are used if omitted.
    #[arg(short, long)]
    config: Option<String>,
    /// Address to listen on, overriding `[server].bind`.
    #[arg(long)]
    bind: Option<String>,
    /// Log level (error, warn, info, debug, trace), overriding `[server].log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Authenticate every seed account once and report what it was granted.
async fn self_check(state: &AppState, config: &Config) {
    for seed in config.seed_accounts() {
        match state.auth_backend.authenticate(&seed.username, &seed.password).await {
            Ok(identity) => tracing::info!(
                username = %identity.username,
                roles = ?identity.roles,
                "seed account authenticated"
            ),
            Err(e) => tracing::error!(username = %seed.username, "seed account failed to authenticate: {}", e),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(level) = cli.log_level {
        config.server.log_level = level;
    }
    config.validate()?;

    // Initialize logging
    let level: tracing::Level = config.server.log_level.parse()?;
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Starting rbac-directory {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path);
    }

    let state = build_state(&config)?;
    for account in state.directory.list_accounts() {
        tracing::info!(username = %account.username, roles = ?account.roles, "seeded account");
    }
    self_check(&state, &config).await;

    // Periodically drop expired throttling entries.
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
