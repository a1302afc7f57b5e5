/// BetNad Server - sign-in and custody wallet API
use betnad_identity::FirebaseAuth;
use betnad_server::{api, config::ServerConfig, state::AppState};
use betnad_storage::MongoStorage;
use betnad_wallet::PrivyClient;
use clap::{Parser, Subcommand};
use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "betnad-server")]
#[command(about = "BetNad backend API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate the configuration and print it with secrets masked
    CheckConfig {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = load_config(config.as_deref())?;
            serve(config).await?;
        }
        Commands::CheckConfig { config } => {
            let config = load_config(config.as_deref())?;
            config.log_summary();
            println!("Configuration OK");
        }
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load, start logging, then validate so every missing setting gets logged
fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    let config = ServerConfig::load(path)?;
    init_tracing(config.default_log_filter());

    for name in config.missing_settings() {
        tracing::error!(setting = %name, "Missing required setting");
    }
    config.validate()?;

    Ok(config)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting BetNad backend");
    config.log_summary();

    // Initialize database
    let storage = MongoStorage::connect(&config.mongodb.uri, &config.mongodb.database).await?;
    storage.ensure_indexes().await?;
    let storage = Arc::new(storage);
    tracing::info!("Database ready");

    // Initialize providers
    let identity = FirebaseAuth::new(config.firebase.service_account())?;
    tracing::info!(project_id = %identity.project_id(), "Identity provider initialized");

    let privy = PrivyClient::new(config.privy.app_id.clone(), config.privy.app_secret.clone())?;
    tracing::info!(app_id = %privy.app_id(), "Wallet provider initialized");

    // Build application state
    let app_state = AppState::new(
        storage.clone(),
        storage.clone(),
        Arc::new(identity),
        Arc::new(privy),
    );

    let app = api::app(app_state, &config.server.cors_origin)?;

    let addr = SocketAddr::from((config.server.host.parse::<IpAddr>()?, config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown(Arc::clone(&storage)))
        .await?;

    tracing::info!("Graceful shutdown completed");
    Ok(())
}

/// Resolves on SIGINT/SIGTERM after the database client is closed.
///
/// The server stops accepting connections only once this returns.
async fn shutdown(storage: Arc<MongoStorage>) {
    shutdown_signal().await;
    tracing::info!("Graceful shutdown initiated");
    storage.close().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
