//! tandem-server - language-exchange partner matching service
//!
//! Startup order:
//! 1. Parse CLI and load the bootstrap TOML
//! 2. Initialize tracing and log build identification
//! 3. Resolve the root folder and open (or create) tandem.db
//! 4. Load or generate the session signing secret
//! 5. Serve until Ctrl+C / SIGTERM, then close the pool

use anyhow::{Context, Result};
use clap::Parser;
use tandem_common::api::load_session_secret;
use tandem_common::config::RootFolderInitializer;
use tandem_common::db::init_database;
use tandem_server::config::{load_bootstrap_config, CliArgs, ConfigSource, ServerConfig};
use tandem_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Loaded before tracing so the configured level applies; outcome logged below
    let (toml_config, config_source) =
        load_bootstrap_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = ServerConfig::from_sources(&args, &toml_config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "tandem_server={0},tandem_common={0},tower_http={0}",
                    config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database work
    info!(
        "Starting Tandem server (tandem-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_source {
        ConfigSource::File(path) => info!("Loaded config file: {}", path.display()),
        ConfigSource::Defaults => info!("No config file found, using defaults"),
    }

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let session_secret = load_session_secret(&pool)
        .await
        .context("Failed to load session secret")?;
    info!("✓ Loaded session secret");

    let state = AppState::new(pool.clone(), session_secret).with_session_ttl(config.session_ttl);
    let app = build_router(state);

    let addr = config.socket_addr().context("Invalid listen address")?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
