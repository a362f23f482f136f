use std::process::ExitCode;

use photo_gallery::{config, db, routes, state};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = config::Settings::from_env();
    init_tracing(settings.as_ref().is_ok_and(|s| s.debug));

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` when `DEBUG` is on.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(settings: Result<config::Settings, config::ConfigError>) -> Result<(), StartupError> {
    let settings = settings?;
    tracing::info!(version = settings.version, "Starting up Photography Gallery API");
    if settings.uses_default_secret() {
        tracing::warn!(
            admin_enabled = settings.admin_enabled(),
            "SECRET_KEY is the shipped default; set it before exposing the admin API"
        );
    }

    let pool = db::init_pool(&settings.database_url, settings.db_max_connections).await?;
    let bind_addr = settings.bind_addr();
    let state = state::AppState::new(pool.clone(), settings);
    tracing::info!(storage = state.storage.base_url(), "image storage resolved");

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(addr = %bind_addr, "photography gallery listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shutting down Photography Gallery API");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}
