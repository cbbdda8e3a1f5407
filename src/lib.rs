pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod routes;
pub mod state;

use crate::config::ServiceConfig;
use crate::error::{ErrorKind, ProgressError};
use crate::progress::store::StateFile;
use crate::state::{AppState, Repository};

/// Build the HTTP application around an already constructed repository.
pub fn create_app(repository: Repository) -> axum::Router {
    routes::router(AppState::new(repository))
}

/// Load the progress record and serve it until Ctrl+C / SIGTERM.
///
/// A record that cannot be loaded aborts startup before the listener binds.
pub async fn run(config: ServiceConfig) -> Result<(), ProgressError> {
    logging::log_startup(&config);

    let repository = Repository::with_system_clock(StateFile::new(&config.data_path));
    repository.load().await.map_err(|e| {
        tracing::error!(error = %e, "Progress state could not be loaded, refusing to serve");
        e
    })?;

    let app = create_app(repository);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        ProgressError::new(format!("Failed to bind listener: {}", e), ErrorKind::Startup)
            .with_context(format!("addr: {}", addr))
    })?;
    tracing::info!(%addr, "Progress service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProgressError::new(format!("Server error: {}", e), ErrorKind::Startup))?;

    tracing::info!("Progress service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
