use dotenv::dotenv;
use filestore_server::{app, config::Config, error::AppError, storage::Storage};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_logging();

    let config = Config::from_env()?;

    let storage = Arc::new(Storage::new(config.storage_dir.clone()));
    storage.ensure_exists().await?;

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!(
        %addr,
        storage_dir = %config.storage_dir.display(),
        max_upload_size = config.max_upload_size,
        "file server started"
    );

    let shutdown = CancellationToken::new();
    let mut server = {
        let shutdown = shutdown.clone();
        let app = app(&config, storage);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
        })
    };

    tokio::select! {
        _ = shutdown_signal() => {}
        finished = &mut server => return server_outcome(finished),
    }
    shutdown.cancel();

    match tokio::time::timeout(config.shutdown_grace, server).await {
        Ok(finished) => server_outcome(finished)?,
        Err(_) => tracing::warn!(
            grace_secs = config.shutdown_grace.as_secs(),
            "in-flight requests did not finish in time, forcing shutdown"
        ),
    }

    Ok(())
}

fn server_outcome(
    finished: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match finished {
        Ok(Ok(())) => {
            tracing::info!("server gracefully stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(AppError::Internal(format!("Server error: {}", e))),
        Err(e) => Err(AppError::Internal(format!("Server task failed: {}", e))),
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("received termination signal, shutting down");
}
