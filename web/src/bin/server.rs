//! Todo API server
//!
//! # Usage
//!
//! ```bash
//! PORT=8080 cargo run --bin server
//! curl localhost:8080/api/todos
//! ```

use starter_web::{build_router, AppState, Config};
use std::future::IntoFuture;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| starter_web::config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        name = %config.app.name,
        environment = ?config.environment,
        base_path = %config.api.base_path,
        seed_demo_todos = config.seed_demo_todos,
        "Configuration loaded"
    );

    let address = config.bind_address();
    let shutdown_timeout = config.shutdown_timeout();
    let app = build_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "Server listening");

    let (stopping_tx, stopping_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = stopping_tx.send(());
    });
    let mut server = tokio::spawn(server.into_future());

    // In-flight requests get `shutdown_timeout` to finish once the signal arrives
    let drain_deadline = async move {
        if stopping_rx.await.is_ok() {
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = &mut server => {
            result??;
            tracing::info!("Server stopped");
        },
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed with requests still in flight"
            );
            server.abort();
        },
    }

    Ok(())
}

/// Resolves on Ctrl+C (and SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(error) => {
                tracing::error!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
}
