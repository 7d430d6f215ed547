//! HTTP server initialization and runtime setup.
//!
//! Connects to the database, starts the worker pool, serves the router, and
//! tears everything down in order on shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::application::gateway::Gateway;
use crate::application::rate_limiter::ClientRateLimiter;
use crate::application::services::UrlService;
use crate::application::worker_pool::WorkerPool;
use crate::config::Config;
use crate::infrastructure::persistence::PgUrlStore;
use crate::routes::app_router;
use crate::state::AppState;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (retried with exponential backoff)
/// - Embedded migrations
/// - Worker pool and per-client rate limiter
/// - Axum HTTP server with graceful shutdown on SIGINT/SIGTERM
///
/// After the listener stops accepting, the worker pool is stopped (queued jobs
/// are answered with a shutdown error) and the database pool is closed.
///
/// # Errors
///
/// Returns an error if the database stays unreachable, a migration fails,
/// the bind fails, or the server hits a runtime error.
pub async fn run(config: Config) -> Result<()> {
    let db = connect_with_retry(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run migrations")?;

    let store = Arc::new(PgUrlStore::new(db.clone()));
    let service = Arc::new(UrlService::new(store.clone()));
    let pool = Arc::new(WorkerPool::start(config.pool_config(), service));
    let limiter = Arc::new(ClientRateLimiter::new(&config.rate_limit_config()));
    let gateway = Arc::new(Gateway::new(Arc::clone(&pool), limiter));

    let state = AppState::new(
        gateway,
        store,
        config.base_url.clone(),
        config.request_timeout(),
        config.behind_proxy,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    pool.stop().await;
    db.close().await;
    tracing::info!("Shutdown complete");

    served.map_err(Into::into)
}

/// Opens the connection pool, retrying with jittered exponential backoff.
async fn connect_with_retry(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(config.db_connect_retries);

    Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "Database connection attempt failed"))
        }
    })
    .await
    .context("Failed to connect to database")
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, draining connections");
}
