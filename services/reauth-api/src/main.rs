//! ReAuth API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use reauth_api::{build_router, AppState, Config};
use reauth_core::{CacheSweeper, SessionAuthority, SharedSessionService};
use reauth_db::{create_pool_with_options, PgSessionRepository, PoolOptions};
use reauth_extension::{ExtensionHost, ExtensionRegistry, StaticLoader};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("reauth_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ReAuth");

    // Load configuration
    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Configuration rejected"))?;
    tracing::info!(http_port = config.http_port, "Configuration loaded");

    // Create database pool
    let pool_options = PoolOptions::default().with_max_connections(config.db_max_connections);
    let pool = create_pool_with_options(&config.database_url, pool_options)
        .await
        .inspect_err(|e| {
            tracing::error!(
                error = %e,
                "Failed to connect to database; check DATABASE_URL and that the database is online"
            );
        })
        .context("database connection failed")?;
    tracing::info!("Database pool created");

    let repo = Arc::new(PgSessionRepository::new(pool.clone()));
    repo.migrate().await.context("schema bootstrap failed")?;

    // Session authority
    let authority = Arc::new(SessionAuthority::new(repo, config.session.clone()));
    let sessions: SharedSessionService = authority.clone();

    // Extensions register against the host until it is sealed
    let host = Arc::new(ExtensionHost::with_cors(config.cors.clone()));
    let mut registry = ExtensionRegistry::new(Arc::clone(&host), Arc::clone(&sessions));
    let mut loader = extension_loader();
    tracing::info!(sources = loader.len(), "Loading extensions");
    let summary = registry.load_all(&mut loader).await;
    if !summary.is_clean() {
        tracing::warn!(failed = summary.failed.len(), "Some extensions failed to start");
    }
    let registrations = host.seal();

    // Build HTTP router
    let state = AppState::new(sessions, config.internal_secret.clone()).with_pool(pool);
    let app = build_router(state, registrations);

    let sweeper = CacheSweeper::start(Arc::clone(&authority));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let served = run_http_server(app, addr).await;
    if let Err(e) = &served {
        tracing::error!(error = ?e, "HTTP server error");
    }

    sweeper.stop().await;
    if !registry.is_empty() {
        tracing::info!(count = registry.len(), "Disabling and unloading extensions");
        registry.shutdown(&mut loader).await;
    }

    tracing::info!("Shutdown complete");
    served
}

/// Extensions compiled into this binary. Add a factory per module, e.g.
/// `.with("password", PasswordExtension::boxed)`.
fn extension_loader() -> StaticLoader {
    StaticLoader::new()
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

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

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
