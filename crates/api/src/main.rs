mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use chrono::Duration;
use lobianco_core::auth::{AdminPassword, SessionKeys};
use lobianco_core::events::EventBus;
use lobianco_core::seed::seed_demo_content;
use lobianco_core::storage::SupabaseStorage;
use lobianco_core::store::{ContentStore, PgStore};
use lobianco_core::ContentService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting Lobianco API server");

    let sessions = SessionKeys::new(
        config.jwt_secret.as_bytes(),
        Duration::hours(config.session_ttl_hours),
    );
    let mut service = ContentService::new(
        EventBus::new(config.event_bus_capacity),
        sessions,
        config.owner_open_id.clone(),
    );

    if let Some(store) = connect_store(&config).await {
        if config.seed_demo_content {
            if let Err(e) = seed_demo_content(store.as_ref()).await {
                tracing::error!("Demo seed failed: {e}");
            }
        }
        service = service.with_store(store);
    }

    match &config.supabase {
        Some(supabase) => {
            service = service.with_object_store(Arc::new(SupabaseStorage::new(
                supabase.url.clone(),
                supabase.service_role_key.clone(),
            )));
        }
        None => tracing::warn!("SUPABASE_URL not set, uploads are disabled"),
    }

    match &config.admin_password_hash {
        Some(hash) => {
            let password = AdminPassword::from_hash(hash.clone())
                .map_err(|e| anyhow::anyhow!("ADMIN_PASSWORD_HASH is unusable: {e}"))?;
            service = service.with_admin_password(password);
        }
        None => tracing::warn!("ADMIN_PASSWORD_HASH not set, password login is disabled"),
    }

    let state = state::AppState::new(service, config.clone());

    // Build router with middleware
    let app = routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer());

    // Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Connect and migrate. Any failure leaves the server running without a
/// store: reads come back empty and writes fail.
async fn connect_store(config: &config::AppConfig) -> Option<Arc<dyn ContentStore>> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, serving without a content store");
        return None;
    };

    let store = match PgStore::connect(url, config.db_max_connections, config.db_min_connections).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to connect to database, serving without a content store: {e}");
            return None;
        }
    };

    if let Err(e) = store.migrate().await {
        tracing::error!("Failed to run migrations, serving without a content store: {e}");
        return None;
    }

    Some(Arc::new(store))
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
