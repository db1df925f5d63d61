//! BookHub plugin host — bootstrap entry point.
//!
//! Loads configuration, wires the durable plugin store (PostgreSQL when
//! configured, in-memory otherwise), registers the bundled plugin entry
//! points, and brings every discovered plugin to its persisted lifecycle
//! target before the first dispatch can happen.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use bookhub_core::config::AppConfig;
use bookhub_core::error::AppError;
use bookhub_plugin::manager::PluginManager;
use bookhub_plugin::store::{MemoryStore, PluginStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("BOOKHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Bootstrap error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main host run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting BookHub plugin host v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Durable store ────────────────────────────────────
    let store: Arc<dyn PluginStore> = match &config.database {
        Some(database) => {
            tracing::info!("Connecting to database...");
            let pool = bookhub_database::connection::DatabasePool::connect(database).await?;

            tracing::info!("Running database migrations...");
            bookhub_database::migration::run_migrations(pool.pool()).await?;
            tracing::info!("Database migrations complete");

            Arc::new(bookhub_database::store::PgPluginStore::new(pool.into_pool()))
        }
        None => {
            tracing::warn!("No database configured; plugin state will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    // ── Step 2: Plugin manager + bundled entry points ────────────
    let manager = PluginManager::new(store);
    manager
        .register_builder(plugin_openlibrary::ENTRY, Arc::new(plugin_openlibrary::create))
        .await;
    manager
        .register_builder(plugin_ratings::ENTRY, Arc::new(plugin_ratings::create))
        .await;

    // ── Step 3: Discover and activate plugins ────────────────────
    if config.plugins.auto_activate {
        tracing::info!(directory = %config.plugins.directory, "Activating plugins...");
        manager
            .activate_all(Path::new(&config.plugins.directory))
            .await?;
    } else {
        tracing::info!("Plugin auto-activation disabled");
    }

    for descriptor in manager.plugins().list().await {
        tracing::info!(
            plugin = %descriptor.name,
            version = %descriptor.version,
            state = %descriptor.state,
            "Plugin ready"
        );
    }

    // ── Step 4: Run until shutdown ───────────────────────────────
    tracing::info!("BookHub plugin host running; press Ctrl+C to stop");
    shutdown_signal().await;

    tracing::info!("BookHub plugin host shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
