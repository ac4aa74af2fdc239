//! # ThreadSpire Binary
//!
//! Assembles the application from settings and compile-time features.

mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use ts_api::{router, AppState};
use ts_config::{Backend, Settings};
use ts_core::{CollectionRepo, ThreadRepo};
use ts_db_memory::MemoryStore;
use ts_services::ServiceConfig;

#[cfg(feature = "db-sqlite")]
use ts_db_sqlite::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    telemetry::init_tracing(&settings.log)?;

    let (threads, collections) = open_store(&settings).await?;
    let config = ServiceConfig {
        max_write_attempts: settings.service.max_write_attempts,
    };
    let app = router(AppState::new(threads, collections, config));

    let addr = settings.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, backend = ?settings.database.backend, "threadspire listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "server exited");
            err
        })?;

    Ok(())
}

type Stores = (Arc<dyn ThreadRepo>, Arc<dyn CollectionRepo>);

async fn open_store(settings: &Settings) -> anyhow::Result<Stores> {
    match settings.database.backend {
        Backend::Memory => {
            let store = Arc::new(MemoryStore::new());
            Ok((store.clone(), store))
        }
        #[cfg(feature = "db-sqlite")]
        Backend::Sqlite => {
            use secrecy::ExposeSecret;
            let store = Arc::new(SqliteStore::new(settings.database.url.expose_secret()).await?);
            Ok((store.clone(), store))
        }
        #[cfg(not(feature = "db-sqlite"))]
        Backend::Sqlite => anyhow::bail!("built without the db-sqlite feature"),
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
