//! Shared application state

use crate::{
    config::{Config, StoreBackend},
    db::{create_pool, EntityStore, MemoryStore, PostgresStore},
    services::{FilamentService, SpoolService, VendorService},
    Result,
};
use std::sync::Arc;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn EntityStore>,
    pub vendor_service: Arc<VendorService>,
    pub filament_service: Arc<FilamentService>,
    pub spool_service: Arc<SpoolService>,
}

impl AppState {
    /// Initialize the application state, connecting to the configured store.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::info!(backend = ?config.database.backend, "Initializing application state...");

        let store: Arc<dyn EntityStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let pool = create_pool(&config.database).await?;
                let store = PostgresStore::new(pool);
                if config.database.run_migrations {
                    store.run_migrations().await?;
                }
                Arc::new(store)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on shutdown");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Build state around an existing store.
    pub fn with_store(config: Config, store: Arc<dyn EntityStore>) -> Self {
        Self {
            config: Arc::new(config),
            vendor_service: Arc::new(VendorService::new(store.clone())),
            filament_service: Arc::new(FilamentService::new(store.clone())),
            spool_service: Arc::new(SpoolService::new(store.clone())),
            store,
        }
    }
}
