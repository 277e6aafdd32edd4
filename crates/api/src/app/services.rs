use std::sync::Arc;

use itemproc_infra::{
    AppConfig, BatchProcessor, BatchProcessorConfig, InMemoryItemStore, ItemStore,
    PostgresItemStore, StoreBackend, StoreError,
};

/// Shared services handed to every handler.
pub struct AppServices {
    pub store: Arc<dyn ItemStore>,
    pub batch: BatchProcessor,
}

impl AppServices {
    pub fn new(store: Arc<dyn ItemStore>, batch_config: BatchProcessorConfig) -> Self {
        let batch = BatchProcessor::new(store.clone(), batch_config);
        Self { store, batch }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(batch_config: BatchProcessorConfig) -> Self {
        Self::new(Arc::new(InMemoryItemStore::new()), batch_config)
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn ItemStore> = match &config.store {
            StoreBackend::InMemory => {
                tracing::warn!("using in-memory item store; data is lost on restart");
                Arc::new(InMemoryItemStore::new())
            }
            StoreBackend::Postgres { database_url } => {
                Arc::new(PostgresItemStore::connect(database_url).await?)
            }
        };
        Ok(Self::new(store, config.batch.clone()))
    }
}
