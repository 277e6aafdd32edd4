//! Infrastructure layer: item storage, batch processing, configuration.

pub mod batch;
pub mod config;
pub mod store;

pub use batch::{BatchError, BatchOutcome, BatchProcessor, BatchProcessorConfig};
pub use config::{AppConfig, ConfigError, StoreBackend};
pub use store::{InMemoryItemStore, ItemStore, PostgresItemStore, StoreError};
