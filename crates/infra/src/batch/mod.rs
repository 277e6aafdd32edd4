//! Concurrent batch processing of unprocessed items.
//!
//! ## Design
//!
//! - One scan of the store per run; a failed scan fails the run before any write
//! - One unit of work per scanned item, run on a bounded worker pool
//! - Results gathered into a per-run aggregate that no other run can see
//! - The run returns only after every unit has settled (join barrier)
//! - Per-item failures are logged and counted, never propagated
//! - Overlapping runs are serialised (single-flight)
//!
//! ## Components
//!
//! - `BatchProcessor`: orchestrates a run
//! - `BatchAggregate`: thread-safe result collection for one run
//! - `BatchOutcome` / `BatchStats`: what a run returns

pub mod aggregate;
pub mod processor;
pub mod types;

pub use aggregate::BatchAggregate;
pub use processor::{BatchProcessor, BatchProcessorConfig};
pub use types::{BatchError, BatchOutcome, BatchStats, ProcessingOutcome, ProcessingResult};
