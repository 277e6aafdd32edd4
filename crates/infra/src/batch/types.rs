//! Batch run types.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use itemproc_core::ItemId;
use itemproc_items::Item;

use crate::store::StoreError;

/// Result of one unit of work, produced once and consumed by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub item_id: ItemId,
    pub outcome: ProcessingOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Succeeded(Item),
    Failed(String),
}

impl ProcessingResult {
    pub fn succeeded(item: Item) -> Self {
        Self {
            item_id: item.id,
            outcome: ProcessingOutcome::Succeeded(item),
        }
    }

    pub fn failed(item_id: ItemId, error: impl Into<String>) -> Self {
        Self {
            item_id,
            outcome: ProcessingOutcome::Failed(error.into()),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl BatchStats {
    pub fn settled(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// What a completed run hands back to its caller.
///
/// `processed` holds exactly the items this run persisted, ordered by id.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub run_id: Uuid,
    pub processed: Vec<Item>,
    pub stats: BatchStats,
}

/// Run-level failure. Per-item failures never surface here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    /// The scan for unprocessed items failed; no unit was dispatched.
    #[error("scan for unprocessed items failed: {0}")]
    Scan(#[source] StoreError),

    /// The deadline fired before every unit settled.
    #[error("batch deadline exceeded: {settled} of {dispatched} units settled")]
    DeadlineExceeded { dispatched: usize, settled: usize },

    /// The barrier returned with units unaccounted for.
    #[error("batch incomplete: {settled} of {dispatched} units settled")]
    Incomplete { dispatched: usize, settled: usize },
}
