//! Batch processor: marks every unprocessed item as `PROCESSED`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{Id as TaskId, JoinSet};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use itemproc_core::ItemId;

use super::aggregate::BatchAggregate;
use super::types::{BatchError, BatchOutcome, BatchStats, ProcessingResult};
use crate::store::ItemStore;

/// Batch processor configuration.
#[derive(Debug, Clone)]
pub struct BatchProcessorConfig {
    /// Name for logging
    pub name: String,
    /// Maximum number of units writing to the store at once
    pub pool_size: usize,
    /// Optional upper bound on a whole run
    pub deadline: Option<Duration>,
}

impl Default for BatchProcessorConfig {
    fn default() -> Self {
        Self {
            name: "batch-processor".to_string(),
            pool_size: 10,
            deadline: None,
        }
    }
}

impl BatchProcessorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Concurrent batch processor.
///
/// Each run scans the store for unprocessed items, dispatches one unit per
/// item onto a worker pool of `pool_size` permits and waits for every unit
/// before returning. Runs are single-flight: a caller arriving while a run is
/// in progress waits for it to finish, then performs its own scan.
pub struct BatchProcessor {
    store: Arc<dyn ItemStore>,
    config: BatchProcessorConfig,
    workers: Arc<Semaphore>,
    in_flight: Mutex<()>,
}

impl BatchProcessor {
    pub fn new(store: Arc<dyn ItemStore>, config: BatchProcessorConfig) -> Self {
        let pool_size = config.pool_size.max(1);
        Self {
            store,
            config,
            workers: Arc::new(Semaphore::new(pool_size)),
            in_flight: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BatchProcessorConfig {
        &self.config
    }

    /// Mark every unprocessed item as processed.
    ///
    /// Fails only if the scan fails, the deadline fires, or the barrier
    /// returns with units unaccounted for. Individual write failures are
    /// logged and excluded from the outcome.
    #[instrument(skip(self), fields(processor = %self.config.name))]
    pub async fn process_unprocessed_items(&self) -> Result<BatchOutcome, BatchError> {
        let _single_flight = self.in_flight.lock().await;

        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let started = Instant::now();

        let items = self.store.find_unprocessed().await.map_err(|e| {
            error!(%run_id, error = %e, "unprocessed scan failed");
            BatchError::Scan(e)
        })?;

        let dispatched = items.len();
        info!(%run_id, dispatched, "batch run started");

        let aggregate = Arc::new(BatchAggregate::with_capacity(dispatched));
        let mut units = JoinSet::new();
        let mut unit_items: HashMap<TaskId, ItemId> = HashMap::with_capacity(dispatched);

        for item in items {
            let item_id = item.id;
            let handle = units.spawn(process_item(
                self.store.clone(),
                self.workers.clone(),
                aggregate.clone(),
                item_id,
                run_id,
            ));
            unit_items.insert(handle.id(), item_id);
        }

        let barrier = settle_all(&mut units, &unit_items, &aggregate, run_id);
        match self.config.deadline {
            Some(deadline) => {
                if tokio::time::timeout(deadline, barrier).await.is_err() {
                    units.abort_all();
                    while units.join_next().await.is_some() {}

                    let settled = aggregate.settled();
                    warn!(%run_id, dispatched, settled, ?deadline, "batch deadline exceeded");
                    return Err(BatchError::DeadlineExceeded {
                        dispatched,
                        settled,
                    });
                }
            }
            None => barrier.await,
        }

        let stats = BatchStats {
            dispatched,
            succeeded: aggregate.succeeded(),
            failed: aggregate.failed(),
            started_at,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        if stats.settled() != dispatched {
            error!(%run_id, dispatched, settled = stats.settled(), "batch barrier returned early");
            return Err(BatchError::Incomplete {
                dispatched,
                settled: stats.settled(),
            });
        }

        let processed = aggregate.take_processed();
        info!(
            %run_id,
            dispatched,
            succeeded = stats.succeeded,
            failed = stats.failed,
            elapsed_ms = stats.elapsed_ms,
            "batch run finished"
        );

        Ok(BatchOutcome {
            run_id,
            processed,
            stats,
        })
    }
}

/// Join barrier: wait for every unit. Units that panicked or were cancelled
/// are recorded as failures here, since they never reached the aggregate.
async fn settle_all(
    units: &mut JoinSet<()>,
    unit_items: &HashMap<TaskId, ItemId>,
    aggregate: &BatchAggregate,
    run_id: Uuid,
) {
    while let Some(joined) = units.join_next().await {
        let Err(join_err) = joined else { continue };

        let item_id = unit_items.get(&join_err.id()).copied();
        let item = item_id.map(|id| id.to_string()).unwrap_or_else(|| "unknown".to_string());
        error!(%run_id, item_id = %item, error = %join_err, "unexpected fault in processing unit");

        if let Some(item_id) = item_id {
            aggregate.record(ProcessingResult::failed(item_id, join_err.to_string()));
        }
    }
}

/// One unit of work: mark the stored record, record the result.
///
/// Only the status is written, so edits made after the scan survive and a
/// record deleted after the scan stays deleted.
async fn process_item(
    store: Arc<dyn ItemStore>,
    workers: Arc<Semaphore>,
    aggregate: Arc<BatchAggregate>,
    item_id: ItemId,
    run_id: Uuid,
) {
    let _permit = match workers.acquire().await {
        Ok(p) => p,
        Err(e) => {
            error!(%run_id, %item_id, error = %e, "worker pool closed");
            aggregate.record(ProcessingResult::failed(item_id, e.to_string()));
            return;
        }
    };

    match store.mark_processed(item_id).await {
        Ok(Some(marked)) => {
            debug!(%run_id, %item_id, "item processed");
            aggregate.record(ProcessingResult::succeeded(marked));
        }
        Ok(None) => {
            warn!(%run_id, %item_id, "item removed before it could be processed");
            aggregate.record(ProcessingResult::failed(item_id, "item no longer exists"));
        }
        Err(e) => {
            warn!(%run_id, %item_id, error = %e, "failed to persist processed item");
            aggregate.record(ProcessingResult::failed(item_id, e.to_string()));
        }
    }
}
