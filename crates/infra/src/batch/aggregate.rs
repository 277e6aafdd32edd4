use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use itemproc_core::ItemId;
use itemproc_items::Item;

use super::types::{ProcessingOutcome, ProcessingResult};

#[derive(Debug, Default)]
struct Collected {
    items: Vec<Item>,
    ids: HashSet<ItemId>,
}

/// Thread-safe result collection for a single batch run.
///
/// A fresh aggregate is allocated per run and shared with that run's units
/// only. Every unit records exactly one [`ProcessingResult`].
#[derive(Debug, Default)]
pub struct BatchAggregate {
    collected: Mutex<Collected>,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchAggregate {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            collected: Mutex::new(Collected {
                items: Vec::with_capacity(capacity),
                ids: HashSet::with_capacity(capacity),
            }),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Record the result of one unit.
    ///
    /// A second success for an id already collected is counted as a failure
    /// and not added, so the collection never holds duplicates.
    pub fn record(&self, result: ProcessingResult) {
        match result.outcome {
            ProcessingOutcome::Succeeded(item) => {
                let inserted = {
                    let mut c = self.collected.lock().unwrap_or_else(PoisonError::into_inner);
                    if c.ids.insert(item.id) {
                        c.items.push(item);
                        true
                    } else {
                        false
                    }
                };

                if inserted {
                    self.succeeded.fetch_add(1, Ordering::SeqCst);
                } else {
                    warn!(item_id = %result.item_id, "duplicate result for item dropped");
                    self.failed.fetch_add(1, Ordering::SeqCst);
                }
            }
            ProcessingOutcome::Failed(_) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn settled(&self) -> usize {
        self.succeeded() + self.failed()
    }

    /// Move the collected items out, ordered by id.
    pub fn take_processed(&self) -> Vec<Item> {
        let mut c = self.collected.lock().unwrap_or_else(PoisonError::into_inner);
        c.ids.clear();
        let mut items = std::mem::take(&mut c.items);
        items.sort_by_key(|i| i.id);
        items
    }
}
