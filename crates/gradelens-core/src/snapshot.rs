//! Atomically swapped dataset snapshots.
//!
//! Readers take an `Arc<Dataset>` and run their query without holding any
//! lock. A refresh builds a complete new `Dataset` first and only then swaps
//! the pointer, so a reader sees either the old snapshot or the new one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;

use crate::dataset::{Dataset, SnapshotInfo};
use crate::source::RecordSource;

/// Holder of the currently published dataset.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Dataset>>,
    generation: AtomicU64,
}

impl SnapshotStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
            generation: AtomicU64::new(0),
        }
    }

    /// The published snapshot. Cheap: clones an `Arc`.
    pub fn current(&self) -> Arc<Dataset> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish a fully built dataset, returning the one it replaces.
    pub fn publish(&self, dataset: Dataset) -> Arc<Dataset> {
        let next = Arc::new(dataset);
        let info = next.info();
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(
            snapshot_id = %info.snapshot_id,
            students = info.student_count,
            generation,
            "published dataset snapshot"
        );
        previous
    }

    /// How many times a snapshot has been published since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Dataset::empty())
    }
}

/// Fetch records from `source`, validate them into a new dataset, and
/// publish it. On any failure the current snapshot stays in place.
pub async fn refresh(store: &SnapshotStore, source: &dyn RecordSource) -> anyhow::Result<SnapshotInfo> {
    let description = source.describe();
    let outcome = async {
        let records = source.fetch().await?;
        let dataset = Dataset::new(records)
            .with_context(|| format!("records from {description} failed validation"))?;
        let info = dataset.info();
        store.publish(dataset);
        anyhow::Ok(info)
    }
    .await;

    if let Err(e) = &outcome {
        tracing::warn!(source = %description, "refresh rejected, keeping current snapshot: {e:#}");
    }
    outcome
}
