//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use gradelens_core::dataset::{Dataset, SnapshotInfo};
use gradelens_core::snapshot::{refresh, SnapshotStore};
use gradelens_core::source::RecordSource;

use crate::error::ApiError;

/// State shared by every handler.
pub struct AppState {
    pub store: SnapshotStore,
    pub source: Arc<dyn RecordSource>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// State with an empty dataset. Call [`AppState::reload`] to load data.
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            store: SnapshotStore::default(),
            source,
        }
    }

    /// State with an already built dataset.
    pub fn with_dataset(source: Arc<dyn RecordSource>, dataset: Dataset) -> Self {
        Self {
            store: SnapshotStore::new(dataset),
            source,
        }
    }

    /// Fetch from the source and publish a new snapshot.
    pub async fn reload(&self) -> Result<SnapshotInfo, ApiError> {
        refresh(&self.store, self.source.as_ref())
            .await
            .map_err(ApiError::Reload)
    }
}

/// Reload every `period` until the runtime shuts down. The first reload
/// happens one period after the call.
pub fn spawn_periodic_refresh(state: SharedState, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            // Failures are logged by `refresh` and the old snapshot stays live.
            let _ = state.reload().await;
        }
    })
}
