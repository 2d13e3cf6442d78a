//! Immutable dataset snapshots.
//!
//! A [`Dataset`] is built once from a validated record set and never
//! mutated afterwards. Refreshing data means building a new `Dataset` and
//! publishing it through a [`SnapshotStore`](crate::snapshot::SnapshotStore).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AnalyticsError, Result};
use crate::model::{ItemIndex, StudentRecord};

/// A validated, immutable set of student records keyed by `student_id`.
#[derive(Debug, Clone)]
pub struct Dataset {
    snapshot_id: Uuid,
    loaded_at: DateTime<Utc>,
    records: BTreeMap<u32, StudentRecord>,
}

/// Identifying metadata of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub snapshot_id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub student_count: usize,
}

impl Dataset {
    /// Build a dataset, re-checking every record.
    ///
    /// Fails on the first record whose total disagrees with its responses
    /// and on any repeated student id.
    pub fn new(records: impl IntoIterator<Item = StudentRecord>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for record in records {
            record.validate()?;
            let id = record.student_id;
            if by_id.insert(id, record).is_some() {
                return Err(AnalyticsError::DuplicateStudent(id));
            }
        }
        Ok(Self {
            snapshot_id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            records: by_id,
        })
    }

    /// A dataset with no records. Every query against it fails with
    /// [`AnalyticsError::EmptyDataset`].
    pub fn empty() -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            records: BTreeMap::new(),
        }
    }

    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            snapshot_id: self.snapshot_id,
            loaded_at: self.loaded_at,
            student_count: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records, or `EmptyDataset` when there are none.
    pub fn require_records(&self) -> Result<usize> {
        match self.records.len() {
            0 => Err(AnalyticsError::EmptyDataset),
            n => Ok(n),
        }
    }

    /// Records in ascending `student_id` order.
    pub fn records(&self) -> impl Iterator<Item = &StudentRecord> + '_ {
        self.records.values()
    }

    pub fn get(&self, student_id: u32) -> Option<&StudentRecord> {
        self.records.get(&student_id)
    }

    /// Totals in `student_id` order.
    pub fn totals(&self) -> Vec<u8> {
        self.records().map(|r| r.total).collect()
    }

    /// One item's responses as 0.0/1.0, in `student_id` order.
    pub fn item_column(&self, item: ItemIndex) -> Vec<f64> {
        self.records()
            .map(|r| f64::from(r.response(item).as_u8()))
            .collect()
    }

    /// How many records satisfy `predicate`.
    pub fn count_where(&self, predicate: impl Fn(&StudentRecord) -> bool) -> usize {
        self.records().filter(|r| predicate(r)).count()
    }
}
