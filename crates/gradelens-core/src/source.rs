//! Record sources feeding dataset refreshes.
//!
//! The engine never does I/O while answering queries. A [`RecordSource`]
//! produces a fresh record set; [`refresh`](crate::snapshot::refresh) turns it
//! into a new snapshot.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;

use crate::loader;
use crate::model::StudentRecord;

/// Something that can produce a complete, validated record set.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable description for logs (e.g. a file path).
    fn describe(&self) -> String;

    /// Fetch every record. Either the whole set or an error.
    async fn fetch(&self) -> anyhow::Result<Vec<StudentRecord>>;
}

/// Reads a grades CSV file from disk on every fetch.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> anyhow::Result<Vec<StudentRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || loader::load_grades(&path))
            .await
            .context("grades loader task failed")?
    }
}

/// In-memory source for tests and embedding. The record set can be
/// replaced between fetches.
pub struct StaticSource {
    records: Mutex<Vec<StudentRecord>>,
    fetch_count: AtomicU32,
}

impl StaticSource {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Replace the records returned by subsequent fetches.
    pub fn set_records(&self, records: Vec<StudentRecord>) {
        *self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = records;
    }

    /// Number of fetches so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn describe(&self) -> String {
        "in-memory records".to_string()
    }

    async fn fetch(&self) -> anyhow::Result<Vec<StudentRecord>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }
}
