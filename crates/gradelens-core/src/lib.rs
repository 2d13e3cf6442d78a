//! gradelens-core — Grade analytics over immutable dataset snapshots.
//!
//! This crate holds the record model, the CSV loader, and the read-only
//! analytics (descriptive statistics, item correlations, conditional and
//! Bayesian queries) that the server and CLI build on.

pub mod bayes;
pub mod conditional;
pub mod correlation;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod loader;
pub mod model;
pub mod query;
pub mod report;
pub mod snapshot;
pub mod source;
pub mod statistics;

pub use error::{AnalyticsError, Result};
