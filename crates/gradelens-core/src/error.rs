//! Analytics error types.
//!
//! Every query either returns a complete result or one of these errors;
//! nothing is partially computed and undefined quantities are never
//! reported as numbers.

use thiserror::Error;

/// Errors produced while building a dataset or answering a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// A query parameter is missing, ill-typed, or out of range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The requested quantity has a zero denominator.
    #[error("undefined result: {0}")]
    UndefinedResult(String),

    /// The dataset has no records.
    #[error("no data available: the dataset is empty")]
    EmptyDataset,

    /// A record breaks a data-model invariant.
    #[error("invariant violated for student {student_id}: {reason}")]
    InvariantViolation { student_id: u32, reason: String },

    /// Two records share a student id.
    #[error("duplicate student id: {0}")]
    DuplicateStudent(u32),
}

impl AnalyticsError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the caller caused this error and can fix the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalyticsError::InvalidParameter { .. })
    }

    /// Stable snake_case identifier, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::InvalidParameter { .. } => "invalid_parameter",
            AnalyticsError::UndefinedResult(_) => "undefined_result",
            AnalyticsError::EmptyDataset => "empty_dataset",
            AnalyticsError::InvariantViolation { .. } => "invariant_violation",
            AnalyticsError::DuplicateStudent(_) => "duplicate_student",
        }
    }
}

/// Convenience alias for analytics results.
pub type Result<T, E = AnalyticsError> = std::result::Result<T, E>;
