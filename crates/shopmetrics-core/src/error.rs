//! Shared error type across shopmetrics crates.

use thiserror::Error;

/// Stable error codes (used in logs and JSON error bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Conflicting registration of a metric name.
    DuplicateMetric,
    /// Lookup of a metric that was never cataloged.
    NotFound,
    /// Label values do not match the definition's label names.
    LabelMismatch,
    /// Operation does not apply to the metric's kind.
    KindMismatch,
    /// Counter asked to go backwards.
    NegativeIncrement,
    /// Definition rejected at registration.
    InvalidDefinition,
    /// Per-metric series limit reached.
    CardinalityExceeded,
    /// Configuration could not be loaded or validated.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::LabelMismatch => "LABEL_MISMATCH",
            ErrorCode::KindMismatch => "KIND_MISMATCH",
            ErrorCode::NegativeIncrement => "NEGATIVE_INCREMENT",
            ErrorCode::InvalidDefinition => "INVALID_DEFINITION",
            ErrorCode::CardinalityExceeded => "CARDINALITY_EXCEEDED",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and gateway.
///
/// Everything except `BadConfig` and `Internal` signals an instrumentation
/// wiring bug, not a user-facing condition.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric {name} already registered with a different shape")]
    DuplicateMetric { name: String },
    #[error("metric not found: {0}")]
    NotFound(String),
    #[error("label mismatch for {metric}: {detail}")]
    LabelMismatch { metric: String, detail: String },
    #[error("metric {metric} is a {actual}, not a {expected}")]
    KindMismatch {
        metric: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("counter {metric} cannot be incremented by {amount}")]
    NegativeIncrement { metric: String, amount: f64 },
    #[error("invalid metric definition: {0}")]
    InvalidDefinition(String),
    #[error("metric {metric} reached its series limit of {limit}")]
    CardinalityExceeded { metric: String, limit: usize },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::DuplicateMetric { .. } => ErrorCode::DuplicateMetric,
            MetricsError::NotFound(_) => ErrorCode::NotFound,
            MetricsError::LabelMismatch { .. } => ErrorCode::LabelMismatch,
            MetricsError::KindMismatch { .. } => ErrorCode::KindMismatch,
            MetricsError::NegativeIncrement { .. } => ErrorCode::NegativeIncrement,
            MetricsError::InvalidDefinition(_) => ErrorCode::InvalidDefinition,
            MetricsError::CardinalityExceeded { .. } => ErrorCode::CardinalityExceeded,
            MetricsError::BadConfig(_) => ErrorCode::BadConfig,
            MetricsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
