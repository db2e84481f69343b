use thiserror::Error;

use crate::core::walker::DataSource;

/// Coordinate-model misuse. Always fatal, surfaced before any traversal work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("malformed interval {interval:?}: {reason}")]
    MalformedInterval { interval: String, reason: String },
    #[error("inconsistent contig ordering: {0}")]
    InconsistentOrdering(String),
    #[error("contig ordering was not initialized before use")]
    OrderingNotInitialized,
}

/// Walker contract violations, checked eagerly before a single partition is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("walker {walker} requires {source} but none was provided")]
    MissingRequiredInput { walker: String, source: DataSource },
    #[error("walker {walker} does not allow {source} but it was provided")]
    DisallowedInput { walker: String, source: DataSource },
    #[error("unable to find reference metadata ({name}, {kind}) required by walker {walker}")]
    MissingBinding { walker: String, name: String, kind: String },
    #[error("walker {walker} does not allow access to metadata ({name}, {kind})")]
    DisallowedBinding { walker: String, name: String, kind: String },
}

/// A read/reference source failed to produce data for an interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: {message}")]
pub struct SourceError {
    pub context: String,
    pub message: String,
}

impl SourceError {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError { context: context.into(), message: message.into() }
    }
}

/// Everything `execute` can report. Variants identify the failing phase:
/// validation, interval/partition setup, or a worker partition during the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("interval setup failed: {0}")]
    Interval(#[from] IntervalError),
    #[error("failed to initialize worker pool: {0}")]
    ThreadPool(String),
    #[error("partition {partition} failed: {source}")]
    Partition { partition: usize, source: SourceError },
}
