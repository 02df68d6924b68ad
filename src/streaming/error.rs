use thiserror::Error;

use crate::engine::MergeError;
use crate::io::{DiscoveryError, ExtractionError};
use crate::storage::BackupError;

/// Policy for files whose extraction ultimately failed
pub trait FailurePolicy: Send + Sync {
    /// Return true to count the file as skipped, false to count it as failed
    fn tolerate(&self, error: &ExtractionError) -> bool;
}

/// Count failed files as skipped; the run is still considered clean
pub struct SkipInvalidFiles;

impl FailurePolicy for SkipInvalidFiles {
    fn tolerate(&self, _error: &ExtractionError) -> bool {
        true
    }
}

/// Count every failed file against the run
pub struct FailInvalidFiles;

impl FailurePolicy for FailInvalidFiles {
    fn tolerate(&self, _error: &ExtractionError) -> bool {
        false
    }
}

/// Errors that abort a whole run
///
/// Per-file problems never show up here; they live in the run summary.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("master sheet validation failed: {0}")]
    Structural(#[source] MergeError),

    #[error("student file discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("failed to create backup: {0}")]
    Backup(#[from] BackupError),

    #[error("failed to update master sheet: {0}")]
    Merge(#[source] MergeError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
