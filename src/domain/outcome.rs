use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::record::Record;

/// Broad class of a per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed data; retrying cannot help
    Validation,
    /// Opening or reading the file failed; eligible for retry
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => f.write_str("validation"),
            Self::Io => f.write_str("io"),
        }
    }
}

/// Terminal classification of one discovered file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Success(Record),
    /// Failure the operator chose to tolerate
    Skipped { path: PathBuf, reason: String },
    /// Failure that counts against the run
    Failed {
        path: PathBuf,
        reason: String,
        kind: FailureKind,
        attempts: u32,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Success(record) => record.source(),
            Self::Skipped { path, .. } => path,
            Self::Failed { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
