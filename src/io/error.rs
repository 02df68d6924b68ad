use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{FailureKind, ValidationError};
use crate::storage::WorkbookError;

/// Where in the extraction pipeline a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Validation,
    Opening,
    WorksheetValidation,
    StudentIdReading,
    MarkReading,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Opening => "opening",
            Self::WorksheetValidation => "worksheet_validation",
            Self::StudentIdReading => "student_id_reading",
            Self::MarkReading => "mark_reading",
        };
        f.write_str(name)
    }
}

/// Failure to extract a record from one source file
///
/// The file path is carried by the caller's outcome, not repeated here.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to open workbook: {0}")]
    Open(#[source] WorkbookError),

    #[error("worksheet '{0}' not found")]
    WorksheetMissing(String),

    #[error("failed to read cell {cell}: {source}")]
    CellRead {
        cell: String,
        stage: ExtractionStage,
        #[source]
        source: WorkbookError,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ExtractionError {
    pub fn stage(&self) -> ExtractionStage {
        match self {
            Self::UnsupportedFormat(_) | Self::Invalid(_) => ExtractionStage::Validation,
            Self::Open(_) => ExtractionStage::Opening,
            Self::WorksheetMissing(_) => ExtractionStage::WorksheetValidation,
            Self::CellRead { stage, .. } => *stage,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Open(_) | Self::CellRead { .. } => FailureKind::Io,
            Self::UnsupportedFormat(_) | Self::WorksheetMissing(_) | Self::Invalid(_) => {
                FailureKind::Validation
            }
        }
    }

    /// Only I/O failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::Io
    }
}

/// Fatal discovery errors (the root itself is unusable)
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Source folder not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),
}
