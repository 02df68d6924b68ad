use thiserror::Error;

use crate::storage::WorkbookError;

/// Errors raised while merging records into the master document
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to open master sheet: {0}")]
    Open(#[source] WorkbookError),

    #[error("master worksheet '{0}' not found")]
    SheetNotFound(String),

    #[error("master worksheet '{sheet}' has no data rows (found {rows} row(s), need at least 2)")]
    NoDataRows { sheet: String, rows: usize },

    #[error("failed to read master worksheet: {0}")]
    Read(#[source] WorkbookError),

    #[error("failed to write cell {cell}: {source}")]
    Write {
        cell: String,
        #[source]
        source: WorkbookError,
    },

    #[error("failed to save master sheet: {0}")]
    Save(#[source] WorkbookError),
}

impl MergeError {
    /// Whether the master itself is unusable, as opposed to an I/O hiccup
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::SheetNotFound(_) | Self::NoDataRows { .. })
    }
}
