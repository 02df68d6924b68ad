use std::path::Path;

use super::error::WorkbookError;
use crate::domain::CellAddress;

/// Read-only handle on one opened source workbook
pub trait SourceWorkbook {
    /// Names of every sheet in the workbook
    fn sheet_names(&self) -> Vec<String>;

    /// Text of a single cell; cells that hold nothing read as an empty string
    fn cell_text(&mut self, sheet: &str, cell: &CellAddress) -> Result<String, WorkbookError>;
}

/// Opens source workbooks for extraction
///
/// Shared by every extraction worker, so implementations must be thread-safe.
pub trait SourceOpener: Send + Sync {
    type Workbook: SourceWorkbook;

    fn open(&self, path: &Path) -> Result<Self::Workbook, WorkbookError>;
}

/// Mutable handle on the master document for one open-mutate-save cycle
///
/// Writes stay in memory until `save`.
pub trait MasterDocument {
    fn sheet_names(&self) -> Vec<String>;

    /// Every row of a sheet as cell text, top to bottom (row 1 first)
    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, WorkbookError>;

    /// Write a number rounded to `precision` decimal places
    fn set_numeric_cell(
        &mut self,
        sheet: &str,
        cell: &CellAddress,
        value: f64,
        precision: u32,
    ) -> Result<(), WorkbookError>;

    /// Persist every pending write back to the document's path
    fn save(&mut self) -> Result<(), WorkbookError>;
}

/// Opens the master document
pub trait MasterStore: Send + Sync {
    type Document: MasterDocument;

    fn open(&self, path: &Path) -> Result<Self::Document, WorkbookError>;
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
