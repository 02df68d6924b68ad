use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use tracing::trace;

use super::error::WorkbookError;
use super::traits::{SourceOpener, SourceWorkbook};
use crate::domain::CellAddress;

/// Source opener backed by calamine (`.xlsx` and legacy `.xls`)
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineOpener;

impl SourceOpener for CalamineOpener {
    type Workbook = CalamineWorkbook;

    fn open(&self, path: &Path) -> Result<Self::Workbook, WorkbookError> {
        let sheets = open_workbook_auto(path)?;
        Ok(CalamineWorkbook {
            sheets,
            ranges: HashMap::new(),
        })
    }
}

/// Opened source workbook; each sheet is parsed at most once
pub struct CalamineWorkbook {
    sheets: Sheets<BufReader<File>>,
    ranges: HashMap<String, Range<Data>>,
}

impl CalamineWorkbook {
    fn range(&mut self, sheet: &str) -> Result<&Range<Data>, WorkbookError> {
        if !self.ranges.contains_key(sheet) {
            trace!(sheet, "Parsing worksheet range");
            let range = self.sheets.worksheet_range(sheet)?;
            self.ranges.insert(sheet.to_string(), range);
        }
        self.ranges
            .get(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))
    }
}

impl SourceWorkbook for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn cell_text(&mut self, sheet: &str, cell: &CellAddress) -> Result<String, WorkbookError> {
        let range = self.range(sheet)?;
        let position = (cell.row() - 1, cell.column().index() as u32);
        Ok(range
            .get_value(position)
            .map(|value| value.to_string())
            .unwrap_or_default())
    }
}
