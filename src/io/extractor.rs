use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::discovery::has_supported_extension;
use super::error::{ExtractionError, ExtractionStage};
use crate::domain::{CellAddress, FieldMapping, Mark, Record, StudentId};
use crate::storage::{SourceOpener, SourceWorkbook};

/// Where to find the data inside every student file
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub sheet: String,
    pub id_cell: CellAddress,
    pub mapping: FieldMapping,
}

/// Turns one source file into a validated `Record`
///
/// Extraction is all-or-nothing: the first invalid cell aborts the file and
/// no partial record is ever returned. Workers never touch the master.
pub struct RecordExtractor<O: SourceOpener> {
    opener: O,
    settings: ExtractionSettings,
}

impl<O: SourceOpener> RecordExtractor<O> {
    pub fn new(opener: O, settings: ExtractionSettings) -> Self {
        Self { opener, settings }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub fn extract(&self, path: &Path) -> Result<Record, ExtractionError> {
        if !has_supported_extension(path) {
            return Err(ExtractionError::UnsupportedFormat(
                path.display().to_string(),
            ));
        }

        let mut workbook = self.opener.open(path).map_err(ExtractionError::Open)?;

        let sheet = self.settings.sheet.as_str();
        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(ExtractionError::WorksheetMissing(sheet.to_string()));
        }

        let id_cell = &self.settings.id_cell;
        let raw_id = workbook
            .cell_text(sheet, id_cell)
            .map_err(|source| ExtractionError::CellRead {
                cell: id_cell.to_string(),
                stage: ExtractionStage::StudentIdReading,
                source,
            })?;
        let student_id = StudentId::parse(&raw_id)?;

        let mut marks = BTreeMap::new();
        for cell in self.settings.mapping.sources() {
            let raw = workbook
                .cell_text(sheet, cell)
                .map_err(|source| ExtractionError::CellRead {
                    cell: cell.to_string(),
                    stage: ExtractionStage::MarkReading,
                    source,
                })?;
            let mark = Mark::parse(&cell.to_string(), &raw)?;
            marks.insert(cell.clone(), mark);
        }

        let record = Record::new(student_id, path, marks);
        debug!(
            student_id = %record.student_id(),
            file = %path.display(),
            marks = record.present_count(),
            "Extracted record"
        );
        Ok(record)
    }
}
