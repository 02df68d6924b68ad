use std::path::{Path, PathBuf};

use tracing::debug;
use umya_spreadsheet::Spreadsheet;

use super::error::WorkbookError;
use super::traits::{MasterDocument, MasterStore, round_to};
use crate::domain::CellAddress;

/// Master store backed by umya-spreadsheet (`.xlsx` only)
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxMasterStore;

impl MasterStore for XlsxMasterStore {
    type Document = XlsxMasterDocument;

    fn open(&self, path: &Path) -> Result<Self::Document, WorkbookError> {
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            return Err(WorkbookError::UnsupportedFormat(path.display().to_string()));
        }
        if !path.is_file() {
            return Err(WorkbookError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("master sheet not found: {}", path.display()),
            )));
        }

        let book = umya_spreadsheet::reader::xlsx::read(path)?;
        debug!(path = %path.display(), "Opened master document");
        Ok(XlsxMasterDocument {
            path: path.to_path_buf(),
            book,
        })
    }
}

/// Master workbook held in memory until `save`
pub struct XlsxMasterDocument {
    path: PathBuf,
    book: Spreadsheet,
}

impl MasterDocument for XlsxMasterDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, WorkbookError> {
        let worksheet = self
            .book
            .get_sheet_by_name(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;

        let max_row = worksheet.get_highest_row();
        let max_col = worksheet.get_highest_column();

        let rows = (1..=max_row)
            .map(|row| {
                (1..=max_col)
                    .map(|col| worksheet.get_value((col, row)))
                    .collect()
            })
            .collect();
        Ok(rows)
    }

    fn set_numeric_cell(
        &mut self,
        sheet: &str,
        cell: &CellAddress,
        value: f64,
        precision: u32,
    ) -> Result<(), WorkbookError> {
        let worksheet = self
            .book
            .get_sheet_by_name_mut(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;
        let coordinate = cell.to_string();
        worksheet
            .get_cell_mut(coordinate.as_str())
            .set_value_number(round_to(value, precision));
        Ok(())
    }

    fn save(&mut self) -> Result<(), WorkbookError> {
        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path)?;
        debug!(path = %self.path.display(), "Saved master document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_master(path: &Path) {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book.new_sheet("001").unwrap();
        sheet.get_cell_mut("A1").set_value("No");
        sheet.get_cell_mut("B1").set_value("Student ID");
        sheet.get_cell_mut("B2").set_value("STU001");
        sheet.get_cell_mut("B3").set_value("STU002");
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    #[test]
    fn reads_rows_and_sheet_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master.xlsx");
        write_master(&path);

        let doc = XlsxMasterStore.open(&path).unwrap();
        assert_eq!(doc.sheet_names(), vec!["001".to_string()]);

        let rows = doc.rows("001").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], "Student ID");
        assert_eq!(rows[1][1], "STU001");
        assert_eq!(rows[2][1], "STU002");
        assert!(matches!(
            doc.rows("missing"),
            Err(WorkbookError::SheetNotFound(_))
        ));
    }

    #[test]
    fn writes_are_persisted_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master.xlsx");
        write_master(&path);

        let mut doc = XlsxMasterStore.open(&path).unwrap();
        let cell = CellAddress::parse("I2").unwrap();
        doc.set_numeric_cell("001", &cell, 85.456, 2).unwrap();
        doc.save().unwrap();

        let reopened = XlsxMasterStore.open(&path).unwrap();
        let rows = reopened.rows("001").unwrap();
        assert_eq!(rows[1][8], "85.46");
    }

    #[test]
    fn rejects_non_xlsx_master() {
        let dir = tempdir().unwrap();
        let result = XlsxMasterStore.open(&dir.path().join("master.xls"));
        assert!(matches!(result, Err(WorkbookError::UnsupportedFormat(_))));
    }

    #[test]
    fn corrupt_master_is_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let result = XlsxMasterStore.open(&path);
        assert!(matches!(result, Err(WorkbookError::XlsxRead(_))));
    }

    #[test]
    fn save_into_vanished_folder_is_a_write_error() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("masters");
        std::fs::create_dir_all(&folder).unwrap();
        let path = folder.join("master.xlsx");
        write_master(&path);

        let mut doc = XlsxMasterStore.open(&path).unwrap();
        std::fs::remove_dir_all(&folder).unwrap();

        assert!(matches!(doc.save(), Err(WorkbookError::XlsxWrite(_))));
    }
}
