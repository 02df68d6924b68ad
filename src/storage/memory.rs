//! In-memory spreadsheet backends used by unit tests

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::WorkbookError;
use super::traits::{MasterDocument, MasterStore, SourceOpener, SourceWorkbook, round_to};
use crate::domain::CellAddress;

/// Sheets keyed by name, cells keyed by address text (`"C6"`)
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    sheets: HashMap<String, HashMap<String, String>>,
}

impl MemoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: &str) -> Self {
        self.sheets.entry(sheet.to_string()).or_default();
        self
    }

    pub fn with_cell(mut self, sheet: &str, cell: &str, value: &str) -> Self {
        self.sheets
            .entry(sheet.to_string())
            .or_default()
            .insert(cell.to_string(), value.to_string());
        self
    }
}

#[derive(Default)]
struct Gauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Source opener serving `MemoryBook`s, with failure injection and a
/// concurrency gauge
#[derive(Default)]
pub struct MemoryOpener {
    books: Mutex<HashMap<PathBuf, MemoryBook>>,
    transient_failures: Mutex<HashMap<PathBuf, u32>>,
    open_calls: Mutex<HashMap<PathBuf, u32>>,
    gauge: Arc<Gauge>,
    hold: Duration,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep each opened workbook busy for `hold` to widen concurrency windows
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, book: MemoryBook) {
        self.books.lock().unwrap().insert(path.into(), book);
    }

    /// Make the next `times` opens of `path` fail with an I/O error
    pub fn fail_times(&self, path: impl Into<PathBuf>, times: u32) {
        self.transient_failures
            .lock()
            .unwrap()
            .insert(path.into(), times);
    }

    pub fn open_calls(&self, path: &Path) -> u32 {
        self.open_calls
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of workbooks open at the same time
    pub fn peak_open(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }
}

impl SourceOpener for MemoryOpener {
    type Workbook = MemoryWorkbook;

    fn open(&self, path: &Path) -> Result<Self::Workbook, WorkbookError> {
        *self
            .open_calls
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default() += 1;

        let active = self.gauge.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(active, Ordering::SeqCst);
        if !self.hold.is_zero() {
            std::thread::sleep(self.hold);
        }
        let guard = GaugeGuard(self.gauge.clone());

        {
            let mut failures = self.transient_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(path)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(WorkbookError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "file is locked",
                )));
            }
        }

        let book = self
            .books
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                WorkbookError::Io(io::Error::new(io::ErrorKind::NotFound, "no such file"))
            })?;

        Ok(MemoryWorkbook {
            book,
            _guard: guard,
        })
    }
}

struct GaugeGuard(Arc<Gauge>);

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MemoryWorkbook {
    book: MemoryBook,
    _guard: GaugeGuard,
}

impl SourceWorkbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.book.sheets.keys().cloned().collect()
    }

    fn cell_text(&mut self, sheet: &str, cell: &CellAddress) -> Result<String, WorkbookError> {
        let cells = self
            .book
            .sheets
            .get(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;
        Ok(cells.get(&cell.to_string()).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default)]
struct MasterState {
    sheets: HashMap<String, Vec<Vec<String>>>,
    saves: usize,
    opens: usize,
}

/// Master store whose saved state can be inspected by tests
#[derive(Clone, Default)]
pub struct MemoryMasterStore {
    state: Arc<Mutex<MasterState>>,
    fail_save: bool,
}

impl MemoryMasterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, sheet: &str, rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        self.state
            .lock()
            .unwrap()
            .sheets
            .insert(sheet.to_string(), grid);
        self
    }

    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    /// Saved text of one cell (empty when never written)
    pub fn cell(&self, sheet: &str, address: &str) -> String {
        let address = CellAddress::parse(address).unwrap();
        let state = self.state.lock().unwrap();
        state
            .sheets
            .get(sheet)
            .and_then(|rows| rows.get(address.row() as usize - 1))
            .and_then(|row| row.get(address.column().index()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().opens
    }
}

impl MasterStore for MemoryMasterStore {
    type Document = MemoryMasterDocument;

    fn open(&self, _path: &Path) -> Result<Self::Document, WorkbookError> {
        let mut state = self.state.lock().unwrap();
        state.opens += 1;
        Ok(MemoryMasterDocument {
            sheets: state.sheets.clone(),
            shared: self.state.clone(),
            fail_save: self.fail_save,
        })
    }
}

pub struct MemoryMasterDocument {
    sheets: HashMap<String, Vec<Vec<String>>>,
    shared: Arc<Mutex<MasterState>>,
    fail_save: bool,
}

impl MasterDocument for MemoryMasterDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, WorkbookError> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))
    }

    fn set_numeric_cell(
        &mut self,
        sheet: &str,
        cell: &CellAddress,
        value: f64,
        precision: u32,
    ) -> Result<(), WorkbookError> {
        let rows = self
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;
        let row_idx = cell.row() as usize - 1;
        let col_idx = cell.column().index();
        if rows.len() <= row_idx {
            rows.resize(row_idx + 1, Vec::new());
        }
        let row = &mut rows[row_idx];
        if row.len() <= col_idx {
            row.resize(col_idx + 1, String::new());
        }
        row[col_idx] = round_to(value, precision).to_string();
        Ok(())
    }

    fn save(&mut self) -> Result<(), WorkbookError> {
        if self.fail_save {
            return Err(WorkbookError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "master is read-only",
            )));
        }
        let mut shared = self.shared.lock().unwrap();
        shared.sheets = self.sheets.clone();
        shared.saves += 1;
        Ok(())
    }
}
