use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::address::CellAddress;
use super::identifier::StudentId;
use super::mark::Mark;

/// Validated data extracted from one student file
///
/// Only ever built whole: every mapped source cell has a `Mark`, and the
/// identifier has passed validation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    student_id: StudentId,
    source: PathBuf,
    marks: BTreeMap<CellAddress, Mark>,
    extracted_at: DateTime<Local>,
}

impl Record {
    pub fn new(
        student_id: StudentId,
        source: impl Into<PathBuf>,
        marks: BTreeMap<CellAddress, Mark>,
    ) -> Self {
        Self {
            student_id,
            source: source.into(),
            marks,
            extracted_at: Local::now(),
        }
    }

    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    /// Path of the file this record was extracted from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Mark for a source cell; cells outside the record read as `Absent`
    pub fn mark(&self, cell: &CellAddress) -> Mark {
        self.marks.get(cell).copied().unwrap_or(Mark::Absent)
    }

    pub fn marks(&self) -> &BTreeMap<CellAddress, Mark> {
        &self.marks
    }

    /// Number of marks carrying a value
    pub fn present_count(&self) -> usize {
        self.marks.values().filter(|m| m.is_present()).count()
    }

    pub fn extracted_at(&self) -> DateTime<Local> {
        self.extracted_at
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student{{ID: {}, File: {}, Marks: {}}}",
            self.student_id,
            self.source.display(),
            self.marks.len()
        )
    }
}
