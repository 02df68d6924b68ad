use std::path::Path;

use tracing::{debug, info, warn};

use super::error::MergeError;
use super::suggest::{MAX_SUGGESTIONS, similar_ids};
use crate::domain::{Column, FieldMapping, MergeSummary, Record, StudentId};
use crate::events::RunEvent;
use crate::storage::{MasterDocument, MasterStore};

/// Decimal places used for every numeric write into the master
pub const MARK_PRECISION: u32 = 2;

/// Minimum rows the master sheet needs: one header plus one student
pub const MIN_MASTER_ROWS: usize = 2;

/// Check that the master sheet exists and holds at least one data row
pub fn check_structure<D: MasterDocument>(doc: &D, sheet: &str) -> Result<usize, MergeError> {
    structured_rows(doc, sheet).map(|rows| rows.len())
}

fn structured_rows<D: MasterDocument>(doc: &D, sheet: &str) -> Result<Vec<Vec<String>>, MergeError> {
    if !doc.sheet_names().iter().any(|name| name == sheet) {
        return Err(MergeError::SheetNotFound(sheet.to_string()));
    }
    let rows = doc.rows(sheet).map_err(MergeError::Read)?;
    if rows.len() < MIN_MASTER_ROWS {
        return Err(MergeError::NoDataRows {
            sheet: sheet.to_string(),
            rows: rows.len(),
        });
    }
    Ok(rows)
}

/// Snapshot of the master's identifier column, top to bottom
///
/// Built once per merge pass; identifiers are never written, so the snapshot
/// stays valid while marks are applied.
#[derive(Debug, Clone, Default)]
pub struct IdentifierColumn {
    /// `(1-based row, trimmed cell text)`
    entries: Vec<(u32, String)>,
}

impl IdentifierColumn {
    pub fn from_rows(rows: &[Vec<String>], column: &Column) -> Self {
        let index = column.index();
        let entries = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let text = row.get(index).map(|s| s.trim()).unwrap_or_default();
                (i as u32 + 1, text.to_string())
            })
            .collect();
        Self { entries }
    }

    /// First row whose identifier matches, ignoring case and padding
    ///
    /// Duplicates further down the sheet are shadowed.
    pub fn locate(&self, id: &StudentId) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, text)| id.matches(text))
            .map(|(row, _)| *row)
    }

    pub fn similar_to(&self, id: &StudentId) -> Vec<String> {
        similar_ids(
            id.as_str(),
            self.entries.iter().map(|(_, text)| text.as_str()),
            MAX_SUGGESTIONS,
        )
    }
}

/// Applies records to an open master document
pub struct MasterMerger<'a, D: MasterDocument> {
    doc: &'a mut D,
    sheet: String,
    ids: IdentifierColumn,
}

impl<'a, D: MasterDocument> MasterMerger<'a, D> {
    pub fn new(doc: &'a mut D, sheet: &str, id_column: &Column) -> Result<Self, MergeError> {
        let rows = structured_rows(doc, sheet)?;
        let ids = IdentifierColumn::from_rows(&rows, id_column);
        Ok(Self {
            doc,
            sheet: sheet.to_string(),
            ids,
        })
    }

    pub fn locate(&self, id: &StudentId) -> Option<u32> {
        self.ids.locate(id)
    }

    pub fn identifiers(&self) -> &IdentifierColumn {
        &self.ids
    }

    /// Write every present mark of `record` into `row`
    ///
    /// Absent marks leave the destination cell untouched. Returns the number of
    /// cells written; zero is valid.
    pub fn apply_record(
        &mut self,
        row: u32,
        record: &Record,
        mapping: &FieldMapping,
    ) -> Result<usize, MergeError> {
        let mut written = 0;
        for pair in mapping.pairs() {
            let Some(value) = record.mark(&pair.source).value() else {
                continue;
            };
            let target = pair.destination.at(row);
            self.doc
                .set_numeric_cell(&self.sheet, &target, value, MARK_PRECISION)
                .map_err(|source| MergeError::Write {
                    cell: target.to_string(),
                    source,
                })?;
            written += 1;
        }
        debug!(
            student_id = %record.student_id(),
            row,
            fields_written = written,
            "Applied record"
        );
        Ok(written)
    }
}

/// Merge a batch of records with a single open and a single save
///
/// Unmatched identifiers and cell write failures are reported in the returned
/// summary and never abort the batch. Nothing reaches disk unless the final
/// save succeeds.
pub fn apply_all<S: MasterStore>(
    store: &S,
    path: &Path,
    sheet: &str,
    id_column: &Column,
    mapping: &FieldMapping,
    records: &[Record],
) -> Result<MergeSummary, MergeError> {
    let mut doc = store.open(path).map_err(MergeError::Open)?;
    let mut summary = MergeSummary::default();

    {
        let mut merger = MasterMerger::new(&mut doc, sheet, id_column)?;

        for record in records {
            let Some(row) = merger.locate(record.student_id()) else {
                let suggestions = merger.identifiers().similar_to(record.student_id());
                let mut message =
                    format!("Student {} not found in master sheet", record.student_id());
                if !suggestions.is_empty() {
                    message.push_str(&format!(" (did you mean: {})", suggestions.join(", ")));
                }
                RunEvent::StudentNotMatched {
                    student_id: record.student_id().to_string(),
                    file: record.source().to_path_buf(),
                    suggestions,
                }
                .emit();
                summary.records_not_matched += 1;
                summary.warnings.push(message);
                continue;
            };

            match merger.apply_record(row, record, mapping) {
                Ok(0) => {
                    debug!(student_id = %record.student_id(), "Record matched but carried no marks");
                }
                Ok(written) => {
                    summary.records_merged += 1;
                    summary.fields_written += written;
                }
                Err(e) => {
                    warn!(student_id = %record.student_id(), error = %e, "Failed to write marks");
                    summary.errors.push(format!(
                        "Failed to set marks for student {}: {}",
                        record.student_id(),
                        e
                    ));
                }
            }
        }
    }

    doc.save().map_err(MergeError::Save)?;

    info!(
        records_merged = summary.records_merged,
        records_not_matched = summary.records_not_matched,
        fields_written = summary.fields_written,
        "Master sheet updated"
    );

    Ok(summary)
}
