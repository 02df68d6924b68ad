use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::outcome::FileOutcome;
use super::record::Record;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Still in progress (never observed by callers of a finished run)
    Running,
    Completed,
    /// Finished, but at least one file failed under the strict policy
    CompletedWithFailures,
    /// Stopped by an external cancellation signal
    Cancelled,
    /// Stopped because the run deadline elapsed
    TimedOut,
}

impl RunStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut)
    }
}

/// Result of one batch merge against the master document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub records_merged: usize,
    pub records_not_matched: usize,
    pub fields_written: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Aggregate of one consolidation run
///
/// Exactly one per run. Mutated only by its current owner (the outcome
/// aggregator during extraction, the orchestrator afterwards) and read-only
/// once handed to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub skipped_files: usize,
    pub records_merged: usize,
    pub records_not_matched: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub status: RunStatus,
    pub dry_run: bool,
    pub backup_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Summary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            total_files: 0,
            successful_files: 0,
            failed_files: 0,
            skipped_files: 0,
            records_merged: 0,
            records_not_matched: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            start_time: Local::now(),
            end_time: None,
            status: RunStatus::Running,
            dry_run,
            backup_path: None,
            output_path: None,
        }
    }

    /// Fold one file outcome into the counters
    ///
    /// Returns the record of a successful outcome so the caller can buffer it
    /// for merging.
    pub fn record_outcome(&mut self, outcome: FileOutcome) -> Option<Record> {
        match outcome {
            FileOutcome::Success(record) => {
                self.successful_files += 1;
                Some(record)
            }
            FileOutcome::Skipped { path, reason } => {
                self.skipped_files += 1;
                self.warnings
                    .push(format!("Skipped file {}: {}", path.display(), reason));
                None
            }
            FileOutcome::Failed {
                path,
                reason,
                attempts,
                ..
            } => {
                self.failed_files += 1;
                let message = if attempts > 1 {
                    format!(
                        "File {}: {} (after {} attempts)",
                        path.display(),
                        reason,
                        attempts
                    )
                } else {
                    format!("File {}: {}", path.display(), reason)
                };
                self.errors.push(message);
                None
            }
        }
    }

    /// Fold a merge pass into the counters
    pub fn absorb_merge(&mut self, merge: MergeSummary) {
        self.records_merged += merge.records_merged;
        self.records_not_matched += merge.records_not_matched;
        self.errors.extend(merge.errors);
        self.warnings.extend(merge.warnings);
    }

    /// Files that reached a terminal outcome
    pub fn completed_files(&self) -> usize {
        self.successful_files + self.failed_files + self.skipped_files
    }

    pub fn has_failures(&self) -> bool {
        self.failed_files > 0
    }

    /// Stamp the end time and settle the final status
    ///
    /// `interruption` is `Some(Cancelled | TimedOut)` when the run stopped early.
    pub fn finalize(&mut self, interruption: Option<RunStatus>) {
        self.end_time = Some(Local::now());
        self.status = match interruption {
            Some(status) => status,
            None if self.has_failures() => RunStatus::CompletedWithFailures,
            None => RunStatus::Completed,
        };
    }

    /// Wall-clock duration, available once finalized
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
