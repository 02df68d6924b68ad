//! Typed events emitted by a consolidation run
//!
//! The pipeline reports progress through these events instead of ad hoc log
//! lines, so every observable milestone has one name and one set of fields.
//! `emit` forwards them to `tracing` under the `run` target.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::domain::RunStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStarted {
        dry_run: bool,
        source_root: PathBuf,
        master: PathBuf,
    },
    FilesDiscovered {
        total: usize,
        walk_errors: usize,
    },
    BackupCreated {
        path: PathBuf,
    },
    FileProcessed {
        file: PathBuf,
        student_id: String,
        marks: usize,
    },
    RetryScheduled {
        file: PathBuf,
        attempt: u32,
        delay: Duration,
        error: String,
    },
    FileFailed {
        file: PathBuf,
        reason: String,
        attempts: u32,
    },
    FileSkipped {
        file: PathBuf,
        reason: String,
    },
    Progress {
        completed: usize,
        total: usize,
    },
    StudentNotMatched {
        student_id: String,
        file: PathBuf,
        suggestions: Vec<String>,
    },
    OutputSaved {
        path: PathBuf,
    },
    CancellationObserved {
        timed_out: bool,
    },
    RunFinished {
        status: RunStatus,
        successful: usize,
        failed: usize,
        skipped: usize,
        merged: usize,
        not_matched: usize,
    },
}

impl RunEvent {
    /// Stable event name, attached to every log line as `event`
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::FilesDiscovered { .. } => "files_discovered",
            Self::BackupCreated { .. } => "backup_created",
            Self::FileProcessed { .. } => "file_processed",
            Self::RetryScheduled { .. } => "retry_scheduled",
            Self::FileFailed { .. } => "file_failed",
            Self::FileSkipped { .. } => "file_skipped",
            Self::Progress { .. } => "progress",
            Self::StudentNotMatched { .. } => "student_not_matched",
            Self::OutputSaved { .. } => "output_saved",
            Self::CancellationObserved { .. } => "cancellation_observed",
            Self::RunFinished { .. } => "run_finished",
        }
    }

    pub fn emit(&self) {
        let event = self.name();
        match self {
            Self::RunStarted {
                dry_run,
                source_root,
                master,
            } => info!(
                target: "run",
                event,
                dry_run,
                source_root = %source_root.display(),
                master = %master.display(),
                "Starting consolidation"
            ),
            Self::FilesDiscovered { total, walk_errors } => {
                info!(target: "run", event, total, walk_errors, "Discovered student files")
            }
            Self::BackupCreated { path } => {
                info!(target: "run", event, path = %path.display(), "Backup created")
            }
            Self::FileProcessed {
                file,
                student_id,
                marks,
            } => debug!(
                target: "run",
                event,
                file = %file.display(),
                student_id = %student_id,
                marks,
                "File processed"
            ),
            Self::RetryScheduled {
                file,
                attempt,
                delay,
                error,
            } => warn!(
                target: "run",
                event,
                file = %file.display(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying file"
            ),
            Self::FileFailed {
                file,
                reason,
                attempts,
            } => error!(
                target: "run",
                event,
                file = %file.display(),
                reason = %reason,
                attempts,
                "File failed"
            ),
            Self::FileSkipped { file, reason } => warn!(
                target: "run",
                event,
                file = %file.display(),
                reason = %reason,
                "File skipped"
            ),
            Self::Progress { completed, total } => {
                info!(target: "run", event, completed, total, "Progress")
            }
            Self::StudentNotMatched {
                student_id,
                file,
                suggestions,
            } => warn!(
                target: "run",
                event,
                student_id = %student_id,
                file = %file.display(),
                suggestions = ?suggestions,
                "Student ID not found in master sheet"
            ),
            Self::OutputSaved { path } => {
                info!(target: "run", event, path = %path.display(), "Output file saved")
            }
            Self::CancellationObserved { timed_out } => {
                warn!(target: "run", event, timed_out, "Run interrupted, finishing in-flight files")
            }
            Self::RunFinished {
                status,
                successful,
                failed,
                skipped,
                merged,
                not_matched,
            } => info!(
                target: "run",
                event,
                status = ?status,
                successful,
                failed,
                skipped,
                merged,
                not_matched,
                "Consolidation finished"
            ),
        }
    }
}
