use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{FileOutcome, Record, Summary};
use crate::events::RunEvent;

/// A progress event is emitted each time this many more files finish
pub const PROGRESS_INTERVAL: usize = 10;

/// What the aggregator hands back once every worker has reported
#[derive(Debug)]
pub struct Aggregated {
    pub summary: Summary,
    /// Successful records in completion order
    pub records: Vec<Record>,
}

/// Sole owner of the run summary while extraction is in flight
///
/// Workers never touch the summary; they send their outcome over a channel
/// and this actor folds outcomes in one at a time.
pub struct Aggregator {
    summary: Summary,
    records: Vec<Record>,
}

impl Aggregator {
    pub fn new(summary: Summary) -> Self {
        Self {
            summary,
            records: Vec::new(),
        }
    }

    pub fn absorb(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Success(record) => RunEvent::FileProcessed {
                file: record.source().to_path_buf(),
                student_id: record.student_id().to_string(),
                marks: record.present_count(),
            }
            .emit(),
            FileOutcome::Skipped { path, reason } => RunEvent::FileSkipped {
                file: path.clone(),
                reason: reason.clone(),
            }
            .emit(),
            FileOutcome::Failed {
                path,
                reason,
                attempts,
                ..
            } => RunEvent::FileFailed {
                file: path.clone(),
                reason: reason.clone(),
                attempts: *attempts,
            }
            .emit(),
        }

        if let Some(record) = self.summary.record_outcome(outcome) {
            self.records.push(record);
        }

        let completed = self.summary.completed_files();
        if completed % PROGRESS_INTERVAL == 0 {
            RunEvent::Progress {
                completed,
                total: self.summary.total_files,
            }
            .emit();
        }
    }

    pub fn finish(self) -> Aggregated {
        Aggregated {
            summary: self.summary,
            records: self.records,
        }
    }

    /// Run as a task until every sender has been dropped
    pub fn spawn(mut self, mut outcomes: mpsc::Receiver<FileOutcome>) -> JoinHandle<Aggregated> {
        tokio::spawn(async move {
            while let Some(outcome) = outcomes.recv().await {
                self.absorb(outcome);
            }
            self.finish()
        })
    }
}
