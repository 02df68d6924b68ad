use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::aggregator::{Aggregated, Aggregator};
use super::error::{FailInvalidFiles, FailurePolicy, PipelineError, SkipInvalidFiles};
use super::task::{FileTask, RetryPolicy};
use crate::domain::{Column, FailureKind, FileOutcome, MergeSummary, Record, RunStatus, Summary};
use crate::engine::{MergeError, apply_all, check_structure};
use crate::events::RunEvent;
use crate::io::{Discovery, ExtractionSettings, RecordExtractor, discover};
use crate::storage::{MasterStore, SourceOpener, save_output_copy, snapshot};

/// Outcomes buffered between workers and the aggregator
const OUTCOME_BUFFER: usize = 64;

/// Everything a run needs, already validated
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub source_root: PathBuf,
    pub master_path: PathBuf,
    pub output_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub extraction: ExtractionSettings,
    pub master_sheet: String,
    pub master_id_column: Column,
    pub max_concurrent_files: usize,
    pub backup_enabled: bool,
    pub skip_invalid_files: bool,
    /// Zero disables the deadline
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

/// Pre-run overview for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_discovered: usize,
    pub student_files_folder: PathBuf,
    pub master_sheet_path: PathBuf,
    pub max_concurrent_files: usize,
    pub backup_enabled: bool,
}

/// Drives discovery, bounded concurrent extraction and the single merge pass
///
/// Source files are only ever read by extraction workers; the master is only
/// ever opened by the validation step and the merge pass, one at a time.
pub struct Consolidator<O, M>
where
    O: SourceOpener + 'static,
    M: MasterStore + 'static,
{
    extractor: Arc<RecordExtractor<O>>,
    store: Arc<M>,
    settings: RunSettings,
    policy: Arc<dyn FailurePolicy>,
}

impl<O, M> Consolidator<O, M>
where
    O: SourceOpener + 'static,
    M: MasterStore + 'static,
{
    pub fn new(opener: O, store: M, settings: RunSettings) -> Self {
        let policy: Arc<dyn FailurePolicy> = if settings.skip_invalid_files {
            Arc::new(SkipInvalidFiles)
        } else {
            Arc::new(FailInvalidFiles)
        };
        Self {
            extractor: Arc::new(RecordExtractor::new(opener, settings.extraction.clone())),
            store: Arc::new(store),
            settings,
            policy,
        }
    }

    /// Replace the failure policy derived from `skip_invalid_files`
    pub fn with_policy(mut self, policy: Arc<dyn FailurePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub async fn statistics(&self) -> Result<Statistics, PipelineError> {
        let discovery = self.discover_files().await?;
        Ok(Statistics {
            total_discovered: discovery.files.len(),
            student_files_folder: self.settings.source_root.clone(),
            master_sheet_path: self.settings.master_path.clone(),
            max_concurrent_files: self.settings.max_concurrent_files,
            backup_enabled: self.settings.backup_enabled,
        })
    }

    /// Run the whole pipeline
    ///
    /// Cancellation (external or by deadline) is not an error: the summary
    /// accumulated so far is returned with a `Cancelled` or `TimedOut` status
    /// and the master is left untouched. Only a broken master, an unusable
    /// source root, a failed backup or a failed merge abort with `Err`.
    pub async fn process(
        &self,
        cancel: CancellationToken,
        dry_run: bool,
    ) -> Result<Summary, PipelineError> {
        RunEvent::RunStarted {
            dry_run,
            source_root: self.settings.source_root.clone(),
            master: self.settings.master_path.clone(),
        }
        .emit();

        let run_token = cancel.child_token();
        let timed_out = Arc::new(AtomicBool::new(false));
        let deadline = self.spawn_deadline(&run_token, &timed_out);

        let result = self.run(&run_token, &timed_out, dry_run).await;

        if let Some(deadline) = deadline {
            deadline.abort();
        }
        result
    }

    async fn run(
        &self,
        token: &CancellationToken,
        timed_out: &AtomicBool,
        dry_run: bool,
    ) -> Result<Summary, PipelineError> {
        let master_rows = self.validate_master().await?;
        debug!(rows = master_rows, sheet = %self.settings.master_sheet, "Master sheet validated");

        let discovery = self.discover_files().await?;
        RunEvent::FilesDiscovered {
            total: discovery.files.len(),
            walk_errors: discovery.errors.len(),
        }
        .emit();

        let mut summary = Summary::new(dry_run);
        summary.total_files = discovery.files.len();
        summary.warnings.extend(discovery.errors);

        if discovery.files.is_empty() {
            info!(root = %self.settings.source_root.display(), "No student files found");
            return Ok(self.finish(summary, None));
        }

        if token.is_cancelled() {
            let status = interruption_status(timed_out);
            RunEvent::CancellationObserved {
                timed_out: status == RunStatus::TimedOut,
            }
            .emit();
            return Ok(self.finish(summary, Some(status)));
        }

        if !dry_run && self.settings.backup_enabled {
            let backup = snapshot(&self.settings.master_path, &self.settings.backup_dir).await?;
            RunEvent::BackupCreated {
                path: backup.clone(),
            }
            .emit();
            summary.backup_path = Some(backup);
        }

        let Aggregated {
            mut summary,
            records,
        } = self
            .extract_all(discovery.files, summary, token, timed_out)
            .await?;

        let interruption = token
            .is_cancelled()
            .then(|| interruption_status(timed_out));

        if interruption.is_none() && !dry_run && !records.is_empty() {
            let merge = self.merge(records).await?;
            summary.absorb_merge(merge);

            match save_output_copy(&self.settings.master_path, &self.settings.output_dir).await {
                Ok(path) => {
                    RunEvent::OutputSaved { path: path.clone() }.emit();
                    summary.output_path = Some(path);
                }
                Err(e) => {
                    error!(error = %e, "Failed to save output copy");
                    summary
                        .errors
                        .push(format!("Failed to save output copy: {}", e));
                }
            }
        }

        Ok(self.finish(summary, interruption))
    }

    /// Fan files out to workers behind the admission gate
    async fn extract_all(
        &self,
        files: Vec<PathBuf>,
        summary: Summary,
        token: &CancellationToken,
        timed_out: &AtomicBool,
    ) -> Result<Aggregated, PipelineError> {
        let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
        let aggregator = Aggregator::new(summary).spawn(rx);

        let gate = Arc::new(Semaphore::new(self.settings.max_concurrent_files.max(1)));
        let mut workers = FuturesUnordered::new();

        for path in files {
            let permit = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    RunEvent::CancellationObserved {
                        timed_out: timed_out.load(Ordering::SeqCst),
                    }
                    .emit();
                    break;
                }
                permit = Arc::clone(&gate).acquire_owned() => permit,
            };
            // The gate is never closed
            let Ok(permit) = permit else { break };

            let task = FileTask::new(
                path.clone(),
                Arc::clone(&self.extractor),
                Arc::clone(&gate),
                self.settings.retry,
                Arc::clone(&self.policy),
                token.clone(),
            );
            let worker_tx = tx.clone();
            let handle = tokio::spawn(async move {
                let outcome = task.run(permit).await;
                // Only fails if the aggregator is gone, which ends the run anyway
                let _ = worker_tx.send(outcome).await;
            });
            workers.push(async move { (path, handle.await) });
        }

        // A worker that died never reported; account for its file here
        while let Some((path, joined)) = workers.next().await {
            if let Err(e) = joined {
                error!(file = %path.display(), error = %e, "Extraction worker failed");
                let _ = tx
                    .send(FileOutcome::Failed {
                        path,
                        reason: format!("extraction worker failed: {}", e),
                        kind: FailureKind::Io,
                        attempts: 1,
                    })
                    .await;
            }
        }
        drop(tx);

        Ok(aggregator.await?)
    }

    async fn validate_master(&self) -> Result<usize, PipelineError> {
        let store = Arc::clone(&self.store);
        let path = self.settings.master_path.clone();
        let sheet = self.settings.master_sheet.clone();

        tokio::task::spawn_blocking(move || {
            let doc = store.open(&path).map_err(MergeError::Open)?;
            check_structure(&doc, &sheet)
        })
        .await?
        .map_err(PipelineError::Structural)
    }

    async fn discover_files(&self) -> Result<Discovery, PipelineError> {
        let root = self.settings.source_root.clone();
        Ok(tokio::task::spawn_blocking(move || discover(&root)).await??)
    }

    async fn merge(&self, records: Vec<Record>) -> Result<MergeSummary, PipelineError> {
        let store = Arc::clone(&self.store);
        let path = self.settings.master_path.clone();
        let sheet = self.settings.master_sheet.clone();
        let id_column = self.settings.master_id_column.clone();
        let mapping = self.settings.extraction.mapping.clone();

        info!(records = records.len(), "Updating master sheet");
        tokio::task::spawn_blocking(move || {
            apply_all(&*store, &path, &sheet, &id_column, &mapping, &records)
        })
        .await?
        .map_err(PipelineError::Merge)
    }

    fn spawn_deadline(
        &self,
        token: &CancellationToken,
        timed_out: &Arc<AtomicBool>,
    ) -> Option<JoinHandle<()>> {
        let timeout = self.settings.timeout;
        if timeout.is_zero() {
            return None;
        }
        let token = token.clone();
        let timed_out = Arc::clone(timed_out);
        Some(tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    timed_out.store(true, Ordering::SeqCst);
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        }))
    }

    fn finish(&self, mut summary: Summary, interruption: Option<RunStatus>) -> Summary {
        summary.finalize(interruption);
        RunEvent::RunFinished {
            status: summary.status,
            successful: summary.successful_files,
            failed: summary.failed_files,
            skipped: summary.skipped_files,
            merged: summary.records_merged,
            not_matched: summary.records_not_matched,
        }
        .emit();
        summary
    }
}

fn interruption_status(timed_out: &AtomicBool) -> RunStatus {
    if timed_out.load(Ordering::SeqCst) {
        RunStatus::TimedOut
    } else {
        RunStatus::Cancelled
    }
}
