use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::FailurePolicy;
use crate::domain::{FileOutcome, Record};
use crate::events::RunEvent;
use crate::io::{ExtractionError, RecordExtractor};
use crate::storage::{SourceOpener, WorkbookError};

/// How often, and how patiently, a file is re-read after an I/O failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first try; values below 1 are raised to 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Single attempt, never retried
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff after the given (1-based) attempt: grows linearly
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub fn should_retry(&self, attempt: u32, error: &ExtractionError) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Lifecycle of a single file inside a run
///
/// `Pending -> Extracting -> {Succeeded, RetryWait, Skipped, Failed}`, with
/// `RetryWait -> Extracting` until the retry budget runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Extracting { attempt: u32 },
    RetryWait { attempt: u32, delay: Duration },
    Succeeded,
    Skipped,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped | Self::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Extracting { attempt } => write!(f, "extracting (attempt {})", attempt),
            Self::RetryWait { attempt, delay } => {
                write!(f, "retry_wait (after attempt {}, {:?})", attempt, delay)
            }
            Self::Succeeded => f.write_str("succeeded"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// One discovered file driven through extraction, retry and classification
///
/// Every extraction attempt holds a permit from the shared admission gate;
/// the permit is given back while the task waits to retry.
pub struct FileTask<O: SourceOpener> {
    path: PathBuf,
    extractor: Arc<RecordExtractor<O>>,
    gate: Arc<Semaphore>,
    retry: RetryPolicy,
    policy: Arc<dyn FailurePolicy>,
    cancel: CancellationToken,
    state: TaskState,
}

impl<O: SourceOpener + 'static> FileTask<O> {
    pub fn new(
        path: PathBuf,
        extractor: Arc<RecordExtractor<O>>,
        gate: Arc<Semaphore>,
        retry: RetryPolicy,
        policy: Arc<dyn FailurePolicy>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            path,
            extractor,
            gate,
            retry,
            policy,
            cancel,
            state: TaskState::Pending,
        }
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Drive the file to a terminal state
    ///
    /// `permit` is the gate permit the admission loop acquired for the first
    /// attempt. An attempt that has started always runs to completion.
    /// Cancellation is only observed between attempts, where it ends the task
    /// at once.
    pub async fn run(mut self, mut permit: OwnedSemaphorePermit) -> FileOutcome {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.transition(TaskState::Extracting { attempt });
            let result = self.extract_once().await;
            drop(permit);

            match result {
                Ok(record) => {
                    self.transition(TaskState::Succeeded);
                    return FileOutcome::Success(record);
                }
                Err(error) if self.retry.should_retry(attempt, &error) => {
                    let delay = self.retry.delay_after(attempt);
                    RunEvent::RetryScheduled {
                        file: self.path.clone(),
                        attempt,
                        delay,
                        error: error.to_string(),
                    }
                    .emit();
                    let abandoned =
                        self.settle(error, attempt, Some("retry abandoned, run cancelled"));
                    self.transition(TaskState::RetryWait { attempt, delay });

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return self.finish(abandoned),
                        _ = tokio::time::sleep(delay) => {}
                    }

                    permit = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return self.finish(abandoned),
                        acquired = Arc::clone(&self.gate).acquire_owned() => match acquired {
                            Ok(permit) => permit,
                            // The gate is never closed while tasks run
                            Err(_) => return self.finish(abandoned),
                        },
                    };
                }
                Err(error) => {
                    let outcome = self.settle(error, attempt, None);
                    return self.finish(outcome);
                }
            }
        }
    }

    async fn extract_once(&self) -> Result<Record, ExtractionError> {
        let extractor = Arc::clone(&self.extractor);
        let path = self.path.clone();
        match tokio::task::spawn_blocking(move || extractor.extract(&path)).await {
            Ok(result) => result,
            Err(join) => Err(ExtractionError::Open(WorkbookError::Io(io::Error::other(
                format!("extraction worker stopped: {}", join),
            )))),
        }
    }

    /// Classify a final error through the failure policy
    fn settle(&self, error: ExtractionError, attempts: u32, note: Option<&str>) -> FileOutcome {
        let mut reason = error.to_string();
        if let Some(note) = note {
            reason.push_str(&format!(" ({})", note));
        }

        if self.policy.tolerate(&error) {
            FileOutcome::Skipped {
                path: self.path.clone(),
                reason,
            }
        } else {
            FileOutcome::Failed {
                path: self.path.clone(),
                reason,
                kind: error.kind(),
                attempts,
            }
        }
    }

    fn finish(&mut self, outcome: FileOutcome) -> FileOutcome {
        let terminal = match &outcome {
            FileOutcome::Success(_) => TaskState::Succeeded,
            FileOutcome::Skipped { .. } => TaskState::Skipped,
            FileOutcome::Failed { .. } => TaskState::Failed,
        };
        self.transition(terminal);
        outcome
    }

    fn transition(&mut self, next: TaskState) {
        debug!(file = %self.path.display(), from = %self.state, to = %next, "Task transition");
        self.state = next;
    }
}
