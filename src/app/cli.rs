use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use super::error::AppError;

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CANCELLED: i32 = 130;

/// What the application body reports back to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    /// Finished, but some files failed
    Failures,
    /// Stopped early by a signal or deadline
    Cancelled,
}

impl Completion {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => EXIT_SUCCESS,
            Self::Failures => EXIT_FAILURE,
            Self::Cancelled => EXIT_CANCELLED,
        }
    }
}

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Graceful cancellation on the first signal, hard exit on the second
/// - Exit codes (0 = success, 1 = error or failed files, 130 = cancelled)
pub struct CliApp {
    name: String,
}

impl CliApp {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the application body with signal-driven cancellation
    ///
    /// The body receives a token that is cancelled on the first signal so it
    /// can wind down and still report. This function never returns; it calls
    /// `std::process::exit` with the appropriate code.
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<Completion, AppError>>,
    {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch_signals(self.name.clone(), cancel.clone()));

        let code = match main_fn(cancel).await {
            Ok(completion) => completion.exit_code(),
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_FAILURE
            }
        };
        watcher.abort();
        std::process::exit(code);
    }
}

/// Cancel on the first signal, exit on the second
async fn watch_signals(name: String, cancel: CancellationToken) {
    if let Err(e) = wait_for_signal().await {
        error!(error = %e, "Signal handling unavailable");
        return;
    }
    warn!(app = %name, "Cancellation requested, finishing in-flight files");
    eprintln!("Interrupted, finishing in-flight files (signal again to abort)...");
    cancel.cancel();

    if wait_for_signal().await.is_ok() {
        eprintln!("Aborted");
        std::process::exit(EXIT_CANCELLED);
    }
}

/// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
async fn wait_for_signal() -> Result<(), AppError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).map_err(AppError::Signal)?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(AppError::Signal)?;
        let mut sighup = signal(SignalKind::hangup()).map_err(AppError::Signal)?;

        tokio::select! {
            _ = sigterm.recv() => eprintln!("Received SIGTERM"),
            _ = sigint.recv() => eprintln!("Received SIGINT"),
            _ = sighup.recv() => eprintln!("Received SIGHUP"),
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map_err(AppError::Signal)?;
        eprintln!("Received Ctrl+C");
        Ok(())
    }
}
