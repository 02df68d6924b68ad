use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::InitError;
use crate::streaming::PipelineError;

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Processing failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Logging setup failed: {0}")]
    Logging(#[source] InitError),

    #[error("Report encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Signal handler setup failed: {0}")]
    Signal(#[source] io::Error),
}
