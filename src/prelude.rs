//! Prelude module for convenient imports
//!
//! Import everything you need with: `use mark_consolidator::prelude::*;`

// Domain types
pub use crate::domain::{
    CellAddress, Column, DomainError, FailureKind, FieldMapping, FileOutcome, Mark,
    MergeSummary, Record, RunStatus, StudentId, Summary, ValidationError,
};

// Storage types
pub use crate::storage::{
    CalamineOpener, MasterDocument, MasterStore, SourceOpener, SourceWorkbook, XlsxMasterStore,
};

// Engine types
pub use crate::engine::{MergeError, apply_all};

// IO types
pub use crate::io::{ExtractionError, ExtractionSettings, RecordExtractor, discover};

// Streaming types
pub use crate::streaming::{
    Consolidator, FailInvalidFiles, FailurePolicy, PipelineError, RetryPolicy, RunSettings,
    SkipInvalidFiles, Statistics,
};

// Config types
pub use crate::config::{Config, ConfigError};

// App types
pub use crate::app::{AppError, CliApp, Completion};
