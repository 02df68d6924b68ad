pub mod aggregator;
pub mod error;
pub mod processor;
pub mod task;

// Re-export commonly used types
pub use aggregator::{Aggregated, Aggregator, PROGRESS_INTERVAL};
pub use error::{FailInvalidFiles, FailurePolicy, PipelineError, SkipInvalidFiles};
pub use processor::{Consolidator, RunSettings, Statistics};
pub use task::{FileTask, RetryPolicy, TaskState};
