pub mod cli;
pub mod error;
pub mod report;

// Re-export commonly used types
pub use cli::{CliApp, Completion, EXIT_CANCELLED, EXIT_FAILURE, EXIT_SUCCESS};
pub use error::AppError;
pub use report::{MAX_LISTED, render_statistics, render_summary, write_statistics, write_summary};
