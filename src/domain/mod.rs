pub mod address;
pub mod error;
pub mod identifier;
pub mod mapping;
pub mod mark;
pub mod outcome;
pub mod record;
pub mod summary;

// Re-export commonly used types
pub use address::{CellAddress, Column};
pub use error::{DomainError, ValidationError};
pub use identifier::{StudentId, is_valid_identifier};
pub use mapping::{FieldMapping, FieldPair};
pub use mark::{MAX_MARK, MIN_MARK, Mark, is_valid_mark};
pub use outcome::{FailureKind, FileOutcome};
pub use record::Record;
pub use summary::{MergeSummary, RunStatus, Summary};
