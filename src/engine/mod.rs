pub mod error;
pub mod merger;
pub mod suggest;

// Re-export commonly used types
pub use error::MergeError;
pub use merger::{
    IdentifierColumn, MARK_PRECISION, MIN_MASTER_ROWS, MasterMerger, apply_all, check_structure,
};
pub use suggest::{levenshtein, similar_ids};
