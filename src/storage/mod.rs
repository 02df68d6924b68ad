pub mod backup;
pub mod error;
pub mod master;
#[cfg(test)]
pub mod memory;
pub mod source;
pub mod traits;

// Re-export commonly used types
pub use backup::{save_output_copy, snapshot};
pub use error::{BackupError, WorkbookError};
pub use master::{XlsxMasterDocument, XlsxMasterStore};
pub use source::{CalamineOpener, CalamineWorkbook};
pub use traits::{MasterDocument, MasterStore, SourceOpener, SourceWorkbook, round_to};
