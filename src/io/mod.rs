pub mod discovery;
pub mod error;
pub mod extractor;

// Re-export commonly used types
pub use discovery::{Discovery, SUPPORTED_EXTENSIONS, discover, has_supported_extension};
pub use error::{DiscoveryError, ExtractionError, ExtractionStage};
pub use extractor::{ExtractionSettings, RecordExtractor};
