use thiserror::Error;

/// Structural errors in addresses and mappings, raised while building run settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid cell address: {0}")]
    InvalidCellAddress(String),

    #[error("Invalid column reference: {0}")]
    InvalidColumn(String),

    #[error("Field mapping is empty")]
    EmptyMapping,

    #[error("Field mapping length mismatch: {sources} source cells, {destinations} destination columns")]
    MappingLengthMismatch { sources: usize, destinations: usize },
}

/// Data validation failures for a single extracted value
///
/// These are never retried: re-reading a malformed cell cannot fix it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("student ID is empty")]
    EmptyIdentifier,

    #[error("student ID '{0}' contains invalid characters (only alphanumeric allowed)")]
    InvalidIdentifier(String),

    #[error("mark in cell {cell} is not a valid number (value: {value})")]
    MarkNotNumeric { cell: String, value: String },

    #[error("mark in cell {cell} is outside valid range 0-100 (value: {value})")]
    MarkOutOfRange { cell: String, value: String },
}

impl ValidationError {
    /// Name of the field this failure is attributed to
    pub fn field(&self) -> String {
        match self {
            Self::EmptyIdentifier | Self::InvalidIdentifier(_) => "student_id".to_string(),
            Self::MarkNotNumeric { cell, .. } | Self::MarkOutOfRange { cell, .. } => {
                format!("mark_{}", cell)
            }
        }
    }
}
