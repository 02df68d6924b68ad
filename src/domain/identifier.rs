use std::fmt;

use serde::Serialize;

use super::error::ValidationError;

/// Check that an identifier is non-empty and purely ASCII alphanumeric
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validated student identifier
///
/// Always non-empty and matching `[A-Za-z0-9]+`. Surrounding whitespace is
/// trimmed before validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Parse a raw cell value into an identifier
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        if !is_valid_identifier(trimmed) {
            return Err(ValidationError::InvalidIdentifier(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against an unvalidated cell value
    pub fn matches(&self, cell_value: &str) -> bool {
        self.0.eq_ignore_ascii_case(cell_value.trim())
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
