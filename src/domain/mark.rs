use serde::Serialize;

use super::error::ValidationError;

/// Lowest accepted mark
pub const MIN_MARK: f64 = 0.0;

/// Highest accepted mark
pub const MAX_MARK: f64 = 100.0;

/// Check that a numeric mark lies in the inclusive range 0..=100
///
/// NaN is never valid.
pub fn is_valid_mark(value: f64) -> bool {
    (MIN_MARK..=MAX_MARK).contains(&value)
}

/// A single extracted mark
///
/// `Absent` models an item intentionally left blank in the source file. It is
/// distinct from zero and is never written to the master sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Absent,
    Present(f64),
}

impl Mark {
    /// Parse the text of a source cell
    ///
    /// Empty (after trimming) yields `Absent`. Anything else must parse as a
    /// float within range.
    pub fn parse(cell: &str, raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::Absent);
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::MarkNotNumeric {
                cell: cell.to_string(),
                value: trimmed.to_string(),
            })?;

        if !is_valid_mark(value) {
            return Err(ValidationError::MarkOutOfRange {
                cell: cell.to_string(),
                value: trimmed.to_string(),
            });
        }

        Ok(Self::Present(value))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Absent => None,
            Self::Present(v) => Some(*v),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}
