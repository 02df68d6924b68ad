use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

/// Column reference in letter form (`A`, `I`, `AB`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(String);

impl Column {
    /// Parse a column reference, normalising to upper case
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(DomainError::InvalidColumn(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Zero-based column index (`A` = 0)
    pub fn index(&self) -> usize {
        self.0
            .bytes()
            .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize)
            - 1
    }

    /// Address of this column at a one-based row
    pub fn at(&self, row: u32) -> CellAddress {
        CellAddress {
            column: self.clone(),
            row,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Column {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Flat cell address: column letters followed by a one-based row number
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    column: Column,
    row: u32,
}

impl CellAddress {
    /// Parse an address such as `C6` or `ab12`
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| DomainError::InvalidCellAddress(raw.to_string()))?;
        let (letters, digits) = trimmed.split_at(split);

        let column =
            Column::parse(letters).map_err(|_| DomainError::InvalidCellAddress(raw.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| DomainError::InvalidCellAddress(raw.to_string()))?;
        if row == 0 {
            return Err(DomainError::InvalidCellAddress(raw.to_string()));
        }

        Ok(Self { column, row })
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    /// One-based row number
    pub fn row(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl FromStr for CellAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
