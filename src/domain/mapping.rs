use super::address::{CellAddress, Column};
use super::error::DomainError;

/// One source cell and the master column its value lands in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    pub source: CellAddress,
    pub destination: Column,
}

/// Ordered correspondence between source mark cells and master columns
///
/// Fixed for a run and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pairs: Vec<FieldPair>,
}

impl FieldMapping {
    /// Build a mapping from parallel lists of source cells and destination columns
    pub fn new(sources: Vec<CellAddress>, destinations: Vec<Column>) -> Result<Self, DomainError> {
        if sources.len() != destinations.len() {
            return Err(DomainError::MappingLengthMismatch {
                sources: sources.len(),
                destinations: destinations.len(),
            });
        }
        if sources.is_empty() {
            return Err(DomainError::EmptyMapping);
        }

        let pairs = sources
            .into_iter()
            .zip(destinations)
            .map(|(source, destination)| FieldPair {
                source,
                destination,
            })
            .collect();

        Ok(Self { pairs })
    }

    /// Parse textual cell and column lists
    pub fn parse<S: AsRef<str>>(sources: &[S], destinations: &[S]) -> Result<Self, DomainError> {
        let sources = sources
            .iter()
            .map(|s| CellAddress::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let destinations = destinations
            .iter()
            .map(|d| Column::parse(d.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(sources, destinations)
    }

    pub fn pairs(&self) -> &[FieldPair] {
        &self.pairs
    }

    pub fn sources(&self) -> impl Iterator<Item = &CellAddress> {
        self.pairs.iter().map(|p| &p.source)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &Column> {
        self.pairs.iter().map(|p| &p.destination)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
