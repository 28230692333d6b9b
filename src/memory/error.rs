// Sat Jan 17 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Invalid hex address: {0:?}")]
    InvalidHex(String),
    #[error("Region {0} is declared more than once")]
    DuplicateRegion(String),
    #[error("Region {0} contains no addresses")]
    EmptyRegion(String),
    #[error("Shifted region {0} needs explicit start and length")]
    MissingBounds(String),
    #[error("Could not read bounds of section {0}: {1}")]
    SectionBounds(String, String),
}
