// Sat Jan 17 2026 - Alex

use crate::memory::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the last byte of a range is `start + length` itself or the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndBound {
    #[default]
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    start: Address,
    length: u32,
    end_bound: EndBound,
}

impl MemoryRange {
    pub fn new(start: Address, length: u32, end_bound: EndBound) -> Self {
        Self { start, length, end_bound }
    }

    pub fn inclusive(start: Address, length: u32) -> Self {
        Self::new(start, length, EndBound::Inclusive)
    }

    pub fn exclusive(start: Address, length: u32) -> Self {
        Self::new(start, length, EndBound::Exclusive)
    }

    pub fn start(&self) -> Address {
        self.start
    }

    /// `start + length`. Whether this address belongs to the range depends on the end bound.
    pub fn end(&self) -> Address {
        self.start + self.length
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn end_bound(&self) -> EndBound {
        self.end_bound
    }

    pub fn contains(&self, addr: Address) -> bool {
        let addr = addr.as_u32() as u64;
        let start = self.start.as_u32() as u64;
        let end = start + self.length as u64;
        match self.end_bound {
            EndBound::Inclusive => addr >= start && addr <= end,
            EndBound::Exclusive => addr >= start && addr < end,
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        let (a_start, a_last) = self.span();
        let (b_start, b_last) = other.span();
        match (a_last, b_last) {
            (Some(a_last), Some(b_last)) => a_start <= b_last && b_start <= a_last,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.span().1.is_none()
    }

    // First and last contained address, if any.
    fn span(&self) -> (u64, Option<u64>) {
        let start = self.start.as_u32() as u64;
        let last = match self.end_bound {
            EndBound::Inclusive => Some(start + self.length as u64),
            EndBound::Exclusive if self.length > 0 => Some(start + self.length as u64 - 1),
            EndBound::Exclusive => None,
        };
        (start, last)
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_bound {
            EndBound::Inclusive => write!(f, "[{}, {}]", self.start, self.end()),
            EndBound::Exclusive => write!(f, "[{}, {})", self.start, self.end()),
        }
    }
}
