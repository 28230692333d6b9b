// Sat Jan 17 2026 - Alex

use crate::memory::Address;
use crate::symbol::SectionSymbols;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};

pub const SECTION_START: &str = "SECTION_START";
pub const SECTION_END: &str = "SECTION_END";

/// Address -> identifier view of a section in the build being ported from.
///
/// Bounded by `SECTION_START` and `SECTION_END`. Later entries at an address
/// already taken replace the earlier name, so every address appears once.
#[derive(Debug, Clone, Default)]
pub struct SourceSymbolTable {
    by_address: BTreeMap<Address, String>,
}

impl SourceSymbolTable {
    pub fn build(section: &SectionSymbols) -> Self {
        let mut by_address = BTreeMap::new();
        by_address.insert(section.start, SECTION_START.to_string());
        for (name, address) in &section.symbols {
            by_address.insert(*address, name.clone());
        }
        by_address.insert(section.end(), SECTION_END.to_string());
        Self { by_address }
    }

    pub fn exact(&self, address: Address) -> Option<&str> {
        self.by_address.get(&address).map(String::as_str)
    }

    /// Tightest pair of entries strictly below and strictly above `address`.
    pub fn bracket(&self, address: Address) -> Option<(SymbolRef<'_>, SymbolRef<'_>)> {
        let lesser = self.by_address.range(..address).next_back()?;
        let greater = self.by_address.range((Excluded(address), Unbounded)).next()?;
        Some((
            SymbolRef { address: *lesser.0, name: lesser.1 },
            SymbolRef { address: *greater.0, name: greater.1 },
        ))
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

/// Identifier -> address view of the same section in the build being ported to.
#[derive(Debug, Clone, Default)]
pub struct TargetSymbolTable {
    by_name: HashMap<String, Address>,
}

impl TargetSymbolTable {
    pub fn build(section: &SectionSymbols) -> Self {
        let mut by_name = HashMap::with_capacity(section.symbols.len() + 2);
        by_name.insert(SECTION_START.to_string(), section.start);
        for (name, address) in &section.symbols {
            by_name.insert(name.clone(), *address);
        }
        by_name.insert(SECTION_END.to_string(), section.end());
        Self { by_name }
    }

    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRef<'a> {
    pub address: Address,
    pub name: &'a str,
}

/// Both views of one region, built together.
#[derive(Debug, Clone, Default)]
pub struct SymbolTablePair {
    pub source: SourceSymbolTable,
    pub target: TargetSymbolTable,
}

impl SymbolTablePair {
    pub fn build(source: &SectionSymbols, target: &SectionSymbols) -> Self {
        Self {
            source: SourceSymbolTable::build(source),
            target: TargetSymbolTable::build(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(start: u32, length: u32, symbols: &[(&str, u32)]) -> SectionSymbols {
        SectionSymbols {
            start: Address::new(start),
            length,
            symbols: symbols.iter().map(|(n, a)| (n.to_string(), Address::new(*a))).collect(),
        }
    }

    #[test]
    fn test_source_table_is_bounded_and_ordered() {
        let table = SourceSymbolTable::build(&section(0x1000, 0x100, &[("b", 0x1080), ("a", 0x1040)]));
        assert_eq!(table.len(), 4);
        assert_eq!(table.exact(Address::new(0x1000)), Some(SECTION_START));
        assert_eq!(table.exact(Address::new(0x1100)), Some(SECTION_END));

        let (lesser, greater) = table.bracket(Address::new(0x1050)).unwrap();
        assert_eq!((lesser.name, greater.name), ("a", "b"));
    }

    #[test]
    fn test_bracket_outside_range() {
        let table = SourceSymbolTable::build(&section(0x1000, 0x100, &[]));
        assert!(table.bracket(Address::new(0x0FFF)).is_none());
        assert!(table.bracket(Address::new(0x1101)).is_none());
        assert!(table.bracket(Address::new(0x1000)).is_none());
    }

    #[test]
    fn test_symbol_at_section_start_replaces_marker() {
        let table = SourceSymbolTable::build(&section(0x1000, 0x100, &[("entry", 0x1000)]));
        assert_eq!(table.exact(Address::new(0x1000)), Some("entry"));
    }

    #[test]
    fn test_target_lookup() {
        let table = TargetSymbolTable::build(&section(0x2000, 0x80, &[("a", 0x2010)]));
        assert_eq!(table.address_of("a"), Some(Address::new(0x2010)));
        assert_eq!(table.address_of(SECTION_END), Some(Address::new(0x2080)));
        assert_eq!(table.address_of("missing"), None);
    }
}
