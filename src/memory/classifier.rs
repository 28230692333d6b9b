// Sat Jan 17 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange, Region, RegionSpec};
use std::collections::HashSet;
use std::fmt;

/// Index of a region inside its [`RegionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

impl RegionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static table of the source build's known regions.
///
/// Classification is first-match in table order, so overlapping regions are
/// resolved by the order they were declared in.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    pub fn new(regions: Vec<Region>) -> Result<Self, MemoryError> {
        let mut seen = HashSet::new();
        for region in &regions {
            if !seen.insert(region.name().to_string()) {
                return Err(MemoryError::DuplicateRegion(region.name().to_string()));
            }
            if region.range().is_empty() {
                return Err(MemoryError::EmptyRegion(region.name().to_string()));
            }
        }

        let table = Self { regions };
        for (earlier, later) in table.overlapping_pairs() {
            log::debug!(
                "Region {} overlaps {}, shared addresses classify as {}",
                table.name_of(earlier),
                table.name_of(later),
                table.name_of(earlier)
            );
        }
        Ok(table)
    }

    /// Pairs of regions sharing addresses, earlier region first. The earlier
    /// region wins classification for the shared range.
    pub fn overlapping_pairs(&self) -> Vec<(RegionId, RegionId)> {
        let mut pairs = Vec::new();
        for (i, a) in self.regions.iter().enumerate() {
            for (j, b) in self.regions.iter().enumerate().skip(i + 1) {
                if a.range().overlaps(b.range()) {
                    pairs.push((RegionId(i), RegionId(j)));
                }
            }
        }
        pairs
    }

    /// Builds the table from config descriptors. `section_bounds` supplies
    /// `(start, length)` of a section in the source build for symbol regions
    /// that do not spell out their bounds.
    pub fn from_specs<F, E>(specs: &[RegionSpec], mut section_bounds: F) -> Result<Self, MemoryError>
    where
        F: FnMut(&str) -> Result<(Address, u32), E>,
        E: fmt::Display,
    {
        let mut regions = Vec::with_capacity(specs.len());

        for spec in specs {
            let region = match spec.target_start {
                Some(target_start) => {
                    let (start, length) = match (spec.start, spec.length) {
                        (Some(start), Some(length)) => (start, length),
                        _ => return Err(MemoryError::MissingBounds(spec.name.clone())),
                    };
                    let range = MemoryRange::new(start, length, spec.end_bound);
                    Region::shifted(&spec.name, range, target_start)
                }
                None => {
                    let (start, length) = match (spec.start, spec.length) {
                        (Some(start), Some(length)) => (start, length),
                        _ => section_bounds(spec.section_name()).map_err(|e| {
                            MemoryError::SectionBounds(spec.section_name().to_string(), e.to_string())
                        })?,
                    };
                    let range = MemoryRange::new(start, length, spec.end_bound);
                    Region::symbols(&spec.name, spec.section_name(), range)
                }
            };
            log::debug!("Region {}", region);
            regions.push(region);
        }

        Self::new(regions)
    }

    pub fn classify(&self, addr: Address) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.contains(addr))
            .map(RegionId)
    }

    /// Classifies hex text such as `22e0000` or `0x022E0000`.
    pub fn classify_text(&self, text: &str) -> Option<RegionId> {
        Address::from_hex(text).ok().and_then(|addr| self.classify(addr))
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn name_of(&self, id: RegionId) -> &str {
        self.get(id).map(|r| r.name()).unwrap_or("unknown")
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions.iter().enumerate().map(|(i, r)| (RegionId(i), r))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::region::default_region_specs;

    fn eos_table() -> RegionTable {
        RegionTable::from_specs(&default_region_specs(), |section| match section {
            "arm9" => Ok((Address::new(0x2000000), 0xB8CB8)),
            "overlay10" => Ok((Address::new(0x22BD3C0), 0x1F7A0)),
            "overlay11" => Ok((Address::new(0x22DD8E0), 0x48E40)),
            other => Err(format!("no section {}", other)),
        })
        .unwrap()
    }

    #[test]
    fn test_first_match_wins_for_overlaps() {
        let table = eos_table();
        let id = table.classify(Address::new(0x22E7B88)).unwrap();
        assert_eq!(table.name_of(id), "overlay11");

        let id = table.classify(Address::new(0x23A7080)).unwrap();
        assert_eq!(table.name_of(id), "overlay36");

        let pairs: Vec<(&str, &str)> = table
            .overlapping_pairs()
            .into_iter()
            .map(|(a, b)| (table.name_of(a), table.name_of(b)))
            .collect();
        assert_eq!(pairs, vec![("overlay11", "special_process")]);
    }

    #[test]
    fn test_unknown_address() {
        let table = eos_table();
        assert_eq!(table.classify(Address::new(0x10)), None);
        assert_eq!(table.classify_text("not hex"), None);
        assert!(table.classify_text("0x2000004").is_some());
    }

    #[test]
    fn test_missing_section_bounds_is_reported() {
        let specs = vec![RegionSpec::symbols("overlay29")];
        let err = RegionTable::from_specs(&specs, |_| Err::<(Address, u32), _>("missing")).unwrap_err();
        assert!(matches!(err, MemoryError::SectionBounds(ref s, _) if s == "overlay29"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let range = MemoryRange::inclusive(Address::new(0x1000), 0x10);
        let regions = vec![
            Region::shifted("a", range, Address::new(0x2000)),
            Region::shifted("a", range, Address::new(0x3000)),
        ];
        assert!(matches!(RegionTable::new(regions), Err(MemoryError::DuplicateRegion(_))));
    }
}
