// Sat Jan 17 2026 - Alex

use crate::memory::{Address, EndBound, MemoryRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How addresses inside a region move between the source and target build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Recompiled contents; translated through the section's symbol tables.
    Symbols { section: String },
    /// Moved as a whole by a constant delta (zero for regions that never move).
    Shift { delta: i64 },
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::Symbols { section } => write!(f, "symbols({})", section),
            Translation::Shift { delta } if *delta < 0 => write!(f, "shift(-0x{:x})", delta.unsigned_abs()),
            Translation::Shift { delta } => write!(f, "shift(+0x{:x})", delta),
        }
    }
}

/// A named address range of the source build.
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    range: MemoryRange,
    translation: Translation,
}

impl Region {
    pub fn new(name: &str, range: MemoryRange, translation: Translation) -> Self {
        Self {
            name: name.to_string(),
            range,
            translation,
        }
    }

    pub fn symbols(name: &str, section: &str, range: MemoryRange) -> Self {
        Self::new(name, range, Translation::Symbols { section: section.to_string() })
    }

    pub fn shifted(name: &str, range: MemoryRange, target_start: Address) -> Self {
        let delta = target_start.distance(range.start());
        Self::new(name, range, Translation::Shift { delta })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &MemoryRange {
        &self.range
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    pub fn start(&self) -> Address {
        self.range.start()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.range.contains(addr)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.range, self.translation)
    }
}

/// Region descriptor as written in a project config.
///
/// A descriptor with `target_start` is a shifted region and needs explicit bounds.
/// Without it the region is translated by symbols; missing bounds are then taken
/// from the source build's section header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default)]
    pub end_bound: EndBound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_start: Option<Address>,
}

impl RegionSpec {
    pub fn symbols(name: &str) -> Self {
        Self {
            name: name.to_string(),
            section: None,
            start: None,
            length: None,
            end_bound: EndBound::Inclusive,
            target_start: None,
        }
    }

    pub fn shifted(name: &str, start: u32, length: u32, target_start: u32) -> Self {
        Self {
            name: name.to_string(),
            section: None,
            start: Some(Address::new(start)),
            length: Some(length),
            end_bound: EndBound::Inclusive,
            target_start: Some(Address::new(target_start)),
        }
    }

    pub fn section_name(&self) -> &str {
        self.section.as_deref().unwrap_or(&self.name)
    }

    pub fn is_shifted(&self) -> bool {
        self.target_start.is_some()
    }
}

/// The region layout of Explorers of Sky EU, in classification order.
///
/// overlay11 overlaps the special-process area and must stay ahead of it.
pub fn default_region_specs() -> Vec<RegionSpec> {
    vec![
        RegionSpec::symbols("arm9"),
        RegionSpec::symbols("overlay10"),
        RegionSpec::symbols("overlay11"),
        RegionSpec::shifted("special_process", 0x22E7B88, 0x810, 0x22E7248),
        RegionSpec::shifted("overlay36", 0x23A7080, 0x38F80, 0x23A7080),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_region_delta() {
        let region = Region::shifted(
            "special_process",
            MemoryRange::inclusive(Address::new(0x22E7B88), 0x810),
            Address::new(0x22E7248),
        );
        assert_eq!(region.translation(), &Translation::Shift { delta: -0x940 });
        assert_eq!(region.translation().to_string(), "shift(-0x940)");
    }

    #[test]
    fn test_spec_yaml_shape() {
        let yaml = "name: special_process\nstart: 0x22E7B88\nlength: 0x810\ntarget_start: '0x22E7248'\n";
        let spec: RegionSpec = serde_yaml::from_str(yaml).unwrap();
        assert!(spec.is_shifted());
        assert_eq!(spec.start, Some(Address::new(0x22E7B88)));
        assert_eq!(spec.target_start, Some(Address::new(0x22E7248)));
        assert_eq!(spec.end_bound, EndBound::Inclusive);
        assert_eq!(spec.section_name(), "special_process");
    }
}
