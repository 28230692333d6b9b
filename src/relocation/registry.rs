// Sat Jan 17 2026 - Alex

use crate::memory::{Address, MemoryError, RegionId};
use crate::relocation::{
    CodeBlock, OffsetMapper, RelocationError, RelocationResult, UnresolvedOffset,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// Operator supplied translations, keyed by numeric source address so that
/// `22e0000` and `022e0000` name the same offset.
#[derive(Debug, Clone, Default)]
pub struct OffsetOverrides {
    entries: HashMap<Address, Address>,
}

impl OffsetOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses hex text pairs such as the `offset_maps` section of a project config.
    pub fn parse<'a, I>(pairs: I) -> Result<Self, MemoryError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut overrides = Self::new();
        for (source, target) in pairs {
            overrides.insert(Address::from_hex(source)?, Address::from_hex(target)?);
        }
        Ok(overrides)
    }

    pub fn insert(&mut self, source: Address, target: Address) {
        self.entries.insert(source, target);
    }

    pub fn get(&self, source: Address) -> Option<Address> {
        self.entries.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredOffset {
    pub address: Address,
    pub region: RegionId,
    pub blocks: Vec<usize>,
}

/// Every candidate offset of a conversion session, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ConvertibleOffsetRegistry {
    offsets: IndexMap<String, RegisteredOffset>,
}

impl ConvertibleOffsetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, block: &CodeBlock) {
        for (text, candidate) in block.candidates() {
            let entry = self
                .offsets
                .entry(text.clone())
                .or_insert_with(|| RegisteredOffset {
                    address: candidate.address,
                    region: candidate.region,
                    blocks: Vec::new(),
                });
            if !entry.blocks.contains(&block.id()) {
                entry.blocks.push(block.id());
            }
        }
    }

    pub fn get(&self, text: &str) -> Option<&RegisteredOffset> {
        self.offsets.get(text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegisteredOffset)> {
        self.offsets.iter()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Resolves every registered offset, overrides first. Fails with the
    /// complete list of offsets nothing could resolve.
    pub fn resolve(
        &self,
        mapper: &OffsetMapper,
        overrides: &OffsetOverrides,
    ) -> RelocationResult<OffsetResolutionMap> {
        let mut resolved = IndexMap::with_capacity(self.offsets.len());
        let mut unresolved = Vec::new();

        for (text, offset) in &self.offsets {
            if let Some(target) = overrides.get(offset.address) {
                resolved.insert(text.clone(), target);
                continue;
            }

            match mapper.translate(offset.address, Some(offset.region)) {
                Ok(target) => {
                    resolved.insert(text.clone(), target);
                }
                Err(reason) => {
                    log::debug!("Automatic translation of 0x{} failed: {}", text, reason);
                    unresolved.push(UnresolvedOffset {
                        offset: text.clone(),
                        region: mapper.regions().name_of(offset.region).to_string(),
                        reason,
                    });
                }
            }
        }

        if !unresolved.is_empty() {
            return Err(RelocationError::UnresolvedOffsets(unresolved));
        }

        Ok(OffsetResolutionMap { entries: resolved })
    }
}

/// Complete source text → target address map. Only produced when every
/// registered offset resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffsetResolutionMap {
    entries: IndexMap<String, Address>,
}

impl OffsetResolutionMap {
    pub fn get(&self, text: &str) -> Option<Address> {
        self.entries.get(text).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Address)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
