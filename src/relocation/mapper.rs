// Sat Jan 17 2026 - Alex

use crate::memory::{Address, Region, RegionId, RegionTable, Translation};
use crate::relocation::UnmappableOffset;
use crate::symbol::{SymbolError, SymbolSource, SymbolTableCache, SymbolTablePair};
use std::sync::Arc;

/// Translates source-build addresses into the target build.
///
/// Shifted regions move by their constant delta. Symbol regions are
/// translated through a pair of symbol tables that are built on first use
/// and kept for the lifetime of the mapper.
pub struct OffsetMapper {
    regions: RegionTable,
    symbols: Box<dyn SymbolSource>,
    source_build: String,
    target_build: String,
    cache: SymbolTableCache,
}

impl OffsetMapper {
    pub fn new(
        regions: RegionTable,
        symbols: Box<dyn SymbolSource>,
        source_build: &str,
        target_build: &str,
    ) -> Self {
        Self {
            regions,
            symbols,
            source_build: source_build.to_string(),
            target_build: target_build.to_string(),
            cache: SymbolTableCache::new(),
        }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn source_build(&self) -> &str {
        &self.source_build
    }

    pub fn target_build(&self) -> &str {
        &self.target_build
    }

    /// Translates `address`. A `hint` skips classification when the caller
    /// already knows the region.
    pub fn translate(&self, address: Address, hint: Option<RegionId>) -> Result<Address, UnmappableOffset> {
        let region = hint
            .or_else(|| self.regions.classify(address))
            .and_then(|id| self.regions.get(id))
            .ok_or(UnmappableOffset::UnknownRegion { address })?;

        match region.translation() {
            Translation::Shift { delta } => Ok(address.offset(*delta)),
            Translation::Symbols { section } => {
                let tables = self.tables(region, section)?;
                Self::translate_by_symbols(address, region, &tables)
            }
        }
    }

    fn tables(&self, region: &Region, section: &str) -> Result<Arc<SymbolTablePair>, UnmappableOffset> {
        let build = || -> Result<SymbolTablePair, SymbolError> {
            let source = self.symbols.section(section, &self.source_build)?;
            let target = self.symbols.section(section, &self.target_build)?;
            let pair = SymbolTablePair::build(&source, &target);
            log::debug!(
                "Built symbol tables for {}: {} source entries, {} target entries",
                region.name(),
                pair.source.len(),
                pair.target.len()
            );
            Ok(pair)
        };

        self.cache
            .get_or_try_build(region.name(), build)
            .map_err(|e| UnmappableOffset::SymbolTable {
                region: region.name().to_string(),
                message: e.to_string(),
            })
    }

    fn translate_by_symbols(
        address: Address,
        region: &Region,
        tables: &SymbolTablePair,
    ) -> Result<Address, UnmappableOffset> {
        let target_of = |symbol: &str| {
            tables.target.address_of(symbol).ok_or_else(|| UnmappableOffset::MissingTargetSymbol {
                address,
                region: region.name().to_string(),
                symbol: symbol.to_string(),
            })
        };

        // Exactly on a symbol: no arithmetic needed.
        if let Some(symbol) = tables.source.exact(address) {
            return target_of(symbol);
        }

        let (lesser, greater) = tables.source.bracket(address).ok_or_else(|| {
            UnmappableOffset::OutsideSymbolRange {
                address,
                region: region.name().to_string(),
            }
        })?;

        let lesser_target = target_of(lesser.name)?;
        let greater_target = target_of(greater.name)?;

        let source_distance = greater.address - lesser.address;
        let target_distance = greater_target - lesser_target;
        if source_distance != target_distance {
            return Err(UnmappableOffset::DistanceMismatch {
                address,
                region: region.name().to_string(),
                lesser: lesser.name.to_string(),
                greater: greater.name.to_string(),
                source_distance,
                target_distance,
            });
        }

        Ok(lesser_target.offset(address - lesser.address))
    }
}
