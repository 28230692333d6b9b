// Sat Jan 17 2026 - Alex

use crate::container::StoreError;
use crate::disasm::DecodeError;
use crate::memory::Address;
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

fn signed_hex(value: &i64) -> String {
    let value = *value;
    if value < 0 {
        format!("-0x{:x}", value.unsigned_abs())
    } else {
        format!("0x{:x}", value)
    }
}

/// An address that cannot be translated automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnmappableOffset {
    #[error("Offset {address} isn't within any known region")]
    UnknownRegion { address: Address },

    #[error("Offset {address} in {region} lies outside the symbol range of the region")]
    OutsideSymbolRange { address: Address, region: String },

    #[error(
        "Offset {address} in {region} is not mappable, distance between nearest symbols ({lesser} and {greater}) differs between source ({}) and target ({})",
        signed_hex(.source_distance),
        signed_hex(.target_distance)
    )]
    DistanceMismatch {
        address: Address,
        region: String,
        lesser: String,
        greater: String,
        source_distance: i64,
        target_distance: i64,
    },

    #[error("Offset {address} in {region} depends on symbol {symbol}, which the target build does not have")]
    MissingTargetSymbol {
        address: Address,
        region: String,
        symbol: String,
    },

    #[error("Symbol tables for {region} could not be built: {message}")]
    SymbolTable { region: String, message: String },
}

/// A registered candidate that neither the mapper nor the overrides could resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedOffset {
    pub offset: String,
    pub region: String,
    pub reason: UnmappableOffset,
}

impl fmt::Display for UnresolvedOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{} in {} ({})", self.offset, self.region, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum RelocationError {
    #[error("Decode error in block {block_id}: {source}")]
    Decode {
        block_id: usize,
        #[source]
        source: DecodeError,
    },

    #[error(
        "{} offsets could not be automatically converted, provide them through config: {}",
        .0.len(),
        .0.iter().map(|u| u.to_string()).join(", ")
    )]
    UnresolvedOffsets(Vec<UnresolvedOffset>),

    #[error("Offset {offset} used by block {block_id} has no resolution")]
    MissingResolution { block_id: usize, offset: String },

    #[error("Assembler rejected block {block_id}: {message}")]
    Reassembly {
        block_id: usize,
        source_text: String,
        message: String,
    },

    #[error("Block store error: {0}")]
    Store(#[from] StoreError),
}

pub type RelocationResult<T> = Result<T, RelocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_names_symbols_and_distances() {
        let err = UnmappableOffset::DistanceMismatch {
            address: Address::new(0x2001234),
            region: "arm9".to_string(),
            lesser: "FuncA".to_string(),
            greater: "FuncB".to_string(),
            source_distance: 0x40,
            target_distance: 0x44,
        };
        let text = err.to_string();
        assert!(text.contains("0x2001234"));
        assert!(text.contains("FuncA") && text.contains("FuncB"));
        assert!(text.contains("0x40") && text.contains("0x44"));
    }

    #[test]
    fn test_unresolved_lists_every_offset() {
        let reason = UnmappableOffset::UnknownRegion { address: Address::new(0x10) };
        let err = RelocationError::UnresolvedOffsets(vec![
            UnresolvedOffset { offset: "2001000".into(), region: "arm9".into(), reason: reason.clone() },
            UnresolvedOffset { offset: "22e0000".into(), region: "overlay11".into(), reason },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 offsets"));
        assert!(text.contains("0x2001000 in arm9"));
        assert!(text.contains("0x22e0000 in overlay11"));
    }
}
