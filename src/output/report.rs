// Sat Jan 17 2026 - Alex

use crate::memory::Address;
use crate::orchestration::ConversionSession;
use crate::relocation::{OffsetResolutionMap, UnresolvedOffset};
use serde::Serialize;

/// Everything a conversion run found out about its candidate offsets.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source_build: String,
    pub target_build: String,
    pub blocks: Vec<usize>,
    pub resolved: bool,
    pub offsets: Vec<OffsetEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OffsetEntry {
    pub offset: String,
    pub address: Address,
    pub region: String,
    pub target: Option<Address>,
    pub blocks: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionReport {
    /// Builds the report from a prepared session and the outcome of its
    /// resolution: the full map on success, or the offsets that failed.
    pub fn new(
        session: &ConversionSession<'_>,
        map: Option<&OffsetResolutionMap>,
        failures: &[UnresolvedOffset],
    ) -> Self {
        let mapper = session.mapper();
        let offsets = session
            .registry()
            .iter()
            .map(|(text, offset)| {
                let failure = failures.iter().find(|f| &f.offset == text);
                OffsetEntry {
                    offset: text.clone(),
                    address: offset.address,
                    region: mapper.regions().name_of(offset.region).to_string(),
                    target: map.and_then(|m| m.get(text)),
                    blocks: offset.blocks.clone(),
                    error: failure.map(|f| f.reason.to_string()),
                }
            })
            .collect();

        Self {
            source_build: mapper.source_build().to_string(),
            target_build: mapper.target_build().to_string(),
            blocks: session.blocks().iter().map(|b| b.id()).collect(),
            resolved: map.is_some(),
            offsets,
        }
    }

    pub fn unresolved_count(&self) -> usize {
        self.offsets.iter().filter(|o| o.target.is_none()).count()
    }
}
