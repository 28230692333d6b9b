// Sat Jan 17 2026 - Alex

use crate::container::{Assembler, BlockStore};
use crate::disasm::Disassembler;
use crate::memory::Address;
use crate::relocation::{
    CodeBlock, ConvertibleOffsetRegistry, OffsetMapper, OffsetOverrides, OffsetResolutionMap,
    RelocationError, RelocationResult, Rewriter,
};
use std::ops::Range;

/// First special process id that belongs to the project rather than the game.
pub const DEFAULT_FIRST_ID: usize = 61;

/// Content of the filler blocks appended when the target table is too short.
pub const PLACEHOLDER_BLOCK: &[u8] = b"TEMP";

/// First phase of a conversion: decode blocks and collect their candidate
/// offsets. Nothing is written until [`ConversionSession::resolve`] succeeds.
pub struct ConversionSession<'a> {
    mapper: &'a OffsetMapper,
    disassembler: &'a dyn Disassembler,
    load_base: Address,
    first_id: usize,
    blocks: Vec<CodeBlock>,
    registry: ConvertibleOffsetRegistry,
}

impl<'a> ConversionSession<'a> {
    pub fn new(mapper: &'a OffsetMapper, disassembler: &'a dyn Disassembler, load_base: Address) -> Self {
        Self {
            mapper,
            disassembler,
            load_base,
            first_id: DEFAULT_FIRST_ID,
            blocks: Vec::new(),
            registry: ConvertibleOffsetRegistry::new(),
        }
    }

    pub fn with_first_id(mut self, first_id: usize) -> Self {
        self.first_id = first_id;
        self
    }

    pub fn block_ids(&self, store: &dyn BlockStore) -> Range<usize> {
        self.first_id..store.len().max(self.first_id)
    }

    pub fn blocks(&self) -> &[CodeBlock] {
        &self.blocks
    }

    pub fn registry(&self) -> &ConvertibleOffsetRegistry {
        &self.registry
    }

    pub fn mapper(&self) -> &OffsetMapper {
        self.mapper
    }

    /// Decodes block `id` of `store` and registers its candidates.
    pub fn prepare_block(&mut self, store: &dyn BlockStore, id: usize) -> RelocationResult<&CodeBlock> {
        let bytes = store.read(id)?;
        let block = CodeBlock::decode(id, self.load_base, bytes, self.disassembler, self.mapper.regions())
            .map_err(|source| RelocationError::Decode { block_id: id, source })?;

        self.registry.register(&block);
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    pub fn prepare_all(&mut self, store: &dyn BlockStore) -> RelocationResult<usize> {
        let ids = self.block_ids(store);
        let count = ids.len();
        for id in ids {
            self.prepare_block(store, id)?;
        }
        log::info!(
            "Prepared {} blocks with {} candidate offsets",
            count,
            self.registry.len()
        );
        Ok(count)
    }

    /// Resolves every candidate. Fails without side effects when any offset
    /// is left over.
    pub fn resolve(&self, overrides: &OffsetOverrides) -> RelocationResult<ReadyConversion<'_>> {
        let map = self.registry.resolve(self.mapper, overrides)?;
        Ok(ReadyConversion {
            blocks: &self.blocks,
            map,
        })
    }
}

/// A session whose offsets all resolved. Rewriting and assembling can only
/// start from here.
pub struct ReadyConversion<'s> {
    blocks: &'s [CodeBlock],
    map: OffsetResolutionMap,
}

impl<'s> ReadyConversion<'s> {
    pub fn map(&self) -> &OffsetResolutionMap {
        &self.map
    }

    pub fn blocks(&self) -> &[CodeBlock] {
        self.blocks
    }

    pub fn rewrite(&self, block: &CodeBlock) -> RelocationResult<String> {
        Rewriter::apply(block, &self.map)
    }

    /// Rewritten source of every block, keyed by block id.
    pub fn rewritten_sources(&self) -> RelocationResult<Vec<(usize, String)>> {
        self.blocks
            .iter()
            .map(|block| Ok((block.id(), self.rewrite(block)?)))
            .collect()
    }

    pub fn convert_block(
        &self,
        block: &CodeBlock,
        assembler: &dyn Assembler,
        target: &mut dyn BlockStore,
    ) -> RelocationResult<usize> {
        let source_text = self.rewrite(block)?;
        Self::store_block(block.id(), &source_text, assembler, target)
    }

    /// Rewrites, assembles and stores every block. Rewriting all blocks
    /// happens before the first write.
    pub fn convert_all(&self, assembler: &dyn Assembler, target: &mut dyn BlockStore) -> RelocationResult<usize> {
        let sources = self.rewritten_sources()?;
        for (id, source_text) in &sources {
            Self::store_block(*id, source_text, assembler, target)?;
        }
        log::info!("Converted {} blocks", sources.len());
        Ok(sources.len())
    }

    fn store_block(
        id: usize,
        source_text: &str,
        assembler: &dyn Assembler,
        target: &mut dyn BlockStore,
    ) -> RelocationResult<usize> {
        let code = assembler
            .assemble(source_text)
            .map_err(|e| RelocationError::Reassembly {
                block_id: id,
                source_text: source_text.to_string(),
                message: e.to_string(),
            })?;

        target.ensure_len(id, PLACEHOLDER_BLOCK)?;
        target.write(id, &code)?;
        log::debug!("Wrote block {} ({} bytes)", id, code.len());
        Ok(code.len())
    }
}
