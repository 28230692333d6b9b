// Sat Jan 17 2026 - Alex

use crate::relocation::{CodeBlock, OffsetResolutionMap, RelocationError, RelocationResult};

pub struct Rewriter;

impl Rewriter {
    /// Produces the rewritten text of `block`. Only the recorded lines are
    /// touched; the block itself is left as decoded.
    pub fn apply(block: &CodeBlock, map: &OffsetResolutionMap) -> RelocationResult<String> {
        Ok(Self::apply_lines(block, map)?.join("\n"))
    }

    pub fn apply_lines(block: &CodeBlock, map: &OffsetResolutionMap) -> RelocationResult<Vec<String>> {
        let mut lines = block.lines().to_vec();

        for (text, candidate) in block.candidates() {
            let target = map.get(text).ok_or_else(|| RelocationError::MissingResolution {
                block_id: block.id(),
                offset: text.clone(),
            })?;
            // Keep the width of the original text so padded literals stay padded.
            let replacement = format!("{:0width$x}", target.as_u32(), width = text.len());

            for &index in &candidate.lines {
                if let Some(line) = lines.get_mut(index) {
                    *line = line.replace(text.as_str(), &replacement);
                }
            }
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::A32Disassembler;
    use crate::memory::Address;
    use crate::relocation::block::tests::{bl, words};
    use crate::relocation::mapper::tests::test_mapper;
    use crate::relocation::{ConvertibleOffsetRegistry, OffsetOverrides};

    fn sample_block() -> CodeBlock {
        let code = [
            0xE92D_4010,
            bl(0x22F1004, 0x22E0000),
            0xE59F_0004,
            bl(0x22F100C, 0x22E0000),
            0xE8BD_8010,
            0x022E_0010,
        ];
        CodeBlock::decode(61, Address::new(0x22F1000), words(&code), &A32Disassembler, test_mapper().regions())
            .unwrap()
    }

    fn identity_map(block: &CodeBlock) -> OffsetResolutionMap {
        let mapper = test_mapper();
        let mut registry = ConvertibleOffsetRegistry::new();
        registry.register(block);
        let mut overrides = OffsetOverrides::new();
        for (_, candidate) in block.candidates() {
            overrides.insert(candidate.address, candidate.address);
        }
        registry.resolve(&mapper, &overrides).unwrap()
    }

    #[test]
    fn test_rewrite_translates_recorded_lines() {
        let block = sample_block();
        let mapper = test_mapper();
        let mut registry = ConvertibleOffsetRegistry::new();
        registry.register(&block);
        let map = registry.resolve(&mapper, &OffsetOverrides::new()).unwrap();

        let lines = Rewriter::apply_lines(&block, &map).unwrap();
        assert_eq!(lines[5], ".create \"./code_out.bin\", 0x22f06c0");
        assert_eq!(lines[6], "    .org 0x22f06c0");
        assert_eq!(lines[8], "        bl #0x12e0000");
        assert_eq!(lines[10], "        bl #0x12e0000");
        assert_eq!(lines[12], "        .word 0x012e0010");
        assert_eq!(lines[9], block.lines()[9]);
        // The decoded block is untouched.
        assert_eq!(block.lines()[8], "        bl #0x22e0000");
    }

    #[test]
    fn test_identity_map_is_idempotent() {
        let block = sample_block();
        let map = identity_map(&block);
        assert_eq!(Rewriter::apply(&block, &map).unwrap(), block.text());
    }

    #[test]
    fn test_identity_rewrite_keeps_candidate_lines() {
        let block = sample_block();
        let map = identity_map(&block);
        let rewritten = Rewriter::apply_lines(&block, &map).unwrap();

        for (text, candidate) in block.candidates() {
            for &line in &candidate.lines {
                assert!(rewritten[line].contains(text.as_str()));
            }
        }
    }

    #[test]
    fn test_missing_resolution() {
        let block = sample_block();
        let err = Rewriter::apply(&block, &OffsetResolutionMap::default()).unwrap_err();
        assert!(matches!(err, RelocationError::MissingResolution { block_id: 61, .. }));
    }
}
