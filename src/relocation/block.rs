// Sat Jan 17 2026 - Alex

use crate::disasm::arm::is_condition;
use crate::disasm::{DecodeError, Disassembler, InstructionSet, RawInstruction};
use crate::memory::{Address, RegionId, RegionTable};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub const INSTRUCTION_WIDTH: usize = 4;
const PIPELINE_OFFSET: i64 = 8;
const INDENT: &str = "        ";

static PC_LITERAL_LOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ldr(?:eq|ne|hs|lo|mi|pl|vs|vc|hi|ls|ge|lt|gt|le)?$").unwrap()
});

static PC_LITERAL_OPERAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+, \[pc(?:, #(-)?(?:0x([0-9a-f]+)|(\d+)))?\]$").unwrap()
});

/// An address-valued operand found in a block, and the rendered lines that
/// mention it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub address: Address,
    pub region: RegionId,
    pub lines: Vec<usize>,
}

/// Undecoded block bytes together with their load address.
#[derive(Debug, Clone)]
pub struct RawBlock {
    id: usize,
    base: Address,
    bytes: Vec<u8>,
}

impl RawBlock {
    pub fn new(id: usize, base: Address, bytes: Vec<u8>) -> Self {
        Self { id, base, bytes }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Runs the disassembler over the whole block. Any instruction that is
    /// not exactly one word wide poisons the block.
    pub fn disassemble(self, disassembler: &dyn Disassembler) -> Result<DisassembledBlock, DecodeError> {
        if self.bytes.len() % INSTRUCTION_WIDTH != 0 {
            return Err(DecodeError::MisalignedBuffer { len: self.bytes.len() });
        }
        let instructions = disassembler.disassemble(&self.bytes, self.base, InstructionSet::Arm)?;

        if let Some(bad) = instructions.iter().find(|i| i.size != INSTRUCTION_WIDTH) {
            return Err(DecodeError::UnsupportedWidth {
                address: bad.address,
                size: bad.size,
            });
        }

        Ok(DisassembledBlock {
            id: self.id,
            base: self.base,
            bytes: self.bytes,
            instructions,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DisassembledBlock {
    id: usize,
    base: Address,
    bytes: Vec<u8>,
    instructions: Vec<RawInstruction>,
}

impl DisassembledBlock {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn instructions(&self) -> &[RawInstruction] {
        &self.instructions
    }

    /// Addresses of every word loaded pc-relative from inside the block.
    fn literal_addresses(&self) -> HashSet<Address> {
        let end = self.base + self.bytes.len() as u32;

        self.instructions
            .iter()
            .filter_map(|insn| {
                let displacement = pc_literal_displacement(insn)?;
                let target = insn.address.offset(PIPELINE_OFFSET + displacement);
                (target.is_aligned(4) && target >= self.base && target < end).then_some(target)
            })
            .collect()
    }

    fn word_at(&self, address: Address) -> Option<u32> {
        let start = usize::try_from(address - self.base).ok()?;
        let word = self.bytes.get(start..start + INSTRUCTION_WIDTH)?;
        Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
    }

    /// Renders the block and records every candidate offset that falls in a
    /// known region.
    pub fn find_candidates(self, regions: &RegionTable) -> CodeBlock {
        let literals = self.literal_addresses();
        let base_text = self.base.to_hex();

        let mut block = CodeBlock {
            id: self.id,
            base: self.base,
            lines: vec![
                ".relativeinclude on".to_string(),
                ".nds".to_string(),
                ".arm".to_string(),
                String::new(),
                "; File creation".to_string(),
                format!(".create \"./code_out.bin\", 0x{}", base_text),
                format!("    .org 0x{}", base_text),
            ],
            candidates: IndexMap::new(),
        };

        let header_lines = block.lines.len();
        block.try_add_candidate(&base_text, header_lines - 2, regions);
        block.try_add_candidate(&base_text, header_lines - 1, regions);

        for insn in &self.instructions {
            let line = block.lines.len();

            if let Some(value) = literals.contains(&insn.address).then(|| self.word_at(insn.address)).flatten() {
                let word = format!("{:08x}", value);
                block.lines.push(format!("{}.word 0x{}", INDENT, word));
                block.try_add_candidate(&word, line, regions);
                continue;
            }

            let mnemonic = normalize_mnemonic(&insn.mnemonic);
            let rendered = format!("{}{} {}", INDENT, mnemonic, insn.op_str);
            block.lines.push(rendered.trim_end().to_string());

            if let Some(target) = branch_target(&mnemonic, &insn.op_str) {
                block.try_add_candidate(target, line, regions);
            }
        }

        block.lines.push(".close".to_string());

        log::info!(
            "Decoded block {}: {} instructions, {} literals, {} candidate offsets",
            block.id,
            self.instructions.len(),
            literals.len(),
            block.candidates.len()
        );

        block
    }
}

/// A fully decoded block: rendered assembly text plus its candidate offsets.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    id: usize,
    base: Address,
    lines: Vec<String>,
    candidates: IndexMap<String, Candidate>,
}

impl CodeBlock {
    pub fn decode(
        id: usize,
        base: Address,
        bytes: Vec<u8>,
        disassembler: &dyn Disassembler,
        regions: &RegionTable,
    ) -> Result<Self, DecodeError> {
        Ok(RawBlock::new(id, base, bytes)
            .disassemble(disassembler)?
            .find_candidates(regions))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn candidates(&self) -> &IndexMap<String, Candidate> {
        &self.candidates
    }

    /// Records `offset_text` as referenced from `line`. Text that is already a
    /// candidate keeps its first classification; text outside every region is
    /// dropped.
    pub fn try_add_candidate(&mut self, offset_text: &str, line: usize, regions: &RegionTable) -> bool {
        if let Some(candidate) = self.candidates.get_mut(offset_text) {
            candidate.lines.push(line);
            return true;
        }

        let Ok(address) = Address::from_hex(offset_text) else {
            return false;
        };
        match regions.classify(address) {
            Some(region) => {
                self.candidates.insert(
                    offset_text.to_string(),
                    Candidate {
                        address,
                        region,
                        lines: vec![line],
                    },
                );
                true
            }
            None => false,
        }
    }
}

fn pc_literal_displacement(insn: &RawInstruction) -> Option<i64> {
    if !PC_LITERAL_LOAD.is_match(&insn.mnemonic) {
        return None;
    }
    let caps = PC_LITERAL_OPERAND.captures(&insn.op_str)?;

    let magnitude = match (caps.get(2), caps.get(3)) {
        (Some(hex), _) => i64::from_str_radix(hex.as_str(), 16).ok()?,
        (None, Some(dec)) => dec.as_str().parse::<i64>().ok()?,
        (None, None) => 0,
    };

    Some(if caps.get(1).is_some() { -magnitude } else { magnitude })
}

/// Hex digits of the target of an immediate `b`/`bl`, with or without condition.
fn branch_target<'a>(mnemonic: &str, op_str: &'a str) -> Option<&'a str> {
    let is_branch = ["bl", "b"].iter().any(|base| {
        mnemonic
            .strip_prefix(base)
            .map(|cond| cond.is_empty() || is_condition(cond))
            .unwrap_or(false)
    });

    if is_branch {
        op_str.strip_prefix("#0x")
    } else {
        None
    }
}

/// armips wants the addressing mode spelled out on block transfers.
fn normalize_mnemonic(mnemonic: &str) -> String {
    for base in ["ldm", "stm"] {
        if let Some(cond) = mnemonic.strip_prefix(base) {
            if cond.is_empty() || is_condition(cond) {
                return format!("{}ia{}", base, cond);
            }
        }
    }
    mnemonic.to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::disasm::A32Disassembler;
    use crate::memory::{MemoryRange, Region};

    pub(crate) fn test_regions() -> RegionTable {
        RegionTable::new(vec![
            Region::symbols("overlay11", "overlay11", MemoryRange::inclusive(Address::new(0x22D0000), 0x20000)),
            Region::shifted(
                "special_process",
                MemoryRange::inclusive(Address::new(0x22F1000), 0x810),
                Address::new(0x22F06C0),
            ),
        ])
        .unwrap()
    }

    pub(crate) fn words(code: &[u32]) -> Vec<u8> {
        code.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    pub(crate) fn bl(from: u32, to: u32) -> u32 {
        let offset = (to as i64 - (from as i64 + 8)) >> 2;
        0xEB00_0000 | (offset as u32 & 0x00FF_FFFF)
    }

    struct WidthThree;

    impl Disassembler for WidthThree {
        fn disassemble(
            &self,
            _code: &[u8],
            base: Address,
            _mode: InstructionSet,
        ) -> Result<Vec<RawInstruction>, DecodeError> {
            Ok(vec![
                RawInstruction::new(base, 4, "mov", "r0, #1"),
                RawInstruction::new(base + 4, 3, "mov", "r0, #2"),
            ])
        }
    }

    /// Reports whole words regardless of how many bytes it was given.
    struct WordsOnly;

    impl Disassembler for WordsOnly {
        fn disassemble(
            &self,
            _code: &[u8],
            base: Address,
            _mode: InstructionSet,
        ) -> Result<Vec<RawInstruction>, DecodeError> {
            Ok(vec![
                RawInstruction::new(base, 4, "ldr", "r0, [pc]"),
                RawInstruction::new(base + 4, 4, "bx", "lr"),
            ])
        }
    }

    #[test]
    fn test_prologue_and_epilogue() {
        let base = Address::new(0x22F1000);
        let block = CodeBlock::decode(61, base, words(&[0xE12F_FF1E]), &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(
            &block.lines()[..7],
            &[
                ".relativeinclude on",
                ".nds",
                ".arm",
                "",
                "; File creation",
                ".create \"./code_out.bin\", 0x22f1000",
                "    .org 0x22f1000",
            ]
        );
        assert_eq!(block.lines()[7], "        bx lr");
        assert_eq!(block.lines().last().unwrap(), ".close");
        assert_eq!(block.candidates()["22f1000"].lines, vec![5, 6]);
    }

    #[test]
    fn test_branch_candidate() {
        let base = Address::new(0x22F1000);
        let code = words(&[0xE92D_4010, bl(0x22F1004, 0x22E0000), 0xE8BD_8010]);
        let block = CodeBlock::decode(61, base, code, &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(block.lines()[8], "        bl #0x22e0000");
        let candidate = &block.candidates()["22e0000"];
        assert_eq!(candidate.lines, vec![8]);
        assert_eq!(candidate.address, Address::new(0x22E0000));
        assert_eq!(test_regions().name_of(candidate.region), "overlay11");
    }

    #[test]
    fn test_literal_pool_is_rendered_as_word() {
        let base = Address::new(0x22F1000);
        // ldr r0, [pc, #0]; bx lr; .word 0x022e0010
        let code = words(&[0xE59F_0000, 0xE12F_FF1E, 0x022E_0010]);
        let block = CodeBlock::decode(61, base, code, &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(block.lines()[7], "        ldr r0, [pc]");
        assert_eq!(block.lines()[9], "        .word 0x022e0010");
        assert_eq!(block.candidates()["022e0010"].lines, vec![9]);
    }

    #[test]
    fn test_literal_before_its_load() {
        let base = Address::new(0x22F1000);
        // .word 0x022e0100; ldr r1, [pc, #-0xc]
        let code = words(&[0x022E_0100, 0xE51F_100C]);
        let block = CodeBlock::decode(61, base, code, &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(block.lines()[7], "        .word 0x022e0100");
        assert_eq!(block.lines()[8], "        ldr r1, [pc, #-0xc]");
        assert!(block.candidates().contains_key("022e0100"));
    }

    #[test]
    fn test_immediates_outside_regions_are_ignored() {
        let base = Address::new(0x22F1000);
        // ldr r0, [pc, #0]; bx lr; .word 0x12345678
        let code = words(&[0xE59F_0000, 0xE12F_FF1E, 0x1234_5678]);
        let block = CodeBlock::decode(61, base, code, &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(block.lines()[9], "        .word 0x12345678");
        assert_eq!(block.candidates().len(), 1);
    }

    #[test]
    fn test_repeated_offset_keeps_every_line() {
        let base = Address::new(0x22F1000);
        let code = words(&[bl(0x22F1000, 0x22E0000), bl(0x22F1004, 0x22E0000)]);
        let mut block = CodeBlock::decode(61, base, code, &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(block.candidates()["22e0000"].lines, vec![7, 8]);
        assert!(!block.try_add_candidate("1000", 3, &test_regions()));
        assert!(block.try_add_candidate("22e0000", 9, &test_regions()));
        assert_eq!(block.candidates()["22e0000"].lines, vec![7, 8, 9]);
    }

    #[test]
    fn test_block_transfer_mode_is_explicit() {
        let base = Address::new(0x22F1000);
        let code = words(&[0xE890_0006, 0x08A0_0006]);
        let block = CodeBlock::decode(61, base, code, &A32Disassembler, &test_regions()).unwrap();

        assert_eq!(block.lines()[7], "        ldmia r0, {r1, r2}");
        assert_eq!(block.lines()[8], "        stmiaeq r0!, {r1, r2}");
    }

    #[test]
    fn test_bad_width_fails_the_block() {
        let result = RawBlock::new(62, Address::new(0x22F1000), vec![0; 8]).disassemble(&WidthThree);
        assert_eq!(
            result.unwrap_err(),
            DecodeError::UnsupportedWidth {
                address: Address::new(0x22F1004),
                size: 3
            }
        );
    }

    #[test]
    fn test_short_tail_is_rejected_before_rendering() {
        let result = RawBlock::new(62, Address::new(0x22F1000), vec![0; 6]).disassemble(&WordsOnly);
        assert_eq!(result.unwrap_err(), DecodeError::MisalignedBuffer { len: 6 });

        let regions = test_regions();
        let err = CodeBlock::decode(62, Address::new(0x22F1000), vec![0; 10], &WordsOnly, &regions).unwrap_err();
        assert_eq!(err, DecodeError::MisalignedBuffer { len: 10 });
    }

    #[test]
    fn test_branch_detection() {
        assert_eq!(branch_target("bl", "#0x2001000"), Some("2001000"));
        assert_eq!(branch_target("bne", "#0x2001000"), Some("2001000"));
        assert_eq!(branch_target("blle", "#0x2001000"), Some("2001000"));
        assert_eq!(branch_target("blx", "#0x2001000"), None);
        assert_eq!(branch_target("bic", "r0, r0, #0x10"), None);
        assert_eq!(branch_target("bx", "lr"), None);
    }
}
