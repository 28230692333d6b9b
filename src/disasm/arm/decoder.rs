// Sat Jan 17 2026 - Alex

use super::{
    condition_suffix, immediate, immediate_shift, register_list, register_name, shift_name,
    signed_immediate,
};
use crate::disasm::{DecodeError, Disassembler, InstructionSet, RawInstruction};
use crate::memory::Address;

const DATA_PROCESSING: [&str; 16] = [
    "and", "eor", "sub", "rsb", "add", "adc", "sbc", "rsc", "tst", "teq", "cmp", "cmn", "orr", "mov", "bic", "mvn",
];

/// Decoder for the 32-bit ARM (A32) encodings found in ARMv5TE code.
///
/// Only the operand forms needed to re-assemble a block are produced.
/// Anything else comes out as a `.word` so it re-assembles to the same bytes.
pub struct A32Decoder;

impl A32Decoder {
    pub fn decode(raw: u32, addr: Address) -> RawInstruction {
        let cond = raw >> 28;
        let op1 = (raw >> 25) & 0x7;

        if cond == 0xF {
            return Self::decode_unconditional(raw, addr);
        }

        match op1 {
            0b000 => Self::decode_group_zero(raw, addr),
            0b001 => Self::decode_data_processing_imm(raw, addr),
            0b010 => Self::decode_load_store(raw, addr),
            0b011 if raw & 0x10 == 0 => Self::decode_load_store(raw, addr),
            0b100 => Self::decode_block_transfer(raw, addr),
            0b101 => Self::decode_branch(raw, addr),
            0b111 if raw & (1 << 24) != 0 => Self::decode_svc(raw, addr),
            _ => Self::word(raw, addr),
        }
    }

    fn word(raw: u32, addr: Address) -> RawInstruction {
        RawInstruction::new(addr, 4, ".word", &format!("0x{:08x}", raw))
    }

    fn with_cond(base: &str, raw: u32) -> String {
        format!("{}{}", base, condition_suffix(raw >> 28))
    }

    fn branch_offset(raw: u32) -> i64 {
        // imm24 sign-extended and scaled to bytes
        (((raw & 0x00FF_FFFF) << 8) as i32 >> 6) as i64
    }

    fn decode_unconditional(raw: u32, addr: Address) -> RawInstruction {
        if (raw >> 25) & 0x7 == 0b101 {
            let h = ((raw >> 24) & 1) as i64;
            let target = addr.offset(8 + Self::branch_offset(raw) + (h << 1));
            return RawInstruction::new(addr, 4, "blx", &format!("#0x{:x}", target.as_u32()));
        }
        Self::word(raw, addr)
    }

    fn decode_branch(raw: u32, addr: Address) -> RawInstruction {
        let link = (raw >> 24) & 1 == 1;
        let target = addr.offset(8 + Self::branch_offset(raw));
        let mnemonic = Self::with_cond(if link { "bl" } else { "b" }, raw);
        RawInstruction::new(addr, 4, &mnemonic, &format!("#0x{:x}", target.as_u32()))
    }

    fn decode_svc(raw: u32, addr: Address) -> RawInstruction {
        RawInstruction::new(addr, 4, &Self::with_cond("svc", raw), &immediate(raw & 0x00FF_FFFF))
    }

    fn decode_group_zero(raw: u32, addr: Address) -> RawInstruction {
        match raw & 0x0FFF_FFF0 {
            0x012F_FF10 => {
                return RawInstruction::new(addr, 4, &Self::with_cond("bx", raw), register_name(raw));
            }
            0x012F_FF30 => {
                return RawInstruction::new(addr, 4, &Self::with_cond("blx", raw), register_name(raw));
            }
            _ => {}
        }

        if raw & 0x0FFF_0FF0 == 0x016F_0F10 {
            let ops = format!("{}, {}", register_name(raw >> 12), register_name(raw));
            return RawInstruction::new(addr, 4, &Self::with_cond("clz", raw), &ops);
        }

        if raw & 0x90 == 0x90 {
            return if (raw >> 5) & 0x3 == 0 {
                Self::decode_multiply(raw, addr)
            } else {
                Self::decode_extra_load_store(raw, addr)
            };
        }

        let opcode = (raw >> 21) & 0xF;
        let s = (raw >> 20) & 1;
        if (8..=11).contains(&opcode) && s == 0 {
            // Status register access and friends.
            return Self::word(raw, addr);
        }

        let rm = register_name(raw);
        let operand2 = if raw & 0x10 == 0 {
            let amount = (raw >> 7) & 0x1F;
            format!("{}{}", rm, immediate_shift(raw >> 5, amount))
        } else {
            format!("{}, {} {}", rm, shift_name(raw >> 5), register_name(raw >> 8))
        };

        Self::data_processing(raw, addr, &operand2)
    }

    fn decode_data_processing_imm(raw: u32, addr: Address) -> RawInstruction {
        let opcode = (raw >> 21) & 0xF;
        let s = (raw >> 20) & 1;
        if (8..=11).contains(&opcode) && s == 0 {
            return Self::word(raw, addr);
        }

        let rotate = ((raw >> 8) & 0xF) * 2;
        let value = (raw & 0xFF).rotate_right(rotate);
        Self::data_processing(raw, addr, &immediate(value))
    }

    fn data_processing(raw: u32, addr: Address, operand2: &str) -> RawInstruction {
        let opcode = ((raw >> 21) & 0xF) as usize;
        let set_flags = (raw >> 20) & 1 == 1;
        let rn = register_name(raw >> 16);
        let rd = register_name(raw >> 12);

        let (base, ops) = match opcode {
            8..=11 => (DATA_PROCESSING[opcode].to_string(), format!("{}, {}", rn, operand2)),
            13 | 15 => {
                let base = format!("{}{}", DATA_PROCESSING[opcode], if set_flags { "s" } else { "" });
                (base, format!("{}, {}", rd, operand2))
            }
            _ => {
                let base = format!("{}{}", DATA_PROCESSING[opcode], if set_flags { "s" } else { "" });
                (base, format!("{}, {}, {}", rd, rn, operand2))
            }
        };

        RawInstruction::new(addr, 4, &Self::with_cond(&base, raw), &ops)
    }

    fn decode_multiply(raw: u32, addr: Address) -> RawInstruction {
        let s = if (raw >> 20) & 1 == 1 { "s" } else { "" };
        let rm = register_name(raw);
        let rs = register_name(raw >> 8);

        match (raw >> 23) & 0x1F {
            0b00000 => {
                let rd = register_name(raw >> 16);
                if (raw >> 21) & 1 == 1 {
                    let rn = register_name(raw >> 12);
                    let ops = format!("{}, {}, {}, {}", rd, rm, rs, rn);
                    RawInstruction::new(addr, 4, &Self::with_cond(&format!("mla{}", s), raw), &ops)
                } else {
                    let ops = format!("{}, {}, {}", rd, rm, rs);
                    RawInstruction::new(addr, 4, &Self::with_cond(&format!("mul{}", s), raw), &ops)
                }
            }
            0b00001 => {
                let base = match ((raw >> 22) & 1, (raw >> 21) & 1) {
                    (0, 0) => "umull",
                    (0, _) => "umlal",
                    (_, 0) => "smull",
                    _ => "smlal",
                };
                let rd_lo = register_name(raw >> 12);
                let rd_hi = register_name(raw >> 16);
                let ops = format!("{}, {}, {}, {}", rd_lo, rd_hi, rm, rs);
                RawInstruction::new(addr, 4, &Self::with_cond(&format!("{}{}", base, s), raw), &ops)
            }
            _ => Self::word(raw, addr),
        }
    }

    fn decode_extra_load_store(raw: u32, addr: Address) -> RawInstruction {
        let pre = (raw >> 24) & 1 == 1;
        let up = (raw >> 23) & 1 == 1;
        let imm_form = (raw >> 22) & 1 == 1;
        let writeback = (raw >> 21) & 1 == 1;
        let load = (raw >> 20) & 1 == 1;
        let sh = (raw >> 5) & 0x3;

        let (base, pair) = match (load, sh) {
            (true, 1) => ("ldrh", false),
            (true, 2) => ("ldrsb", false),
            (true, _) => ("ldrsh", false),
            (false, 1) => ("strh", false),
            (false, 2) => ("ldrd", true),
            (false, _) => ("strd", true),
        };

        let rt = (raw >> 12) & 0xF;
        let rn = register_name(raw >> 16);
        let offset = if imm_form {
            let imm = ((raw >> 4) & 0xF0) | (raw & 0xF);
            if imm == 0 && up {
                None
            } else {
                Some(signed_immediate(imm, !up))
            }
        } else {
            Some(format!("{}{}", if up { "" } else { "-" }, register_name(raw)))
        };

        let address = Self::address_operand(rn, offset, pre, writeback);
        let ops = if pair {
            format!("{}, {}, {}", register_name(rt), register_name(rt + 1), address)
        } else {
            format!("{}, {}", register_name(rt), address)
        };

        RawInstruction::new(addr, 4, &Self::with_cond(base, raw), &ops)
    }

    fn decode_load_store(raw: u32, addr: Address) -> RawInstruction {
        let reg_form = (raw >> 25) & 1 == 1;
        let pre = (raw >> 24) & 1 == 1;
        let up = (raw >> 23) & 1 == 1;
        let byte = (raw >> 22) & 1 == 1;
        let writeback = (raw >> 21) & 1 == 1;
        let load = (raw >> 20) & 1 == 1;

        let mut base = String::from(if load { "ldr" } else { "str" });
        if byte {
            base.push('b');
        }
        if !pre && writeback {
            base.push('t');
        }

        let rn = register_name(raw >> 16);
        let offset = if reg_form {
            let amount = (raw >> 7) & 0x1F;
            Some(format!(
                "{}{}{}",
                if up { "" } else { "-" },
                register_name(raw),
                immediate_shift(raw >> 5, amount)
            ))
        } else {
            let imm = raw & 0xFFF;
            if imm == 0 && up {
                None
            } else {
                Some(signed_immediate(imm, !up))
            }
        };

        let ops = format!(
            "{}, {}",
            register_name(raw >> 12),
            Self::address_operand(rn, offset, pre, writeback && pre)
        );
        RawInstruction::new(addr, 4, &Self::with_cond(&base, raw), &ops)
    }

    fn address_operand(rn: &str, offset: Option<String>, pre: bool, writeback: bool) -> String {
        match (offset, pre) {
            (None, true) => format!("[{}]{}", rn, if writeback { "!" } else { "" }),
            (None, false) => format!("[{}], #0", rn),
            (Some(offset), true) => format!("[{}, {}]{}", rn, offset, if writeback { "!" } else { "" }),
            (Some(offset), false) => format!("[{}], {}", rn, offset),
        }
    }

    fn decode_block_transfer(raw: u32, addr: Address) -> RawInstruction {
        let pre = (raw >> 24) & 1 == 1;
        let up = (raw >> 23) & 1 == 1;
        let user = (raw >> 22) & 1 == 1;
        let writeback = (raw >> 21) & 1 == 1;
        let load = (raw >> 20) & 1 == 1;
        let rn = (raw >> 16) & 0xF;
        let list = register_list(raw & 0xFFFF);
        let caret = if user { "^" } else { "" };

        if rn == 13 && writeback && !user {
            if load && !pre && up {
                return RawInstruction::new(addr, 4, &Self::with_cond("pop", raw), &list);
            }
            if !load && pre && !up {
                return RawInstruction::new(addr, 4, &Self::with_cond("push", raw), &list);
            }
        }

        let mode = match (pre, up) {
            (false, true) => "",
            (true, true) => "ib",
            (false, false) => "da",
            (true, false) => "db",
        };
        let base = format!("{}{}", if load { "ldm" } else { "stm" }, mode);
        let ops = format!(
            "{}{}, {}{}",
            register_name(rn),
            if writeback { "!" } else { "" },
            list,
            caret
        );
        RawInstruction::new(addr, 4, &Self::with_cond(&base, raw), &ops)
    }
}

/// [`Disassembler`] backed by [`A32Decoder`]. Every word decodes to exactly one
/// 4-byte instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct A32Disassembler;

impl A32Disassembler {
    pub fn new() -> Self {
        Self
    }
}

impl Disassembler for A32Disassembler {
    fn disassemble(
        &self,
        code: &[u8],
        base: Address,
        mode: InstructionSet,
    ) -> Result<Vec<RawInstruction>, DecodeError> {
        if mode != InstructionSet::Arm {
            return Err(DecodeError::UnsupportedMode(mode));
        }
        if code.len() % 4 != 0 {
            return Err(DecodeError::MisalignedBuffer { len: code.len() });
        }

        Ok(code
            .chunks_exact(4)
            .enumerate()
            .map(|(i, word)| {
                let raw = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                A32Decoder::decode(raw, base + (i as u32) * 4)
            })
            .collect())
    }
}
