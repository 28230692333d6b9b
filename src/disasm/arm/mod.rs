// Sat Jan 17 2026 - Alex

pub mod decoder;

pub use decoder::{A32Decoder, A32Disassembler};

use itertools::Itertools;

pub const CONDITIONS: [&str; 15] = [
    "eq", "ne", "hs", "lo", "mi", "pl", "vs", "vc", "hi", "ls", "ge", "lt", "gt", "le", "",
];

pub fn condition_suffix(cond: u32) -> &'static str {
    CONDITIONS.get(cond as usize).copied().unwrap_or("")
}

pub fn is_condition(suffix: &str) -> bool {
    !suffix.is_empty() && CONDITIONS.contains(&suffix)
}

/// Register names as capstone prints them.
pub fn register_name(reg: u32) -> &'static str {
    match reg & 0xF {
        0 => "r0",
        1 => "r1",
        2 => "r2",
        3 => "r3",
        4 => "r4",
        5 => "r5",
        6 => "r6",
        7 => "r7",
        8 => "r8",
        9 => "sb",
        10 => "sl",
        11 => "fp",
        12 => "ip",
        13 => "sp",
        14 => "lr",
        _ => "pc",
    }
}

pub fn register_list(mask: u32) -> String {
    let regs = (0..16).filter(|r| mask & (1 << *r) != 0).map(register_name).join(", ");
    format!("{{{}}}", regs)
}

/// Immediates up to 9 are decimal, larger ones hex.
pub fn immediate(value: u32) -> String {
    if value > 9 {
        format!("#0x{:x}", value)
    } else {
        format!("#{}", value)
    }
}

pub fn signed_immediate(value: u32, negative: bool) -> String {
    match (negative, value > 9) {
        (true, true) => format!("#-0x{:x}", value),
        (true, false) => format!("#-{}", value),
        (false, _) => immediate(value),
    }
}

pub fn shift_name(kind: u32) -> &'static str {
    match kind & 3 {
        0 => "lsl",
        1 => "lsr",
        2 => "asr",
        _ => "ror",
    }
}

/// Register operand with an immediate shift, as used by data processing and
/// register-offset transfers. An empty string means no shift.
pub fn immediate_shift(kind: u32, amount: u32) -> String {
    match (kind & 3, amount) {
        (0, 0) => String::new(),
        (1, 0) | (2, 0) => format!(", {} #32", shift_name(kind)),
        (3, 0) => ", rrx".to_string(),
        _ => format!(", {} #{}", shift_name(kind), amount),
    }
}
