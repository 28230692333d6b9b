// Sat Jan 17 2026 - Alex

pub mod arm;
pub mod error;

pub use arm::{A32Decoder, A32Disassembler};
pub use error::DecodeError;

use crate::memory::Address;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionSet {
    Arm,
    Thumb,
}

/// One disassembled instruction, in the shape disassemblers such as capstone
/// hand out: address, width, mnemonic and operand text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    pub address: Address,
    pub size: usize,
    pub mnemonic: String,
    pub op_str: String,
}

impl RawInstruction {
    pub fn new(address: Address, size: usize, mnemonic: &str, op_str: &str) -> Self {
        Self {
            address,
            size,
            mnemonic: mnemonic.to_string(),
            op_str: op_str.to_string(),
        }
    }
}

impl fmt::Display for RawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op_str.is_empty() {
            write!(f, "{:08X}  {}", self.address.as_u32(), self.mnemonic)
        } else {
            write!(f, "{:08X}  {} {}", self.address.as_u32(), self.mnemonic, self.op_str)
        }
    }
}

/// Turns raw code into an ordered instruction listing.
pub trait Disassembler {
    fn disassemble(
        &self,
        code: &[u8],
        base: Address,
        mode: InstructionSet,
    ) -> Result<Vec<RawInstruction>, DecodeError>;
}
