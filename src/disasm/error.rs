// Sat Jan 17 2026 - Alex

use crate::disasm::InstructionSet;
use crate::memory::Address;
use thiserror::Error;

/// The instruction stream of a block cannot be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Instruction at {address} has width {size}, only 4-byte instructions are supported")]
    UnsupportedWidth { address: Address, size: usize },
    #[error("Code length {len} is not a multiple of 4")]
    MisalignedBuffer { len: usize },
    #[error("Instruction set {0:?} is not supported")]
    UnsupportedMode(InstructionSet),
}
