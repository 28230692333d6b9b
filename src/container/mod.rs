// Sat Jan 17 2026 - Alex

pub mod assembler;
pub mod store;

pub use assembler::{ArmipsAssembler, AssembleError, Assembler, OUTPUT_FILE};
pub use store::{BlockStore, DirectoryBlockStore, MemoryBlockStore, StoreError};
