// Sat Jan 17 2026 - Alex

pub mod block;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod rewriter;

pub use block::{Candidate, CodeBlock, DisassembledBlock, RawBlock, INSTRUCTION_WIDTH};
pub use error::{RelocationError, RelocationResult, UnmappableOffset, UnresolvedOffset};
pub use mapper::OffsetMapper;
pub use registry::{ConvertibleOffsetRegistry, OffsetOverrides, OffsetResolutionMap, RegisteredOffset};
pub use rewriter::Rewriter;
