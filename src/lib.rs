// Sat Jan 17 2026 - Alex

pub mod config;
pub mod container;
pub mod diff;
pub mod disasm;
pub mod memory;
pub mod orchestration;
pub mod output;
pub mod project;
pub mod relocation;
pub mod symbol;
pub mod ui;
pub mod validation;

pub use config::Config;
pub use memory::{Address, RegionTable};
pub use orchestration::{ConversionSession, ReadyConversion};
pub use project::{load_project, Project, ProjectStatus};
pub use relocation::{CodeBlock, OffsetMapper, RelocationError};
