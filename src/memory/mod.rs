// Sat Jan 17 2026 - Alex

pub mod address;
pub mod classifier;
pub mod error;
pub mod range;
pub mod region;

pub use address::Address;
pub use classifier::{RegionId, RegionTable};
pub use error::MemoryError;
pub use range::{EndBound, MemoryRange};
pub use region::{default_region_specs, Region, RegionSpec, Translation};
