// Sat Jan 17 2026 - Alex

pub mod session;

pub use session::{ConversionSession, ReadyConversion, DEFAULT_FIRST_ID, PLACEHOLDER_BLOCK};
