// Sat Jan 17 2026 - Alex

pub mod cache;
pub mod error;
pub mod import;
pub mod table;

pub use cache::SymbolTableCache;
pub use error::SymbolError;
pub use import::{symbol_identifier, SectionSymbols, StaticSymbolSource, SymbolSource, YamlSymbolSource};
pub use table::{SourceSymbolTable, SymbolRef, SymbolTablePair, TargetSymbolTable, SECTION_END, SECTION_START};
