// Sat Jan 17 2026 - Alex

use crate::memory::Address;
use crate::symbol::SymbolError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One build's view of a section: its bounds plus every `(identifier, address)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSymbols {
    pub start: Address,
    pub length: u32,
    pub symbols: Vec<(String, Address)>,
}

impl SectionSymbols {
    pub fn end(&self) -> Address {
        self.start + self.length
    }
}

/// Anything that can hand out per-build symbol lists for a named section.
pub trait SymbolSource {
    fn section(&self, section: &str, build: &str) -> Result<SectionSymbols, SymbolError>;

    fn section_bounds(&self, section: &str, build: &str) -> Result<(Address, u32), SymbolError> {
        let symbols = self.section(section, build)?;
        Ok((symbols.start, symbols.length))
    }
}

/// Identifier of the `index`-th address of a symbol. Stable across builds as
/// long as both builds list the addresses in the same order.
pub fn symbol_identifier(name: &str, index: usize) -> String {
    if index == 0 {
        name.to_string()
    } else {
        format!("{}[{}]", name, index)
    }
}

#[derive(Debug, Deserialize)]
struct SectionEntry {
    address: HashMap<String, u32>,
    length: HashMap<String, u32>,
    #[serde(default)]
    functions: Vec<SymbolEntry>,
    #[serde(default)]
    data: Vec<SymbolEntry>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    name: String,
    #[serde(default)]
    address: HashMap<String, AddressList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddressList {
    One(u32),
    Many(Vec<u32>),
}

impl AddressList {
    fn to_vec(&self) -> Vec<u32> {
        match self {
            AddressList::One(a) => vec![*a],
            AddressList::Many(list) => list.clone(),
        }
    }
}

/// Reads pmdsky-debug style symbol files, `<dir>/<section>.yml`.
#[derive(Debug, Clone)]
pub struct YamlSymbolSource {
    dir: PathBuf,
}

impl YamlSymbolSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn section_path(&self, section: &str) -> PathBuf {
        self.dir.join(format!("{}.yml", section))
    }

    fn load_entry(&self, section: &str) -> Result<SectionEntry, SymbolError> {
        let path = self.section_path(section);
        let content = fs::read_to_string(&path).map_err(|source| SymbolError::Io {
            path: path.clone(),
            source,
        })?;
        let mut file: HashMap<String, SectionEntry> =
            serde_yaml::from_str(&content).map_err(|source| SymbolError::Parse {
                path: path.clone(),
                source,
            })?;
        file.remove(section)
            .ok_or_else(|| SymbolError::SectionNotFound(section.to_string()))
    }
}

impl SymbolSource for YamlSymbolSource {
    fn section(&self, section: &str, build: &str) -> Result<SectionSymbols, SymbolError> {
        let entry = self.load_entry(section)?;
        let missing = |field| SymbolError::MissingBuild {
            section: section.to_string(),
            build: build.to_string(),
            field,
        };

        let start = *entry.address.get(build).ok_or_else(|| missing("address"))?;
        let length = *entry.length.get(build).ok_or_else(|| missing("length"))?;

        let mut symbols = Vec::new();
        for symbol in entry.functions.iter().chain(entry.data.iter()) {
            // Symbols that do not exist in this build are simply absent.
            let Some(addresses) = symbol.address.get(build) else {
                continue;
            };
            for (i, addr) in addresses.to_vec().into_iter().enumerate() {
                symbols.push((symbol_identifier(&symbol.name, i), Address::new(addr)));
            }
        }

        log::debug!(
            "Loaded {} symbols for {} ({}) from {}",
            symbols.len(),
            section,
            build,
            self.section_path(section).display()
        );

        Ok(SectionSymbols {
            start: Address::new(start),
            length,
            symbols,
        })
    }
}

/// In-memory symbol source, keyed by `(section, build)`.
#[derive(Debug, Clone, Default)]
pub struct StaticSymbolSource {
    sections: HashMap<(String, String), SectionSymbols>,
}

impl StaticSymbolSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: &str, build: &str, symbols: SectionSymbols) -> Self {
        self.sections.insert((section.to_string(), build.to_string()), symbols);
        self
    }
}

impl SymbolSource for StaticSymbolSource {
    fn section(&self, section: &str, build: &str) -> Result<SectionSymbols, SymbolError> {
        self.sections
            .get(&(section.to_string(), build.to_string()))
            .cloned()
            .ok_or_else(|| SymbolError::SectionNotFound(format!("{} ({})", section, build)))
    }
}
