// Sat Jan 17 2026 - Alex

use crate::memory::{default_region_specs, Address, RegionSpec};
use crate::orchestration::DEFAULT_FIRST_ID;
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.yml";

/// Where the special processes are loaded in the source build.
pub const DEFAULT_LOAD_BASE: Address = Address::new(0x22E7B88);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_build: String,
    pub target_build: String,
    pub symbols_dir: PathBuf,
    pub blocks: BlockConfig,
    pub assembler: AssemblerConfig,
    pub regions: Vec<RegionSpec>,
    #[serde(alias = "OffsetMaps", deserialize_with = "offset_maps")]
    pub offset_maps: IndexMap<String, String>,
    pub hashes: HashConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub first_id: usize,
    pub load_base: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    pub program: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub ignore: bool,
    pub files: IndexMap<PathBuf, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_build: "EU".to_string(),
            target_build: "NA".to_string(),
            symbols_dir: PathBuf::from("symbols"),
            blocks: BlockConfig::default(),
            assembler: AssemblerConfig::default(),
            regions: default_region_specs(),
            offset_maps: IndexMap::new(),
            hashes: HashConfig::default(),
        }
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("blocks/source"),
            target: PathBuf::from("blocks/target"),
            first_id: DEFAULT_FIRST_ID,
            load_base: DEFAULT_LOAD_BASE,
        }
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("armips"),
        }
    }
}

/// Override entries may be written as strings or as bare integers. Bare
/// integers are read back as the hex digits the operator typed.
fn offset_maps<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Mapping>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|(source, target)| Ok((offset_text(source)?, offset_text(target)?)))
        .collect()
}

fn offset_text<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(n) if n.is_u64() => Ok(n.to_string()),
        other => Err(E::custom(format!("offset {:?} is not hex text, quote it", other))),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a project with nothing configured.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn with_override(mut self, source: &str, target: &str) -> Self {
        self.offset_maps.insert(source.to_string(), target.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_build.trim().is_empty() || self.target_build.trim().is_empty() {
            return Err(ConfigError::Invalid("source_build and target_build must be set".to_string()));
        }
        if self.source_build == self.target_build {
            return Err(ConfigError::Invalid(format!(
                "source_build and target_build are both {}",
                self.source_build
            )));
        }
        if self.regions.is_empty() {
            return Err(ConfigError::Invalid("at least one region must be configured".to_string()));
        }
        if !self.blocks.load_base.is_aligned(4) {
            return Err(ConfigError::Invalid(format!(
                "blocks.load_base {} is not word aligned",
                self.blocks.load_base
            )));
        }
        for (source, target) in &self.offset_maps {
            for text in [source, target] {
                if Address::from_hex(text).is_err() {
                    return Err(ConfigError::Invalid(format!("offset_maps entry {} is not hex", text)));
                }
            }
        }
        Ok(())
    }
}
