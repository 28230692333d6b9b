// Sat Jan 17 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Section not found: {0}")]
    SectionNotFound(String),
    #[error("Section {section} has no {field} for build {build}")]
    MissingBuild {
        section: String,
        build: String,
        field: &'static str,
    },
}
