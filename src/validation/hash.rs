// Sat Jan 17 2026 - Alex

use crate::config::HashConfig;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// SHA-256 of an unmodified Explorers of Sky EU ROM.
pub const VANILLA_EU_SHA256: &str = "1fa39d35873b58e02f3623438414c334ad93b840651a8a9ac13ee3c789f170c1";
/// SHA-256 of an unmodified Explorers of Sky NA ROM.
pub const VANILLA_NA_SHA256: &str = "91161cb227c44a3e79fa2a622060385815f565647357062d7887f13f49d591e2";

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to hash {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} file(s) failed hash verification: {}", .0.len(), .0.iter().map(|c| c.path.display().to_string()).collect::<Vec<_>>().join(", "))]
    Mismatch(Vec<HashCheck>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashCheck {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
}

impl HashCheck {
    pub fn matches(&self) -> bool {
        self.expected.eq_ignore_ascii_case(&self.actual)
    }

    /// Names the vanilla build the file turned out to be, if any.
    pub fn known_build(&self) -> Option<&'static str> {
        known_build(&self.actual)
    }
}

pub fn known_build(sha256: &str) -> Option<&'static str> {
    if sha256.eq_ignore_ascii_case(VANILLA_EU_SHA256) {
        Some("EU")
    } else if sha256.eq_ignore_ascii_case(VANILLA_NA_SHA256) {
        Some("NA")
    } else {
        None
    }
}

pub fn sha256_file(path: &Path) -> Result<String, HashError> {
    let io_error = |source| HashError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_error)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(io_error)?;

    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

pub fn verify_file(path: &Path, expected: &str) -> Result<HashCheck, HashError> {
    let actual = sha256_file(path)?;
    Ok(HashCheck {
        path: path.to_path_buf(),
        expected: expected.to_lowercase(),
        actual,
    })
}

/// Checks every configured file under `root`. Returns the checks when all
/// match, or every mismatch at once. Does nothing when hashes are ignored.
pub fn verify_project(root: &Path, hashes: &HashConfig) -> Result<Vec<HashCheck>, HashError> {
    if hashes.ignore {
        log::warn!("Hash verification is disabled in the project config");
        return Ok(Vec::new());
    }

    let mut checks = Vec::with_capacity(hashes.files.len());
    for (relative, expected) in &hashes.files {
        let check = verify_file(&root.join(relative), expected)?;
        log::debug!("{}: {}", relative.display(), check.actual);
        checks.push(check);
    }

    let mismatches: Vec<HashCheck> = checks.iter().filter(|c| !c.matches()).cloned().collect();
    if !mismatches.is_empty() {
        return Err(HashError::Mismatch(mismatches));
    }
    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // sha256("abc")
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("abc.bin");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(sha256_file(&path).unwrap(), ABC);
        assert!(verify_file(&path, &ABC.to_uppercase()).unwrap().matches());
    }

    #[test]
    fn test_verify_project_reports_mismatches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.bin"), b"abc").unwrap();
        fs::write(tmp.path().join("bad.bin"), b"abd").unwrap();

        let mut hashes = HashConfig::default();
        hashes.files.insert(PathBuf::from("good.bin"), ABC.to_string());
        hashes.files.insert(PathBuf::from("bad.bin"), ABC.to_string());

        match verify_project(tmp.path(), &hashes) {
            Err(HashError::Mismatch(list)) => {
                assert_eq!(list.len(), 1);
                assert!(list[0].path.ends_with("bad.bin"));
            }
            other => panic!("unexpected result {:?}", other),
        }

        hashes.ignore = true;
        assert!(verify_project(tmp.path(), &hashes).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let mut hashes = HashConfig::default();
        hashes.files.insert(PathBuf::from("rom.nds"), VANILLA_EU_SHA256.to_string());
        assert!(matches!(verify_project(tmp.path(), &hashes), Err(HashError::Io { .. })));
    }

    #[test]
    fn test_known_builds() {
        assert_eq!(known_build(VANILLA_EU_SHA256), Some("EU"));
        assert_eq!(known_build(&VANILLA_NA_SHA256.to_uppercase()), Some("NA"));
        assert_eq!(known_build(ABC), None);
    }
}
