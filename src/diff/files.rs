// Sat Jan 17 2026 - Alex

use crate::diff::DiffError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How the files of a modified build relate to the build it was made from
/// and the build it is being ported to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileComparison {
    /// Only in the modified build. Usually copied over as is.
    pub added: Vec<String>,
    /// Modified, and identical between base and target. Safe to copy.
    pub modified_identical: Vec<String>,
    /// Modified, and different between base and target. Needs conversion.
    pub modified_different: Vec<String>,
    /// Modified, and absent from the target.
    pub modified_missing: Vec<String>,
}

impl FileComparison {
    pub fn total(&self) -> usize {
        self.added.len() + self.modified_identical.len() + self.modified_different.len() + self.modified_missing.len()
    }
}

/// Relative paths (with `/` separators) of every file below `root`.
pub fn list_files(root: &Path) -> Result<BTreeSet<String>, DiffError> {
    let mut files = BTreeSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| DiffError::Io { path: dir.clone(), source })?;
        for entry in entries {
            let entry = entry.map_err(|source| DiffError::Io { path: dir.clone(), source })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.insert(name);
            }
        }
    }

    Ok(files)
}

fn same_contents(a: &Path, b: &Path) -> Result<bool, DiffError> {
    let read = |path: &Path| fs::read(path).map_err(|source| DiffError::Io { path: path.to_path_buf(), source });
    Ok(read(a)? == read(b)?)
}

pub fn compare_dirs(base: &Path, modified: &Path, target: &Path) -> Result<FileComparison, DiffError> {
    for dir in [base, modified, target] {
        if !dir.is_dir() {
            return Err(DiffError::NotADirectory(dir.to_path_buf()));
        }
    }

    let base_files = list_files(base)?;
    let modified_files = list_files(modified)?;
    let target_files = list_files(target)?;
    let mut result = FileComparison::default();

    for name in &modified_files {
        if !base_files.contains(name) {
            result.added.push(name.clone());
            continue;
        }

        let base_path: PathBuf = base.join(name);
        if same_contents(&modified.join(name), &base_path)? {
            continue;
        }

        if !target_files.contains(name) {
            result.modified_missing.push(name.clone());
        } else if same_contents(&target.join(name), &base_path)? {
            result.modified_identical.push(name.clone());
        } else {
            result.modified_different.push(name.clone());
        }
    }

    log::info!(
        "Compared {} files: {} added, {} portable, {} need conversion, {} missing in target",
        modified_files.len(),
        result.added.len(),
        result.modified_identical.len(),
        result.modified_different.len(),
        result.modified_missing.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, data: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data.as_bytes()).unwrap();
    }

    #[test]
    fn test_four_categories() {
        let tmp = TempDir::new().unwrap();
        let (base, modified, target) = (tmp.path().join("base"), tmp.path().join("mod"), tmp.path().join("target"));

        for (name, data) in [("SCRIPT/a.ssb", "a"), ("MAP_BG/b.bpl", "b"), ("FONT/c.dat", "c"), ("d.bin", "d")] {
            write(&base, name, data);
        }
        write(&target, "SCRIPT/a.ssb", "a");
        write(&target, "MAP_BG/b.bpl", "B-na");
        write(&target, "d.bin", "d");

        write(&modified, "SCRIPT/a.ssb", "a2");
        write(&modified, "MAP_BG/b.bpl", "b2");
        write(&modified, "FONT/c.dat", "c2");
        write(&modified, "d.bin", "d");
        write(&modified, "new/e.bin", "e");

        let result = compare_dirs(&base, &modified, &target).unwrap();
        assert_eq!(result.added, vec!["new/e.bin"]);
        assert_eq!(result.modified_identical, vec!["SCRIPT/a.ssb"]);
        assert_eq!(result.modified_different, vec!["MAP_BG/b.bpl"]);
        assert_eq!(result.modified_missing, vec!["FONT/c.dat"]);
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn test_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            compare_dirs(tmp.path(), &missing, tmp.path()),
            Err(DiffError::NotADirectory(_))
        ));
    }
}
