// Sat Jan 17 2026 - Alex

pub mod files;
pub mod list;

pub use files::{compare_dirs, list_files, FileComparison};
pub use list::{apply_changes, changed_entries, locate_in_target, port_list, ListChange, ListPort};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Modified list has {modified} entries, fewer than the {base} of the base list")]
    ShorterList { base: usize, modified: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
