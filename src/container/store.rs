// Sat Jan 17 2026 - Alex

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Block {id} does not exist (store holds {len} blocks)")]
    OutOfRange { id: usize, len: usize },

    #[error("Block store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An indexed table of code blocks, such as the special process table of a
/// ROM or a directory of extracted blocks.
pub trait BlockStore {
    fn len(&self) -> usize;

    fn read(&self, id: usize) -> Result<Vec<u8>, StoreError>;

    /// Overwrites an existing block.
    fn write(&mut self, id: usize, data: &[u8]) -> Result<(), StoreError>;

    /// Appends a block and returns its id.
    fn push(&mut self, data: &[u8]) -> Result<usize, StoreError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `placeholder` until `id` exists.
    fn ensure_len(&mut self, id: usize, placeholder: &[u8]) -> Result<(), StoreError> {
        while self.len() <= id {
            self.push(placeholder)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blocks: Vec<Vec<u8>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Vec<u8>>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Vec<u8>] {
        &self.blocks
    }
}

impl BlockStore for MemoryBlockStore {
    fn len(&self) -> usize {
        self.blocks.len()
    }

    fn read(&self, id: usize) -> Result<Vec<u8>, StoreError> {
        self.blocks.get(id).cloned().ok_or(StoreError::OutOfRange {
            id,
            len: self.blocks.len(),
        })
    }

    fn write(&mut self, id: usize, data: &[u8]) -> Result<(), StoreError> {
        let len = self.blocks.len();
        let slot = self.blocks.get_mut(id).ok_or(StoreError::OutOfRange { id, len })?;
        *slot = data.to_vec();
        Ok(())
    }

    fn push(&mut self, data: &[u8]) -> Result<usize, StoreError> {
        self.blocks.push(data.to_vec());
        Ok(self.blocks.len() - 1)
    }
}

/// Blocks stored as `<dir>/<id:04>.bin`. The store length is the number of
/// contiguous ids starting at 0.
#[derive(Debug, Clone)]
pub struct DirectoryBlockStore {
    dir: PathBuf,
    len: usize,
}

impl DirectoryBlockStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut len = 0;
        while Self::block_path(&dir, len).is_file() {
            len += 1;
        }

        log::debug!("Opened block store {} with {} blocks", dir.display(), len);
        Ok(Self { dir, len })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn block_path(dir: &Path, id: usize) -> PathBuf {
        dir.join(format!("{:04}.bin", id))
    }

    fn write_file(&self, id: usize, data: &[u8]) -> Result<(), StoreError> {
        let path = Self::block_path(&self.dir, id);
        fs::write(&path, data).map_err(|source| StoreError::Io { path, source })
    }
}

impl BlockStore for DirectoryBlockStore {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, id: usize) -> Result<Vec<u8>, StoreError> {
        if id >= self.len {
            return Err(StoreError::OutOfRange { id, len: self.len });
        }
        let path = Self::block_path(&self.dir, id);
        fs::read(&path).map_err(|source| StoreError::Io { path, source })
    }

    fn write(&mut self, id: usize, data: &[u8]) -> Result<(), StoreError> {
        if id >= self.len {
            return Err(StoreError::OutOfRange { id, len: self.len });
        }
        self.write_file(id, data)
    }

    fn push(&mut self, data: &[u8]) -> Result<usize, StoreError> {
        let id = self.len;
        self.write_file(id, data)?;
        self.len += 1;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_grows_with_placeholders() {
        let mut store = MemoryBlockStore::from_blocks(vec![vec![1, 2, 3, 4]]);
        store.ensure_len(3, b"TEMP").unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.read(3).unwrap(), b"TEMP");
        store.write(3, &[9; 8]).unwrap();
        assert_eq!(store.read(3).unwrap(), vec![9; 8]);
        assert!(matches!(store.read(4), Err(StoreError::OutOfRange { id: 4, len: 4 })));
    }

    #[test]
    fn test_directory_store_counts_contiguous_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0000.bin"), [0u8; 4]).unwrap();
        fs::write(dir.path().join("0001.bin"), [1u8; 4]).unwrap();
        fs::write(dir.path().join("0003.bin"), [3u8; 4]).unwrap();

        let mut store = DirectoryBlockStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.read(1).unwrap(), vec![1u8; 4]);

        let id = store.push(&[2u8; 8]).unwrap();
        assert_eq!(id, 2);
        let reopened = DirectoryBlockStore::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 4);
    }

    #[test]
    fn test_directory_store_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blocks").join("target");
        let store = DirectoryBlockStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(path.is_dir());
    }
}
