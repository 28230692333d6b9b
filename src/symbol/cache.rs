// Sat Jan 17 2026 - Alex

use crate::symbol::SymbolTablePair;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Lazily built symbol tables, keyed by region name.
///
/// Construction runs under the lock, so each region is built at most once
/// even if lookups race. A failed build leaves no entry and is retried on the
/// next lookup.
pub struct SymbolTableCache {
    tables: Mutex<HashMap<String, Arc<SymbolTablePair>>>,
}

impl SymbolTableCache {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, region: &str) -> Option<Arc<SymbolTablePair>> {
        self.tables.lock().get(region).cloned()
    }

    pub fn get_or_try_build<F, E>(&self, region: &str, build: F) -> Result<Arc<SymbolTablePair>, E>
    where
        F: FnOnce() -> Result<SymbolTablePair, E>,
    {
        let mut tables = self.tables.lock();
        if let Some(pair) = tables.get(region) {
            return Ok(pair.clone());
        }
        let pair = Arc::new(build()?);
        tables.insert(region.to_string(), pair.clone());
        Ok(pair)
    }

    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }
}

impl Default for SymbolTableCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_builds_once() {
        let cache = SymbolTableCache::new();
        let builds = Cell::new(0);

        for _ in 0..3 {
            let result: Result<_, ()> = cache.get_or_try_build("overlay11", || {
                builds.set(builds.get() + 1);
                Ok(SymbolTablePair::default())
            });
            assert!(result.is_ok());
        }

        assert_eq!(builds.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = SymbolTableCache::new();
        let failed: Result<_, &str> = cache.get_or_try_build("arm9", || Err("no symbols"));
        assert!(failed.is_err());
        assert!(cache.get("arm9").is_none());
        assert!(cache.is_empty());
    }
}
