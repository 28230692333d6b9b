// Sat Jan 17 2026 - Alex

use crate::diff::DiffError;
use serde::Serialize;
use std::fmt;

/// An entry of the modified list that has to be carried over to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListChange<T> {
    pub entry: T,
    /// Index of the entry in the modified list.
    pub source_index: usize,
    /// Appended past the end of the base list.
    pub added: bool,
    /// Where the entry goes in the target list. `None` for appended entries
    /// and for replaced entries the target does not have.
    pub target_index: Option<usize>,
}

impl<T: fmt::Display> fmt::Display for ListChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index {}: {}", self.source_index, self.entry)
    }
}

/// Entries of `modified` that differ from `base` or were appended to it.
pub fn changed_entries<T: Clone + PartialEq>(base: &[T], modified: &[T]) -> Result<Vec<ListChange<T>>, DiffError> {
    if modified.len() < base.len() {
        return Err(DiffError::ShorterList {
            base: base.len(),
            modified: modified.len(),
        });
    }

    let replaced = base
        .iter()
        .zip(modified)
        .enumerate()
        .filter(|(_, (b, m))| b != m)
        .map(|(i, (_, m))| ListChange {
            entry: m.clone(),
            source_index: i,
            added: false,
            target_index: None,
        });

    let appended = modified.iter().enumerate().skip(base.len()).map(|(i, m)| ListChange {
        entry: m.clone(),
        source_index: i,
        added: true,
        target_index: None,
    });

    Ok(replaced.chain(appended).collect())
}

/// Finds each replaced entry's slot in `target` by looking up the value the
/// base list had at that index.
pub fn locate_in_target<T: PartialEq + fmt::Debug>(changes: &mut [ListChange<T>], base: &[T], target: &[T]) {
    for change in changes.iter_mut().filter(|c| !c.added) {
        let original = &base[change.source_index];
        change.target_index = target.iter().position(|t| t == original);
        match change.target_index {
            Some(index) => log::debug!("Index {} maps to target index {}", change.source_index, index),
            None => log::warn!(
                "Base entry {:?} at index {} is not present in the target list",
                original,
                change.source_index
            ),
        }
    }
}

/// Applies located changes to `target`. Replacements without a target slot
/// are skipped and returned.
pub fn apply_changes<T: Clone>(target: &mut Vec<T>, changes: &[ListChange<T>]) -> Vec<usize> {
    let mut skipped = Vec::new();
    for change in changes {
        match (change.added, change.target_index) {
            (true, _) => target.push(change.entry.clone()),
            (false, Some(index)) if index < target.len() => target[index] = change.entry.clone(),
            _ => skipped.push(change.source_index),
        }
    }
    skipped
}

/// Ports the edits made to `base` (yielding `modified`) onto `target`.
pub fn port_list<T>(base: &[T], modified: &[T], target: &[T]) -> Result<ListPort<T>, DiffError>
where
    T: Clone + PartialEq + fmt::Debug,
{
    let mut changes = changed_entries(base, modified)?;
    locate_in_target(&mut changes, base, target);

    let mut ported = target.to_vec();
    let skipped = apply_changes(&mut ported, &changes);
    Ok(ListPort { changes, ported, skipped })
}

#[derive(Debug, Clone)]
pub struct ListPort<T> {
    pub changes: Vec<ListChange<T>>,
    pub ported: Vec<T>,
    /// Source indices of replacements that had nowhere to go.
    pub skipped: Vec<usize>,
}

impl<T> ListPort<T> {
    pub fn is_unmodified(&self) -> bool {
        self.changes.is_empty()
    }
}
