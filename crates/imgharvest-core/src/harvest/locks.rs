//! Per-target locks so two fetches never write the same file at once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Map of local target path to its lock. Shared by every page of a run, so
/// equal names on one page and pages that map to one subfolder are both
/// serialized.
#[derive(Debug, Default)]
pub struct TargetLocks {
    slots: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl TargetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock slot for `target`, created on first use.
    pub fn slot(&self, target: &Path) -> Arc<Mutex<()>> {
        let mut slots = match self.slots.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(slots.entry(target.to_path_buf()).or_default())
    }
}

/// Locks `slot`, ignoring poisoning (the guarded data is `()`).
pub(crate) fn hold(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    match slot.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}
