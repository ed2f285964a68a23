use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

/// Per-script read/write ordering for opportunity sets.
///
/// Replacing a script's opportunities takes the write side; listing takes the
/// read side, so a reader sees either the old set or the new one.
#[derive(Default)]
pub struct ScriptLocks {
    /// script_id → lock
    locks: DashMap<String, Arc<RwLock<()>>>,
}

impl ScriptLocks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lock_for(&self, script_id: &str) -> Arc<RwLock<()>> {
        self.locks
            .entry(script_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Drops the entry of a deleted script. Holders of the old lock keep it alive
    /// until they release it.
    pub fn forget(&self, script_id: &str) {
        self.locks.remove(script_id);
    }

    pub fn tracked_scripts(&self) -> usize {
        self.locks.len()
    }
}
