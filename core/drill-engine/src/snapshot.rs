//! FILENAME: core/drill-engine/src/snapshot.rs
//! Root Snapshot - The cached root-level result used to restore the
//! undrilled view without recomputation.

use crate::aggregate::LevelResult;

/// Holds one root-level result per data refresh (and definition version).
/// The stored copy is never mutated; readers always get their own clone.
#[derive(Debug, Clone, Default)]
pub struct RootSnapshot {
    stored: Option<LevelResult>,
    version: u64,
}

impl RootSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a deep copy of `level` if nothing is captured yet.
    /// Returns false (and keeps the existing copy) otherwise.
    pub fn capture_root(&mut self, level: &LevelResult, version: u64) -> bool {
        if self.stored.is_some() {
            return false;
        }
        log::debug!("root snapshot captured: {} categories", level.len());
        self.stored = Some(level.clone());
        self.version = version;
        true
    }

    /// A copy of the captured root, if any.
    pub fn root(&self) -> Option<LevelResult> {
        self.stored.clone()
    }

    pub fn is_captured(&self) -> bool {
        self.stored.is_some()
    }

    /// Whether the snapshot was taken under the given definition version.
    pub fn is_current(&self, version: u64) -> bool {
        self.stored.is_some() && self.version == version
    }

    pub fn invalidate(&mut self) {
        if self.stored.take().is_some() {
            log::debug!("root snapshot invalidated");
        }
    }
}
