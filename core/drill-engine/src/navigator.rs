//! FILENAME: core/drill-engine/src/navigator.rs
//! Drill Navigator - Owns the drill path and drives every transition.
//!
//! States are Root (empty path) and Drilled (non-empty path). The depth is
//! always the path length, so pushing/popping the path is the only way the
//! depth ever changes. Each transition either recomputes one level from the
//! cache or restores the root snapshot, and then replaces the current view.

use chart_model::CategoryValue;

use crate::aggregate::{any_drillable, can_drill_further};
use crate::cache::DrillCache;
use crate::definition::DrillDefinition;
use crate::error::{DrillError, DrillResult};
use crate::snapshot::RootSnapshot;
use crate::view::{build_level, build_view, DrillPath, LevelView, SelectionState};

pub struct DrillNavigator {
    cache: DrillCache,
    definition: DrillDefinition,
    path: DrillPath,
    snapshot: RootSnapshot,
    current: LevelView,
    selection: SelectionState,
    /// Cross-filter selection keys raised from the current level.
    pending_selection: Vec<CategoryValue>,
}

impl DrillNavigator {
    pub fn new(definition: DrillDefinition) -> Self {
        DrillNavigator {
            cache: DrillCache::new(),
            definition,
            path: DrillPath::new(),
            snapshot: RootSnapshot::new(),
            current: LevelView::default(),
            selection: SelectionState::default(),
            pending_selection: Vec::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[CategoryValue] {
        &self.path
    }

    pub fn is_drilled(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn current(&self) -> &LevelView {
        &self.current
    }

    pub fn definition(&self) -> &DrillDefinition {
        &self.definition
    }

    pub fn cache(&self) -> &DrillCache {
        &self.cache
    }

    pub fn snapshot(&self) -> &RootSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn pending_selection(&self) -> &[CategoryValue] {
        &self.pending_selection
    }

    // ========================================================================
    // DATA AND SETTINGS
    // ========================================================================

    /// Replaces the row set and the definition together. Resets to the root
    /// and recaptures the snapshot, building the root view exactly once.
    pub fn load(&mut self, cache: DrillCache, definition: DrillDefinition) {
        log::debug!(
            "loading {} rows across {} levels",
            cache.row_count(),
            cache.level_count()
        );
        self.cache = cache;
        self.definition = definition;
        self.snapshot.invalidate();
        self.path.clear();
        self.clear_selection();
        self.current = self.root_view();
    }

    /// Applies a new definition and re-renders the current level in place.
    pub fn apply_definition(&mut self, definition: DrillDefinition, keep_selection: bool) {
        if definition != self.definition {
            self.snapshot.invalidate();
        }
        self.definition = definition;
        self.rerender(keep_selection);
    }

    fn rerender(&mut self, keep_selection: bool) {
        let selected = self.selection.selected;
        self.current = if self.path.is_empty() {
            self.root_view()
        } else {
            self.compute_view(self.path.clone())
        };

        self.selection.hover = None;
        self.selection.selected = match selected {
            Some(i) if keep_selection && i < self.current.level.len() => Some(i),
            _ => None,
        };
        if !keep_selection {
            self.pending_selection.clear();
        }
    }

    // ========================================================================
    // DRILL CHECKS
    // ========================================================================

    /// Whether any category in the current view can be drilled into.
    pub fn can_drill(&self) -> bool {
        any_drillable(&self.cache, self.depth(), &self.path)
    }

    /// Whether drilling into `key` from the current view yields a new level.
    pub fn can_drill_category(&self, key: &CategoryValue) -> bool {
        let mut target = self.path.clone();
        target.push(key.clone());
        can_drill_further(&self.cache, target.len(), &target)
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Descends into `key`. Leaves all state untouched when the key has no
    /// deeper level with more than one distinct value.
    pub fn drill_into(&mut self, key: &CategoryValue) -> DrillResult<()> {
        if !self.can_drill_category(key) {
            return Err(DrillError::NotDrillable);
        }

        let mut target = self.path.clone();
        target.push(key.clone());
        let view = self.compute_view(target);
        if view.is_empty() {
            return Err(DrillError::NotDrillable);
        }

        log::debug!("drill into '{}': depth {} -> {}", key.label(), self.depth(), view.depth());
        self.path = view.path.clone();
        self.current = view;
        self.clear_selection();
        Ok(())
    }

    /// Goes back exactly one level. From depth 1 the root snapshot is
    /// restored without recomputation.
    pub fn step_back(&mut self) -> DrillResult<()> {
        let from = self.depth();
        match from {
            0 => return Err(DrillError::AtRoot),
            1 => {
                self.path.clear();
                self.current = self.root_view();
            }
            _ => {
                self.path.pop();
                self.current = self.compute_view(self.path.clone());
            }
        }

        log::debug!("step back: depth {} -> {}", from, self.depth());
        self.clear_selection();
        Ok(())
    }

    /// Returns to the root unconditionally.
    pub fn reset_to_root(&mut self) {
        log::debug!("reset: depth {} -> 0", self.depth());
        self.path.clear();
        self.current = self.root_view();
        self.clear_selection();
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    /// Selects a category of the current view. Out-of-range indices clear
    /// the selection.
    pub fn select(&mut self, index: Option<usize>) {
        self.selection.selected = index.filter(|&i| i < self.current.level.len());
    }

    pub fn hover(&mut self, index: Option<usize>) {
        self.selection.hover = index.filter(|&i| i < self.current.level.len());
    }

    pub fn set_pending_selection(&mut self, keys: Vec<CategoryValue>) {
        self.pending_selection = keys;
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.pending_selection.clear();
    }

    // ========================================================================
    // VIEW CONSTRUCTION
    // ========================================================================

    fn compute_view(&self, path: DrillPath) -> LevelView {
        let depth = path.len();
        let level = build_level(&self.cache, &self.definition, depth, &path);
        let drillable = any_drillable(&self.cache, depth, &path);
        log::trace!("computed level {} with {} categories", depth, level.len());
        build_view(level, &self.definition, path, drillable)
    }

    /// The root view, served from the snapshot. The snapshot is (re)captured
    /// here the first time the root aggregates to something non-empty.
    fn root_view(&mut self) -> LevelView {
        if !self.snapshot.is_current(self.definition.version) {
            self.snapshot.invalidate();
            let root = build_level(&self.cache, &self.definition, 0, &[]);
            if !root.is_empty() {
                self.snapshot.capture_root(&root, self.definition.version);
            }
        }

        let level = self.snapshot.root().unwrap_or_default();
        let drillable = any_drillable(&self.cache, 0, &[]);
        build_view(level, &self.definition, DrillPath::new(), drillable)
    }
}

impl Default for DrillNavigator {
    fn default() -> Self {
        Self::new(DrillDefinition::default())
    }
}
