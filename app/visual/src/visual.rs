//! FILENAME: app/visual/src/visual.rs
// PURPOSE: The component: host events in, chart options out.
// CONTEXT: Owns the navigator, the settings and the renderer. Every
// navigation event runs to completion and renders once; further navigation
// is rejected until the renderer reports that redraw complete.

use chart_model::CategoryValue;
use drill_engine::{DrillCache, DrillError, DrillNavigator, SortDirection};
use thiserror::Error;

use crate::api_types::VisualState;
use crate::dataview::{ingest, DataView};
use crate::render::{build_option, ChartRenderer};
use crate::settings::VisualSettings;
use crate::{log_debug, log_enter, log_exit, log_info, log_warn};

#[derive(Debug, Error)]
pub enum VisualError {
    #[error(transparent)]
    Drill(#[from] DrillError),

    #[error("Invalid host JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A chart transition is still in progress")]
    Busy,

    #[error("Category index {index} out of range ({count} categories)")]
    CategoryIndex { index: usize, count: usize },
}

pub type VisualResult<T> = Result<T, VisualError>;

pub struct DrillVisual<R: ChartRenderer> {
    navigator: DrillNavigator,
    settings: VisualSettings,
    /// Sort state from the last data refresh.
    sort: Option<SortDirection>,
    renderer: R,
    /// Set after each animated render, cleared by `render_complete`.
    busy: bool,
    version: u64,
}

impl<R: ChartRenderer> DrillVisual<R> {
    pub fn new(renderer: R) -> Self {
        let settings = VisualSettings::default();
        DrillVisual {
            navigator: DrillNavigator::new(settings.definition(None)),
            settings,
            sort: None,
            renderer,
            busy: false,
            version: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn navigator(&self) -> &DrillNavigator {
        &self.navigator
    }

    pub fn settings(&self) -> &VisualSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn state(&self) -> VisualState {
        let view = self.navigator.current();
        VisualState {
            depth: self.navigator.depth(),
            path: self.navigator.path().iter().map(|c| c.label()).collect(),
            can_go_back: self.navigator.is_drilled(),
            drillable: view.drillable,
            selected: self.navigator.selection().selected,
            busy: self.busy,
        }
    }

    // ========================================================================
    // HOST UPDATES
    // ========================================================================

    /// Data refresh. Returns to the root and recaptures the root snapshot.
    /// Malformed columns render the empty state and unreadable formatting
    /// properties take their defaults instead of failing.
    pub fn update(&mut self, data_view_json: &str) -> VisualResult<()> {
        log_enter!("DRILL", "update", "bytes={}", data_view_json.len());
        let data_view: DataView = serde_json::from_str(data_view_json)?;

        self.settings = VisualSettings::from_objects(&data_view.objects);

        let cache = match ingest(&data_view, &self.settings) {
            Ok(ingested) => {
                self.sort = ingested.sort;
                ingested.cache
            }
            Err(e) => {
                log_warn!("DRILL", "data view rejected: {}", e);
                self.sort = None;
                DrillCache::new()
            }
        };

        let definition = self.next_definition();
        self.navigator.load(cache, definition);
        self.render();

        log_exit!("DRILL", "update", "categories={}", self.navigator.current().level.len());
        Ok(())
    }

    /// Formatting change for the same data. Stays at the current depth and
    /// keeps the selection when it is still in range. Only text that is not
    /// JSON at all is rejected.
    pub fn update_settings(&mut self, objects_json: &str) -> VisualResult<()> {
        log_enter!("DRILL", "update_settings");
        let objects: serde_json::Value = serde_json::from_str(objects_json)?;
        self.settings = VisualSettings::from_objects(&objects);

        let definition = self.next_definition();
        self.navigator.apply_definition(definition, true);
        self.render();

        log_exit!("DRILL", "update_settings", "depth={}", self.navigator.depth());
        Ok(())
    }

    fn next_definition(&mut self) -> drill_engine::DrillDefinition {
        self.version = self.version.wrapping_add(1);
        let mut definition = self.settings.definition(self.sort);
        definition.version = self.version;
        definition
    }

    // ========================================================================
    // NAVIGATION EVENTS
    // ========================================================================

    /// Drill into the clicked category. Leaf clicks are silent no-ops.
    pub fn click(&mut self, category_index: usize) -> VisualResult<()> {
        self.ensure_idle()?;
        let key = self.category_at(category_index)?;
        log_enter!("DRILL", "click", "index={} key={}", category_index, key.label());

        match self.navigator.drill_into(&key) {
            Ok(()) => {
                self.render();
                log_exit!("DRILL", "click", "depth={}", self.navigator.depth());
                Ok(())
            }
            Err(DrillError::NotDrillable) => {
                log_debug!("DRILL", "'{}' has nothing to drill into", key.label());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// One level up. At the root this does nothing.
    pub fn back(&mut self) -> VisualResult<()> {
        self.ensure_idle()?;
        log_enter!("DRILL", "back", "depth={}", self.navigator.depth());

        match self.navigator.step_back() {
            Ok(()) => {
                self.render();
                log_exit!("DRILL", "back", "depth={}", self.navigator.depth());
                Ok(())
            }
            Err(DrillError::AtRoot) => {
                log_debug!("DRILL", "back ignored at root");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Straight back to the root view.
    pub fn reset(&mut self) -> VisualResult<()> {
        self.ensure_idle()?;
        log_info!("DRILL", "reset from depth {}", self.navigator.depth());
        self.navigator.reset_to_root();
        self.render();
        Ok(())
    }

    /// Selection overlay. Out-of-range or None clears it. The redraw only
    /// restyles the current bars, so it neither waits for nor sets the busy
    /// flag.
    pub fn select(&mut self, index: Option<usize>) {
        self.navigator.select(index);
        let keys: Vec<CategoryValue> = self
            .navigator
            .selection()
            .selected
            .and_then(|i| self.navigator.current().level.categories.get(i).cloned())
            .into_iter()
            .collect();
        self.navigator.set_pending_selection(keys);
        self.draw();
    }

    /// The renderer finished the last redraw.
    pub fn render_complete(&mut self) {
        self.busy = false;
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn ensure_idle(&self) -> VisualResult<()> {
        if self.busy {
            log_debug!("DRILL", "event rejected while rendering");
            return Err(VisualError::Busy);
        }
        Ok(())
    }

    fn category_at(&self, index: usize) -> VisualResult<CategoryValue> {
        let categories = &self.navigator.current().level.categories;
        categories
            .get(index)
            .cloned()
            .ok_or(VisualError::CategoryIndex {
                index,
                count: categories.len(),
            })
    }

    /// Draws the current view and marks a transition in progress.
    fn render(&mut self) {
        self.busy = self.draw();
    }

    /// Draws the current view. Returns whether a chart (not the empty state)
    /// was drawn.
    fn draw(&mut self) -> bool {
        let view = self.navigator.current();
        if view.is_empty() {
            log_debug!("DRILL", "empty view at depth {}", view.depth());
            self.renderer.render_empty();
            return false;
        }

        let option = build_option(view, &self.settings, self.navigator.selection());
        self.renderer.render(&option, true);
        true
    }
}
