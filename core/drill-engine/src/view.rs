//! FILENAME: core/drill-engine/src/view.rs
//! Level View - The fully prepared output for one navigation state.
//!
//! A view bundles the ordered level result with the axis scales computed over
//! its final series. The render layer consumes views and nothing else.

use chart_model::{CategoryValue, ValueAxis};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::aggregate::{aggregate, apply_scale, LevelResult};
use crate::axis::{compute_scale, AxisScale};
use crate::cache::DrillCache;
use crate::definition::DrillDefinition;

/// Category keys chosen at each completed drill-in. Its length is the depth.
pub type DrillPath = SmallVec<[CategoryValue; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected: Option<usize>,
    pub hover: Option<usize>,
}

impl SelectionState {
    pub fn clear(&mut self) {
        self.selected = None;
        self.hover = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelView {
    pub path: DrillPath,
    pub level: LevelResult,
    pub primary_axis: AxisScale,
    /// Present only when at least one series is plotted on the secondary axis.
    pub secondary_axis: Option<AxisScale>,
    /// Whether any category in this view can be drilled into.
    pub drillable: bool,
}

impl LevelView {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_empty()
    }

    pub fn is_drilled(&self) -> bool {
        !self.path.is_empty()
    }

    /// Label of the category this view was drilled from.
    pub fn drilled_label(&self) -> Option<String> {
        self.path.last().map(|c| c.label())
    }

    pub fn has_secondary_axis(&self) -> bool {
        self.secondary_axis.is_some()
    }
}

/// Runs aggregation, depth scaling and ordering for one level.
pub fn build_level(
    cache: &DrillCache,
    definition: &DrillDefinition,
    depth: usize,
    path: &[CategoryValue],
) -> LevelResult {
    let mut raw = aggregate(cache, depth, path);
    apply_scale(&mut raw, depth);
    definition.ordering().apply(&raw).0
}

/// Wraps an ordered level with axis scales for its final series.
pub fn build_view(
    level: LevelResult,
    definition: &DrillDefinition,
    path: DrillPath,
    drillable: bool,
) -> LevelView {
    let primary_axis = compute_scale(&level.series, ValueAxis::Primary, &definition.primary_axis);
    let secondary_axis = level
        .series
        .iter()
        .any(|s| s.style.is_secondary())
        .then(|| compute_scale(&level.series, ValueAxis::Secondary, &definition.secondary_axis));

    LevelView {
        path,
        level,
        primary_axis,
        secondary_axis,
        drillable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Series;
    use chart_model::SeriesStyle;
    use smallvec::smallvec;

    fn series(name: &str, data: Vec<f64>, axis: ValueAxis) -> Series {
        let mut style = SeriesStyle::default();
        style.value_axis = axis;
        Series {
            name: name.to_string(),
            data,
            style,
            source_format: None,
        }
    }

    #[test]
    fn test_secondary_axis_only_when_used() {
        let definition = DrillDefinition::default();
        let single = LevelResult::new(
            vec!["A".into()],
            vec![series("S", vec![4.0], ValueAxis::Primary)],
        );
        let view = build_view(single, &definition, DrillPath::new(), false);
        assert!(!view.has_secondary_axis());
        assert_eq!(view.depth(), 0);

        let dual = LevelResult::new(
            vec!["A".into()],
            vec![
                series("S", vec![4.0], ValueAxis::Primary),
                series("T", vec![400.0], ValueAxis::Secondary),
            ],
        );
        let view = build_view(dual, &definition, smallvec![CategoryValue::text("West")], true);
        assert!(view.has_secondary_axis());
        assert_eq!(view.primary_axis.max, Some(4.0));
        assert_eq!(view.secondary_axis.and_then(|a| a.max), Some(400.0));
    }

    #[test]
    fn test_depth_follows_path() {
        let definition = DrillDefinition::default();
        let view = build_view(
            LevelResult::empty(),
            &definition,
            smallvec![CategoryValue::text("West"), CategoryValue::text("Jan")],
            false,
        );
        assert_eq!(view.depth(), 2);
        assert_eq!(view.drilled_label().as_deref(), Some("Jan"));
        assert!(view.is_empty());
    }
}
