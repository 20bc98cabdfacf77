//! FILENAME: core/drill-engine/src/aggregate.rs
//! Aggregator - Groups cached rows into one level's categories and series.
//!
//! Algorithm:
//! 1. Keep rows whose category prefix matches the filter path
//! 2. Group those rows by their ValueId at the requested level, in
//!    first-appearance order
//! 3. Sum every measure (and its highlight overlay) per group
//! 4. Let a non-zero highlight overlay replace the base sums per series

use chart_model::{CategoryValue, SeriesStyle};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::cache::{DrillCache, LevelField, MeasureColumn, ValueId};

// ============================================================================
// LEVEL RESULT
// ============================================================================

/// One display series at a given level, index-aligned with the categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<f64>,
    pub style: SeriesStyle,
    pub source_format: Option<String>,
}

/// Categories plus every series aggregated over them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelResult {
    pub categories: Vec<CategoryValue>,
    pub series: Vec<Series>,
    /// Ranking value per category: the base (non-highlight) sum of the first
    /// series. Drives limiting and sorting.
    pub ranking: Vec<f64>,
    /// Per-category sum of the label-visibility measure, when one is bound.
    pub label_visibility: Option<Vec<f64>>,
}

impl LevelResult {
    /// A result whose ranking is taken from the first series' data.
    pub fn new(categories: Vec<CategoryValue>, series: Vec<Series>) -> Self {
        let ranking = series
            .first()
            .map(|s| s.data.clone())
            .unwrap_or_else(|| vec![0.0; categories.len()]);
        LevelResult {
            categories,
            series,
            ranking,
            label_visibility: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Every per-category array has exactly one entry per category.
    pub fn is_aligned(&self) -> bool {
        let n = self.categories.len();
        self.ranking.len() == n
            && self.series.iter().all(|s| s.data.len() == n)
            && self.label_visibility.as_ref().map_or(true, |v| v.len() == n)
    }

    /// Rebuilds the result with categories taken in `order`. Every series,
    /// the ranking and the label visibility move together.
    pub fn permuted(&self, order: &[usize]) -> LevelResult {
        let pick = |values: &[f64]| -> Vec<f64> {
            order.iter().filter_map(|&i| values.get(i).copied()).collect()
        };

        LevelResult {
            categories: order
                .iter()
                .filter_map(|&i| self.categories.get(i).cloned())
                .collect(),
            series: self
                .series
                .iter()
                .map(|s| Series {
                    name: s.name.clone(),
                    data: pick(&s.data),
                    style: s.style.clone(),
                    source_format: s.source_format.clone(),
                })
                .collect(),
            ranking: pick(&self.ranking),
            label_visibility: self.label_visibility.as_deref().map(pick),
        }
    }

    /// Index of the category matching `key` under click-matching rules.
    pub fn position_of(&self, key: &CategoryValue) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| chart_model::category_key_equals(c, key))
    }
}

// ============================================================================
// ROW FILTER
// ============================================================================

/// Resolves a drill path to per-level ValueId masks once, so each row is
/// tested with plain indexing.
struct RowFilter<'a> {
    masks: Vec<(&'a LevelField, Vec<bool>)>,
}

impl<'a> RowFilter<'a> {
    /// None when the path is deeper than the hierarchy.
    fn new(cache: &'a DrillCache, path: &[CategoryValue]) -> Option<Self> {
        let mut masks = Vec::with_capacity(path.len());
        for (level_index, key) in path.iter().enumerate() {
            let level = cache.level(level_index).ok()?;
            masks.push((level, level.match_mask(key)));
        }
        Some(RowFilter { masks })
    }

    fn matches(&self, row: usize) -> bool {
        self.masks.iter().all(|(level, mask)| {
            level
                .id_at(row)
                .and_then(|id| mask.get(id as usize).copied())
                .unwrap_or(false)
        })
    }
}

/// Rows matching `path`, grouped by their ValueId at `level`.
/// Returns (group ValueIds in first-seen order, (row, group) pairs).
fn group_rows(
    cache: &DrillCache,
    level: &LevelField,
    path: &[CategoryValue],
) -> (Vec<ValueId>, Vec<(usize, usize)>) {
    let filter = match RowFilter::new(cache, path) {
        Some(f) => f,
        None => return (Vec::new(), Vec::new()),
    };

    let mut group_of: FxHashMap<ValueId, usize> = FxHashMap::default();
    let mut group_ids = Vec::new();
    let mut assignments = Vec::new();

    for row in 0..level.row_count() {
        if !filter.matches(row) {
            continue;
        }
        let Some(id) = level.id_at(row) else {
            continue;
        };
        let group = *group_of.entry(id).or_insert_with(|| {
            group_ids.push(id);
            group_ids.len() - 1
        });
        assignments.push((row, group));
    }

    (group_ids, assignments)
}

// ============================================================================
// AGGREGATION
// ============================================================================

#[derive(Debug, Clone)]
struct MeasureSums {
    base: Vec<f64>,
    highlight: Option<Vec<f64>>,
}

impl MeasureSums {
    fn collect(measure: &MeasureColumn, groups: usize, assignments: &[(usize, usize)]) -> Self {
        let mut base = vec![0.0; groups];
        let mut highlight = measure.highlights.as_ref().map(|_| vec![0.0; groups]);

        for &(row, group) in assignments {
            base[group] += measure.value_at(row);
            if let (Some(sums), Some(h)) = (highlight.as_mut(), measure.highlight_at(row)) {
                sums[group] += h;
            }
        }

        MeasureSums { base, highlight }
    }

    /// Highlight sums win when at least one of them is non-zero.
    fn display(&self) -> Vec<f64> {
        match &self.highlight {
            Some(h) if h.iter().any(|&v| v != 0.0) => h.clone(),
            _ => self.base.clone(),
        }
    }
}

/// Aggregates the rows under `filter_path` at `level_index`, before ordering.
///
/// Returns an empty result when the level does not exist, when no row
/// matches, when there is no display series, or when a drill target
/// (non-empty `filter_path`) has one distinct value or fewer.
pub fn aggregate(cache: &DrillCache, level_index: usize, filter_path: &[CategoryValue]) -> LevelResult {
    let level = match cache.level(level_index) {
        Ok(level) => level,
        Err(_) => return LevelResult::empty(),
    };
    if cache.series().is_empty() {
        return LevelResult::empty();
    }

    let (group_ids, assignments) = group_rows(cache, level, filter_path);
    if group_ids.is_empty() {
        return LevelResult::empty();
    }
    if !filter_path.is_empty() && group_ids.len() <= 1 {
        return LevelResult::empty();
    }

    let groups = group_ids.len();
    let categories: Vec<CategoryValue> = group_ids
        .iter()
        .map(|&id| level.get_value(id).cloned().unwrap_or_default())
        .collect();

    let mut ranking = None;
    let series: Vec<Series> = cache
        .series()
        .iter()
        .map(|column| {
            let sums = MeasureSums::collect(&column.measure, groups, &assignments);
            if ranking.is_none() {
                ranking = Some(sums.base.clone());
            }
            Series {
                name: column.name.clone(),
                data: sums.display(),
                style: column.style.clone(),
                source_format: column.source_format.clone(),
            }
        })
        .collect();

    let label_visibility = cache
        .label_visibility()
        .map(|m| MeasureSums::collect(m, groups, &assignments).base);

    LevelResult {
        categories,
        series,
        ranking: ranking.unwrap_or_else(|| vec![0.0; groups]),
        label_visibility,
    }
}

/// Multiplies each series by its scale factor for the given depth.
pub fn apply_scale(level: &mut LevelResult, depth: usize) {
    for series in &mut level.series {
        let factor = series.style.scale.at_depth(depth);
        if factor != 1.0 && factor.is_finite() {
            for v in &mut series.data {
                *v *= factor;
            }
        }
    }
}

/// Number of distinct values at `level_index` among rows matching `filter_path`.
pub fn distinct_count(cache: &DrillCache, level_index: usize, filter_path: &[CategoryValue]) -> usize {
    match cache.level(level_index) {
        Ok(level) => group_rows(cache, level, filter_path).0.len(),
        Err(_) => 0,
    }
}

/// Whether drilling from `filter_path` into `level_index` yields a level
/// worth showing: the level exists, rows match, and they span more than one
/// distinct value.
pub fn can_drill_further(cache: &DrillCache, level_index: usize, filter_path: &[CategoryValue]) -> bool {
    distinct_count(cache, level_index, filter_path) > 1
}

/// Whether any category at `depth` under `path` has more than one distinct
/// child at `depth + 1`.
pub fn any_drillable(cache: &DrillCache, depth: usize, path: &[CategoryValue]) -> bool {
    let (Ok(current), Ok(next)) = (cache.level(depth), cache.level(depth + 1)) else {
        return false;
    };
    let Some(filter) = RowFilter::new(cache, path) else {
        return false;
    };

    let mut seen: FxHashSet<(ValueId, ValueId)> = FxHashSet::default();
    let mut children: FxHashMap<ValueId, usize> = FxHashMap::default();

    for row in 0..current.row_count() {
        if !filter.matches(row) {
            continue;
        }
        let (Some(parent), Some(child)) = (current.id_at(row), next.id_at(row)) else {
            continue;
        };
        if seen.insert((parent, child)) {
            let count = children.entry(parent).or_insert(0);
            *count += 1;
            if *count > 1 {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SeriesColumn;
    use chart_model::{NumericPoint, ScaleFactor};

    fn points(values: &[f64]) -> Vec<Option<NumericPoint>> {
        values.iter().map(|&v| Some(NumericPoint::Plain(v))).collect()
    }

    fn labels(items: &[&str]) -> Vec<CategoryValue> {
        items.iter().map(|&s| CategoryValue::text(s)).collect()
    }

    fn region_month_cache() -> DrillCache {
        let mut cache = DrillCache::new();
        cache
            .add_level(
                "Region",
                vec!["West".into(), "East".into(), "West".into(), "East".into(), "North".into()],
            )
            .unwrap();
        cache
            .add_level(
                "Month",
                vec!["Jan".into(), "Jan".into(), "Feb".into(), "Jan".into(), "Mar".into()],
            )
            .unwrap();
        cache.add_series(SeriesColumn::new(
            "Sales",
            MeasureColumn::new(points(&[10.0, 20.0, 30.0, 40.0, 50.0])),
        ));
        cache
    }

    #[test]
    fn test_root_keeps_first_seen_order() {
        let cache = region_month_cache();
        let level = aggregate(&cache, 0, &[]);
        assert_eq!(level.categories, labels(&["West", "East", "North"]));
        assert_eq!(level.series[0].data, vec![40.0, 60.0, 50.0]);
        assert_eq!(level.ranking, vec![40.0, 60.0, 50.0]);
        assert!(level.is_aligned());
    }

    #[test]
    fn test_drill_filters_by_path() {
        let cache = region_month_cache();
        let level = aggregate(&cache, 1, &["West".into()]);
        assert_eq!(level.categories, labels(&["Jan", "Feb"]));
        assert_eq!(level.series[0].data, vec![10.0, 30.0]);
    }

    #[test]
    fn test_single_child_is_empty() {
        let cache = region_month_cache();
        // East only has Jan
        assert!(aggregate(&cache, 1, &["East".into()]).is_empty());
        assert!(!can_drill_further(&cache, 1, &["East".into()]));
        assert!(can_drill_further(&cache, 1, &["West".into()]));
    }

    #[test]
    fn test_missing_level_and_no_match() {
        let cache = region_month_cache();
        assert!(aggregate(&cache, 2, &["West".into(), "Jan".into()]).is_empty());
        assert!(aggregate(&cache, 1, &["South".into()]).is_empty());
        assert_eq!(distinct_count(&cache, 7, &[]), 0);
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let mut cache = DrillCache::new();
        cache
            .add_level("Cat", vec!["A".into(), "A".into(), "A".into(), "A".into()])
            .unwrap();
        // null, "", undefined all arrive as missing points
        cache.add_series(SeriesColumn::new(
            "M",
            MeasureColumn::new(vec![None, None, None, Some(NumericPoint::Plain(5.0))]),
        ));
        let level = aggregate(&cache, 0, &[]);
        assert_eq!(level.series[0].data, vec![5.0]);
        assert!(!level.series[0].data[0].is_nan());
    }

    #[test]
    fn test_highlight_override() {
        let mut cache = DrillCache::new();
        cache
            .add_level("Cat", vec!["A".into(), "B".into(), "C".into()])
            .unwrap();
        cache.add_series(SeriesColumn::new(
            "Sales",
            MeasureColumn::new(points(&[3.0, 4.0, 5.0])).with_highlights(points(&[0.0, 0.0, 7.0])),
        ));
        cache.add_series(SeriesColumn::new(
            "Cost",
            MeasureColumn::new(points(&[1.0, 1.0, 1.0])).with_highlights(points(&[0.0, 0.0, 0.0])),
        ));

        let level = aggregate(&cache, 0, &[]);
        assert_eq!(level.series[0].data, vec![0.0, 0.0, 7.0]);
        // All-zero highlights leave the base sums in place
        assert_eq!(level.series[1].data, vec![1.0, 1.0, 1.0]);
        // Ranking ignores the overlay
        assert_eq!(level.ranking, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_label_visibility_aggregates_with_categories() {
        let mut cache = region_month_cache();
        cache.set_label_visibility(MeasureColumn::new(points(&[1.0, 0.0, 1.0, 0.0, 1.0])));
        let level = aggregate(&cache, 0, &[]);
        assert_eq!(level.label_visibility, Some(vec![2.0, 0.0, 1.0]));
    }

    #[test]
    fn test_no_series_is_empty() {
        let mut cache = DrillCache::new();
        cache.add_level("Cat", vec!["A".into()]).unwrap();
        assert!(aggregate(&cache, 0, &[]).is_empty());
    }

    #[test]
    fn test_any_drillable() {
        let cache = region_month_cache();
        assert!(any_drillable(&cache, 0, &[]));
        assert!(!any_drillable(&cache, 1, &["West".into()]));

        let mut flat = DrillCache::new();
        flat.add_level("Region", vec!["A".into(), "B".into()]).unwrap();
        flat.add_level("Month", vec!["Jan".into(), "Feb".into()]).unwrap();
        assert!(!any_drillable(&flat, 0, &[]));
    }

    #[test]
    fn test_scale_by_depth() {
        let mut cache = DrillCache::new();
        cache.add_level("Cat", vec!["A".into(), "B".into()]).unwrap();
        let mut style = SeriesStyle::default();
        style.scale = ScaleFactor::Individual { base: 2.0, drill: 0.5 };
        cache.add_series(SeriesColumn::new("M", MeasureColumn::new(points(&[1.0, 3.0]))).with_style(style));

        let mut root = aggregate(&cache, 0, &[]);
        apply_scale(&mut root, 0);
        assert_eq!(root.series[0].data, vec![2.0, 6.0]);

        let mut drilled = aggregate(&cache, 0, &[]);
        apply_scale(&mut drilled, 1);
        assert_eq!(drilled.series[0].data, vec![0.5, 1.5]);
    }

    #[test]
    fn test_permuted_moves_everything_together() {
        let mut cache = region_month_cache();
        cache.set_label_visibility(MeasureColumn::new(points(&[1.0, 0.0, 1.0, 0.0, 1.0])));
        let level = aggregate(&cache, 0, &[]);
        let reordered = level.permuted(&[2, 0]);
        assert_eq!(reordered.categories, labels(&["North", "West"]));
        assert_eq!(reordered.series[0].data, vec![50.0, 40.0]);
        assert_eq!(reordered.ranking, vec![50.0, 40.0]);
        assert_eq!(reordered.label_visibility, Some(vec![1.0, 2.0]));
        assert!(reordered.is_aligned());
    }
}
