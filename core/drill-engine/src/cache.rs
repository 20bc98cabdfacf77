//! FILENAME: core/drill-engine/src/cache.rs
//! Drill Cache - Column-oriented internal representation of one data refresh.
//!
//! The cache is designed for:
//! - One O(n) build per host data refresh
//! - Re-aggregation at any depth without re-reading host cells
//! - Memory-efficient storage via category value interning
//!
//! Architecture:
//! - Each hierarchy level stores its unique category values once
//! - Rows reference those values by ValueId
//! - Measures stay as plain optional points, index-aligned with rows

use chart_model::{CategoryKey, CategoryValue, NumericPoint, SeriesStyle};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A reference to an interned category within one level's value store.
pub type ValueId = u32;

/// Cache for a single hierarchy level (one category column).
#[derive(Debug, Clone)]
pub struct LevelField {
    /// Display name of the category column.
    pub name: String,

    /// Map from grouping key to its unique ID.
    value_to_id: FxHashMap<CategoryKey, ValueId>,

    /// Unique values in first-appearance order (indexed by ValueId).
    id_to_value: Vec<CategoryValue>,

    /// One ValueId per row.
    row_ids: Vec<ValueId>,
}

impl LevelField {
    pub fn new(name: impl Into<String>, values: Vec<CategoryValue>) -> Self {
        let mut field = LevelField {
            name: name.into(),
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
            row_ids: Vec::with_capacity(values.len()),
        };
        for value in values {
            let id = field.intern(value);
            field.row_ids.push(id);
        }
        field
    }

    /// Interns a value and returns its ValueId.
    /// If an identical value already exists, returns the existing ID.
    fn intern(&mut self, value: CategoryValue) -> ValueId {
        let key = CategoryKey::from(&value);
        if let Some(&id) = self.value_to_id.get(&key) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value);
        self.value_to_id.insert(key, id);
        id
    }

    /// Gets the value for a given ID.
    pub fn get_value(&self, id: ValueId) -> Option<&CategoryValue> {
        self.id_to_value.get(id as usize)
    }

    /// ValueId of the given row.
    pub fn id_at(&self, row: usize) -> Option<ValueId> {
        self.row_ids.get(row).copied()
    }

    pub fn row_count(&self) -> usize {
        self.row_ids.len()
    }

    /// Returns the number of unique values.
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// One flag per ValueId: whether that value matches `key` under the
    /// click-matching rules of [`chart_model::category_key_equals`].
    pub fn match_mask(&self, key: &CategoryValue) -> Vec<bool> {
        self.id_to_value
            .iter()
            .map(|v| chart_model::category_key_equals(v, key))
            .collect()
    }
}

// ============================================================================
// MEASURES
// ============================================================================

/// A numeric column, index-aligned with the category rows.
/// Rows past the end of `values` count as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureColumn {
    pub values: Vec<Option<NumericPoint>>,
    /// Cross-filter overlay values, when the host supplies them.
    #[serde(default)]
    pub highlights: Option<Vec<Option<NumericPoint>>>,
}

impl MeasureColumn {
    pub fn new(values: Vec<Option<NumericPoint>>) -> Self {
        MeasureColumn {
            values,
            highlights: None,
        }
    }

    pub fn with_highlights(mut self, highlights: Vec<Option<NumericPoint>>) -> Self {
        self.highlights = Some(highlights);
        self
    }

    /// Value at `row`, with missing points resolved to 0.
    pub fn value_at(&self, row: usize) -> f64 {
        chart_model::point_value(self.values.get(row).copied().flatten())
    }

    pub fn highlight_at(&self, row: usize) -> Option<f64> {
        self.highlights
            .as_ref()
            .map(|h| chart_model::point_value(h.get(row).copied().flatten()))
    }
}

/// A display series: a measure plus how it should look.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub name: String,
    pub style: SeriesStyle,
    /// The host's format string for this measure, if any.
    pub source_format: Option<String>,
    pub measure: MeasureColumn,
}

impl SeriesColumn {
    pub fn new(name: impl Into<String>, measure: MeasureColumn) -> Self {
        SeriesColumn {
            name: name.into(),
            style: SeriesStyle::default(),
            source_format: None,
            measure,
        }
    }

    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_source_format(mut self, format: impl Into<String>) -> Self {
        self.source_format = Some(format.into());
        self
    }
}

// ============================================================================
// DRILL CACHE
// ============================================================================

/// The complete row set for one host data refresh.
#[derive(Debug, Clone, Default)]
pub struct DrillCache {
    levels: Vec<LevelField>,
    series: Vec<SeriesColumn>,
    label_visibility: Option<MeasureColumn>,
}

impl DrillCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the next hierarchy level. Every level must have as many rows as
    /// the first one.
    pub fn add_level(
        &mut self,
        name: impl Into<String>,
        values: Vec<CategoryValue>,
    ) -> DrillResult<()> {
        let name = name.into();
        if let Some(first) = self.levels.first() {
            if first.row_count() != values.len() {
                return Err(DrillError::ColumnLengthMismatch {
                    column: name,
                    expected: first.row_count(),
                    actual: values.len(),
                });
            }
        }
        self.levels.push(LevelField::new(name, values));
        Ok(())
    }

    pub fn add_series(&mut self, series: SeriesColumn) {
        self.series.push(series);
    }

    pub fn set_label_visibility(&mut self, column: MeasureColumn) {
        self.label_visibility = Some(column);
    }

    /// Gets a hierarchy level by index.
    pub fn level(&self, index: usize) -> DrillResult<&LevelField> {
        self.levels.get(index).ok_or(DrillError::LevelOutOfRange {
            level: index,
            levels: self.levels.len(),
        })
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn row_count(&self) -> usize {
        self.levels.first().map_or(0, |l| l.row_count())
    }

    pub fn series(&self) -> &[SeriesColumn] {
        &self.series
    }

    pub fn label_visibility(&self) -> Option<&MeasureColumn> {
        self.label_visibility.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.series.is_empty()
    }
}
