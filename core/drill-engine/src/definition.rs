//! FILENAME: core/drill-engine/src/definition.rs
//! Drill Definition - The serializable view configuration.
//!
//! This module contains the types that DESCRIBE how every level is laid out:
//! category limiting, display sort, and per-axis scale preferences.
//! A definition is an immutable snapshot of user intent; the navigator
//! re-derives views from it whenever it changes.

use chart_model::FormatOptions;
use serde::{Deserialize, Serialize};

use crate::ordering::CategoryOrdering;

// ============================================================================
// ORDERING
// ============================================================================

/// Display sort direction for categories, by ranking value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Maps the host's numeric sort code (1 = ascending, 2 = descending).
    pub fn from_host_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SortDirection::Ascending),
            2 => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

// ============================================================================
// AXIS OPTIONS
// ============================================================================

/// User preferences for one value axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    /// Headroom above the tallest value, as a fraction of the data range.
    /// Clamped to `[0, 1]` when the scale is computed.
    #[serde(default)]
    pub tolerance: f64,

    /// Requested number of splits. 0 lets the renderer decide.
    #[serde(default)]
    pub split_count: u32,

    /// Tick label formatting. A missing source format is filled from the
    /// first series plotted on the axis.
    #[serde(default)]
    pub format: FormatOptions,
}

impl Default for AxisOptions {
    fn default() -> Self {
        AxisOptions {
            tolerance: 0.0,
            split_count: 0,
            format: FormatOptions::default(),
        }
    }
}

// ============================================================================
// DRILL DEFINITION
// ============================================================================

/// The complete layout configuration applied at every drill depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDefinition {
    /// Keep only the top N categories by ranking value. None (or 0) keeps all.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Display sort. None keeps first-seen order.
    #[serde(default)]
    pub sort: Option<SortDirection>,

    #[serde(default)]
    pub primary_axis: AxisOptions,

    #[serde(default)]
    pub secondary_axis: AxisOptions,

    /// Bumped whenever the definition changes so cached root views can be
    /// recognised as stale.
    #[serde(default)]
    pub version: u64,
}

impl DrillDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordering policy this definition describes.
    pub fn ordering(&self) -> CategoryOrdering {
        CategoryOrdering {
            limit: self.limit.filter(|&n| n > 0),
            sort: self.sort,
        }
    }

    pub fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl Default for DrillDefinition {
    fn default() -> Self {
        DrillDefinition {
            limit: None,
            sort: None,
            primary_axis: AxisOptions::default(),
            secondary_axis: AxisOptions::default(),
            version: 0,
        }
    }
}
