//! FILENAME: app/visual/src/api_types.rs
// PURPOSE: Shared type definitions handed to the chart widget and the host.
// CONTEXT: All structs use camelCase serialization for JavaScript interoperability.

use chart_model::LineType;
use serde::{Deserialize, Serialize};

use crate::legend::LegendOption;

pub const ANIMATION_DURATION_MS: u32 = 800;
pub const ANIMATION_EASING: &str = "cubicInOut";

/// One complete chart option. Every transition replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub title: TitleOption,
    pub categories: Vec<String>,
    pub legend_names: Vec<String>,
    pub series: Vec<SeriesOption>,
    pub legend: LegendOption,
    pub x_axis: CategoryAxisOption,
    pub y_axis: ValueAxes,
    pub grid_bottom: String,
    pub animation_duration: u32,
    pub animation_easing: &'static str,
    /// Category index drawn with the selection emphasis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
}

impl ChartOption {
    /// Nothing to plot; the renderer shows its empty state.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.series.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleOption {
    pub show: bool,
    pub text: String,
    pub top: String,
}

// ============================================================================
// SERIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: Vec<f64>,
    pub item_style: ItemStyle,
    /// Bars only, e.g. `"60%"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_width: Option<String>,
    /// Lines and areas only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    /// Present (as `{}`) for area series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<AreaStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_symbol: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_size: Option<f64>,
    /// 1 for series on the secondary axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<u8>,
    pub label: LabelOption,
    /// Pre-formatted data label per point, index-aligned with `data`.
    pub formatted_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    #[serde(rename = "type")]
    pub kind: LineType,
    pub opacity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaStyle {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOption {
    pub show: bool,
    pub position: &'static str,
    pub distance: f64,
    pub color: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_style: &'static str,
    pub font_weight: &'static str,
    pub opacity: f64,
}

// ============================================================================
// AXES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabelOption {
    pub show: bool,
    pub color: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_style: &'static str,
    pub font_weight: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Toggle {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxisOption {
    pub axis_line: Toggle,
    pub axis_label: AxisLabelOption,
    pub split_line: Toggle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

/// One value axis. Bounds are absent when the renderer should auto-scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxisOption {
    pub axis_label: AxisLabelOption,
    pub split_line: Toggle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<AxisTick>,
}

/// A single value axis, or `[primary, secondary]` when any series uses
/// the secondary axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValueAxes {
    Single(ValueAxisOption),
    Dual([ValueAxisOption; 2]),
}

impl ValueAxes {
    pub fn primary(&self) -> &ValueAxisOption {
        match self {
            ValueAxes::Single(axis) => axis,
            ValueAxes::Dual([primary, _]) => primary,
        }
    }

    pub fn secondary(&self) -> Option<&ValueAxisOption> {
        match self {
            ValueAxes::Single(_) => None,
            ValueAxes::Dual([_, secondary]) => Some(secondary),
        }
    }
}

// ============================================================================
// HOST STATE
// ============================================================================

/// Navigation state reported back to the host after each event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualState {
    pub depth: usize,
    /// Labels of the drilled categories, outermost first.
    pub path: Vec<String>,
    pub can_go_back: bool,
    pub drillable: bool,
    pub selected: Option<usize>,
    pub busy: bool,
}
