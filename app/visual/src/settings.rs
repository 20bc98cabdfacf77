//! FILENAME: app/visual/src/settings.rs
// PURPOSE: Host formatting objects, deserialized into typed settings.
// CONTEXT: The host sends `objects` as loose JSON. Dropdowns arrive either as
// a bare value or as `{ value, displayName }`; colors either as a CSS string
// or as `{ solid: { color } }`. Every field has a default, so a missing or
// unreadable object or property renders exactly like a fresh visual.

use std::collections::HashMap;

use chart_model::{Color, Decimals, DisplayUnits, FormatOptions, ValueType, DEFAULT_SERIES_COLOR};
use drill_engine::{AxisOptions, DrillDefinition, SortDirection};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::log_warn;

// ============================================================================
// HOST VALUE SHAPES
// ============================================================================

/// Deserializes a dropdown value sent either bare or wrapped.
fn dropdown<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let inner = raw.get("value").unwrap_or(&raw);
    T::deserialize(inner).map_err(D::Error::custom)
}

/// Reads one formatting object. When the object as a whole does not
/// deserialize, each property is tried on its own: unreadable properties are
/// logged and dropped so they take their defaults, and the rest still apply.
pub(crate) fn read_object<T>(name: &str, raw: Option<&Value>) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match raw {
        Some(raw) if !raw.is_null() => raw,
        _ => return T::default(),
    };
    if let Ok(value) = T::deserialize(raw) {
        return value;
    }

    let properties = match raw.as_object() {
        Some(properties) => properties,
        None => {
            log_warn!("SETTINGS", "'{}' is not an object, using defaults", name);
            return T::default();
        }
    };

    let kept: Map<String, Value> = properties
        .iter()
        .filter(|(key, value)| {
            let single: Map<String, Value> =
                std::iter::once(((*key).clone(), (*value).clone())).collect();
            match T::deserialize(&Value::Object(single)) {
                Ok(_) => true,
                Err(e) => {
                    log_warn!("SETTINGS", "ignoring {}.{}: {}", name, key, e);
                    false
                }
            }
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    T::deserialize(&Value::Object(kept)).unwrap_or_else(|e| {
        log_warn!("SETTINGS", "'{}' unreadable, using defaults: {}", name, e);
        T::default()
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidColor {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidFill {
    pub solid: SolidColor,
}

/// A color as the host sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostColor {
    Plain(String),
    Solid { solid: SolidColor },
    Fill { fill: SolidFill },
}

impl HostColor {
    pub fn css(&self) -> &str {
        match self {
            HostColor::Plain(s) => s,
            HostColor::Solid { solid } => &solid.color,
            HostColor::Fill { fill } => &fill.solid.color,
        }
    }

    /// The parsed color, if the host string is a hex color.
    pub fn color(&self) -> Option<Color> {
        Color::from_hex(self.css())
    }
}

fn color_or<'de, D>(deserializer: D, fallback: Color) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let host = Option::<HostColor>::deserialize(deserializer)?;
    Ok(host.and_then(|c| c.color()).unwrap_or(fallback))
}

// ============================================================================
// SHARED ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FontStyle {
    #[default]
    #[serde(alias = "normal")]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn weight(&self) -> &'static str {
        match self {
            FontStyle::Bold | FontStyle::BoldItalic => "bold",
            _ => "normal",
        }
    }

    pub fn style(&self) -> &'static str {
        match self {
            FontStyle::Italic | FontStyle::BoldItalic => "italic",
            _ => "normal",
        }
    }
}

/// Data label placement in the host's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LabelPosition {
    #[default]
    Auto,
    OutsideEnd,
    InsideEnd,
    InsideCenter,
    InsideBase,
}

impl LabelPosition {
    /// The matching position on a horizontal bar.
    pub fn chart_position(&self) -> &'static str {
        match self {
            LabelPosition::Auto | LabelPosition::OutsideEnd => "right",
            LabelPosition::InsideEnd => "insideRight",
            LabelPosition::InsideCenter => "inside",
            LabelPosition::InsideBase => "insideLeft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LegendPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LegendAlignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendIcon {
    Circle,
    #[serde(alias = "square")]
    Rect,
    RoundRect,
    Triangle,
    Diamond,
    Pin,
    Arrow,
}

// ============================================================================
// OBJECTS
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_max_categories() -> f64 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataOptions {
    #[serde(default)]
    pub limit_categories: bool,
    #[serde(default = "default_max_categories")]
    pub max_categories: f64,
}

impl Default for DataOptions {
    fn default() -> Self {
        DataOptions {
            limit_categories: false,
            max_categories: default_max_categories(),
        }
    }
}

impl DataOptions {
    /// The top-N limit, when limiting is switched on with a usable count.
    pub fn category_limit(&self) -> Option<usize> {
        if !self.limit_categories || !self.max_categories.is_finite() || self.max_categories < 1.0 {
            return None;
        }
        Some(self.max_categories.floor() as usize)
    }
}

const DEFAULT_LABEL_COLOR: Color = Color::new(0x44, 0x44, 0x44);
const DEFAULT_AXIS_LABEL_COLOR: Color = Color::new(0x66, 0x66, 0x66);

fn label_color<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
    color_or(d, DEFAULT_LABEL_COLOR)
}

fn axis_label_color<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
    color_or(d, DEFAULT_AXIS_LABEL_COLOR)
}

fn default_label_color() -> Color {
    DEFAULT_LABEL_COLOR
}

fn default_axis_label_color() -> Color {
    DEFAULT_AXIS_LABEL_COLOR
}

fn default_label_font() -> String {
    "Segoe UI".to_string()
}

fn default_axis_font() -> String {
    "Segoe UI, sans-serif".to_string()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_label_distance() -> f64 {
    5.0
}

/// `objects.dataLabels`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLabelSettings {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default = "default_label_color", deserialize_with = "label_color")]
    pub color: Color,
    #[serde(default = "default_label_font")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default, deserialize_with = "dropdown")]
    pub font_style: FontStyle,
    /// Percent, 0 = opaque.
    #[serde(default)]
    pub transparency: f64,
    /// Text drawn for blank values.
    #[serde(default)]
    pub show_blank_as: String,
    #[serde(default)]
    pub treat_zero_as_blank: bool,
    #[serde(default, deserialize_with = "dropdown")]
    pub position: LabelPosition,
    #[serde(default = "default_label_distance")]
    pub distance: f64,
    #[serde(default, deserialize_with = "dropdown")]
    pub value_type: ValueType,
    #[serde(default, deserialize_with = "dropdown")]
    pub display_units: DisplayUnits,
    #[serde(default, deserialize_with = "dropdown")]
    pub decimals: Decimals,
}

impl Default for DataLabelSettings {
    fn default() -> Self {
        DataLabelSettings {
            show: true,
            color: DEFAULT_LABEL_COLOR,
            font_family: default_label_font(),
            font_size: default_font_size(),
            font_style: FontStyle::Regular,
            transparency: 0.0,
            show_blank_as: String::new(),
            treat_zero_as_blank: false,
            position: LabelPosition::Auto,
            distance: default_label_distance(),
            value_type: ValueType::Auto,
            display_units: DisplayUnits::Auto,
            decimals: Decimals::Auto,
        }
    }
}

impl DataLabelSettings {
    pub fn opacity(&self) -> f64 {
        if !self.transparency.is_finite() {
            return 1.0;
        }
        (1.0 - self.transparency / 100.0).clamp(0.0, 1.0)
    }

    /// Formatter options for a measure with the given source format.
    pub fn format_options(&self, source_format: Option<&str>) -> FormatOptions {
        FormatOptions {
            value_type: self.value_type,
            display_units: self.display_units,
            decimals: self.decimals,
            source_format: source_format.map(str::to_string),
            ..FormatOptions::default()
        }
    }
}

fn default_marker_size() -> f64 {
    14.0
}

/// `objects.legend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendSettings {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default, deserialize_with = "dropdown")]
    pub position: LegendPosition,
    #[serde(default, deserialize_with = "dropdown")]
    pub alignment: LegendAlignment,
    /// Extra offset from the chart edge, in percent.
    #[serde(default)]
    pub extra_margin: f64,
    #[serde(default)]
    pub padding: f64,
    /// Per-side overrides; absent sides use `padding`.
    #[serde(default)]
    pub padding_top: Option<f64>,
    #[serde(default)]
    pub padding_right: Option<f64>,
    #[serde(default)]
    pub padding_bottom: Option<f64>,
    #[serde(default)]
    pub padding_left: Option<f64>,
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// None keeps the renderer's own icon.
    #[serde(default, deserialize_with = "dropdown")]
    pub icon_shape: Option<LegendIcon>,
}

impl Default for LegendSettings {
    fn default() -> Self {
        LegendSettings {
            show: true,
            position: LegendPosition::Top,
            alignment: LegendAlignment::Center,
            extra_margin: 0.0,
            padding: 0.0,
            padding_top: None,
            padding_right: None,
            padding_bottom: None,
            padding_left: None,
            marker_size: default_marker_size(),
            font_size: default_font_size(),
            icon_shape: None,
        }
    }
}

/// `objects.xAxis` (the category axis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxisSettings {
    #[serde(default = "default_true")]
    pub show_axis_line: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default = "default_axis_label_color", deserialize_with = "axis_label_color")]
    pub label_color: Color,
    #[serde(default = "default_font_size")]
    pub label_size: f64,
    #[serde(default)]
    pub rotate_labels: f64,
    #[serde(default = "default_axis_font")]
    pub font_family: String,
    #[serde(default, deserialize_with = "dropdown")]
    pub font_style: FontStyle,
    #[serde(default)]
    pub show_grid_lines: bool,
}

impl Default for CategoryAxisSettings {
    fn default() -> Self {
        CategoryAxisSettings {
            show_axis_line: true,
            show_labels: true,
            label_color: DEFAULT_AXIS_LABEL_COLOR,
            label_size: default_font_size(),
            rotate_labels: 0.0,
            font_family: default_axis_font(),
            font_style: FontStyle::Regular,
            show_grid_lines: false,
        }
    }
}

/// `objects.yAxis` (the value axes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxisSettings {
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default = "default_axis_label_color", deserialize_with = "axis_label_color")]
    pub label_color: Color,
    #[serde(default = "default_font_size")]
    pub label_size: f64,
    #[serde(default = "default_axis_font")]
    pub font_family: String,
    #[serde(default, deserialize_with = "dropdown")]
    pub font_style: FontStyle,
    /// Applies to the primary axis only.
    #[serde(default = "default_true")]
    pub show_grid_lines: bool,
    #[serde(default)]
    pub scale_adjustment_tolerance: f64,
    #[serde(default)]
    pub y_axis_splits: f64,
    #[serde(default, deserialize_with = "dropdown")]
    pub value_type: ValueType,
    #[serde(default, deserialize_with = "dropdown")]
    pub display_units: DisplayUnits,
    #[serde(default, deserialize_with = "dropdown")]
    pub value_decimals: Decimals,
}

impl Default for ValueAxisSettings {
    fn default() -> Self {
        ValueAxisSettings {
            show_labels: true,
            label_color: DEFAULT_AXIS_LABEL_COLOR,
            label_size: default_font_size(),
            font_family: default_axis_font(),
            font_style: FontStyle::Regular,
            show_grid_lines: true,
            scale_adjustment_tolerance: 0.0,
            y_axis_splits: 0.0,
            value_type: ValueType::Auto,
            display_units: DisplayUnits::Auto,
            value_decimals: Decimals::Auto,
        }
    }
}

impl ValueAxisSettings {
    pub fn axis_options(&self) -> AxisOptions {
        let splits = if self.y_axis_splits.is_finite() && self.y_axis_splits > 0.0 {
            self.y_axis_splits.floor().min(u32::MAX as f64) as u32
        } else {
            0
        };
        AxisOptions {
            tolerance: self.scale_adjustment_tolerance,
            split_count: splits,
            format: FormatOptions {
                value_type: self.value_type,
                display_units: self.display_units,
                decimals: self.value_decimals,
                ..FormatOptions::default()
            },
        }
    }
}

/// `objects.drillHeader`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillHeaderSettings {
    #[serde(default = "default_true")]
    pub show: bool,
}

impl Default for DrillHeaderSettings {
    fn default() -> Self {
        DrillHeaderSettings { show: true }
    }
}

// ============================================================================
// VISUAL SETTINGS
// ============================================================================

/// Every formatting object the visual reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSettings {
    #[serde(default)]
    pub data_options: DataOptions,
    #[serde(default)]
    pub data_labels: DataLabelSettings,
    #[serde(default)]
    pub legend: LegendSettings,
    #[serde(default)]
    pub x_axis: CategoryAxisSettings,
    #[serde(default)]
    pub y_axis: ValueAxisSettings,
    #[serde(default)]
    pub drill_header: DrillHeaderSettings,
    /// Host-resolved palette colors by series name.
    #[serde(default)]
    pub series_colors: HashMap<String, HostColor>,
    /// User color overrides by series name.
    #[serde(default)]
    pub data_point: HashMap<String, HostColor>,
}

impl VisualSettings {
    /// Reads the host `objects` JSON. `null` yields the defaults; anything
    /// unreadable falls back per object and per property.
    pub fn from_objects(objects: &Value) -> Self {
        if !objects.is_null() && !objects.is_object() {
            log_warn!("SETTINGS", "formatting objects are not an object, using defaults");
            return Self::default();
        }
        VisualSettings {
            data_options: read_object("dataOptions", objects.get("dataOptions")),
            data_labels: read_object("dataLabels", objects.get("dataLabels")),
            legend: read_object("legend", objects.get("legend")),
            x_axis: read_object("xAxis", objects.get("xAxis")),
            y_axis: read_object("yAxis", objects.get("yAxis")),
            drill_header: read_object("drillHeader", objects.get("drillHeader")),
            series_colors: read_object("seriesColors", objects.get("seriesColors")),
            data_point: read_object("dataPoint", objects.get("dataPoint")),
        }
    }

    /// User override first, then the host palette, then the default blue.
    pub fn series_color(&self, name: &str) -> Color {
        self.data_point
            .get(name)
            .and_then(HostColor::color)
            .or_else(|| self.series_colors.get(name).and_then(HostColor::color))
            .unwrap_or(DEFAULT_SERIES_COLOR)
    }

    /// The layout definition these settings describe.
    pub fn definition(&self, sort: Option<SortDirection>) -> DrillDefinition {
        let axis = self.y_axis.axis_options();
        DrillDefinition {
            limit: self.data_options.category_limit(),
            sort,
            primary_axis: axis.clone(),
            secondary_axis: axis,
            version: 0,
        }
    }
}
