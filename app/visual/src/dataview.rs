//! FILENAME: app/visual/src/dataview.rs
// PURPOSE: Converts the host's categorical data view into a DrillCache.
// CONTEXT: Category columns become hierarchy levels in order. Measure columns
// bound to a display role become series; the label-visibility role becomes
// the label gate. Cells are coerced once here so the engine never sees raw JSON.

use std::collections::{HashMap, HashSet};

use chart_model::{
    CategoryValue, ChartType, Color, LineType, NumericPoint, ScaleFactor, SeriesStyle, ValueAxis,
};
use chrono::{DateTime, NaiveDate};
use drill_engine::{DrillCache, DrillResult, MeasureColumn, SeriesColumn, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::{read_object, HostColor, VisualSettings};
use crate::log_debug;

/// Roles whose measures are drawn as series.
pub const DISPLAY_ROLES: [&str; 5] = ["series1", "series2", "series3", "series4", "series5"];
pub const LABEL_VISIBILITY_ROLE: &str = "labelVisibility";

// ============================================================================
// HOST DATA VIEW
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataView {
    #[serde(default)]
    pub categories: Vec<CategoryColumn>,
    #[serde(default)]
    pub values: Vec<ValueColumn>,
    /// Formatting objects, read by `VisualSettings`.
    #[serde(default)]
    pub objects: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryColumn {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub is_date_time: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueColumn {
    #[serde(default)]
    pub source: ColumnSource,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub highlights: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSource {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub roles: HashMap<String, bool>,
    #[serde(default)]
    pub format: Option<String>,
    /// Host sort code: 1 = ascending, 2 = descending.
    #[serde(default)]
    pub sort: Option<i64>,
    /// Secondary grouping key, when the measure is split by a series field.
    #[serde(default)]
    pub group_name: Option<Value>,
    #[serde(default)]
    pub objects: Option<Value>,
}

impl ColumnSource {
    fn has_role(&self, role: &str) -> bool {
        self.roles.get(role).copied().unwrap_or(false)
    }

    fn is_display(&self) -> bool {
        DISPLAY_ROLES.iter().any(|r| self.has_role(r))
    }

    fn group_label(&self) -> Option<String> {
        self.group_name
            .as_ref()
            .map(|g| category_cell(g, false))
            .filter(|g| !g.is_empty())
            .map(|g| g.label())
    }

    /// The measure's `seriesConfig` object. Unreadable properties are
    /// ignored one by one.
    fn series_config(&self) -> SeriesConfig {
        let raw = self.objects.as_ref().and_then(|o| o.get("seriesConfig"));
        read_object(&format!("seriesConfig of '{}'", self.display_name), raw)
    }
}

// ============================================================================
// SERIES CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Same,
    Individual,
}

/// Per-measure styling from `source.objects.seriesConfig`. Absent fields
/// take the `SeriesStyle` defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConfig {
    pub chart_type: Option<ChartType>,
    pub fill_color: Option<HostColor>,
    pub line_color: Option<HostColor>,
    pub line_width: Option<f64>,
    pub line_type: Option<LineType>,
    /// Percent.
    pub line_opacity: Option<f64>,
    pub scale_factor: Option<f64>,
    pub scale_factor_mode: Option<ScaleMode>,
    pub scale_factor_base: Option<f64>,
    pub scale_factor_drill: Option<f64>,
    pub value_axis: Option<ValueAxis>,
    pub width_percent: Option<f64>,
    pub show_symbol: Option<bool>,
    pub symbol_size: Option<f64>,
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|n| n.is_finite())
}

impl SeriesConfig {
    /// Resolves the config around the series' palette color.
    pub fn style(&self, resolved: Color) -> SeriesStyle {
        let mut style = SeriesStyle::with_fill(
            self.fill_color.as_ref().and_then(HostColor::color).unwrap_or(resolved),
        );
        style.line_color = self
            .line_color
            .as_ref()
            .and_then(HostColor::color)
            .unwrap_or(style.fill_color);
        style.chart_type = self.chart_type.unwrap_or_default();
        style.line_type = self.line_type.unwrap_or_default();
        style.value_axis = self.value_axis.unwrap_or_default();
        style.show_symbol = self.show_symbol.unwrap_or(false);
        if let Some(width) = finite(self.line_width) {
            style.line_width = width;
        }
        if let Some(opacity) = finite(self.line_opacity) {
            style.line_opacity = (opacity / 100.0).clamp(0.0, 1.0);
        }
        if let Some(size) = finite(self.symbol_size) {
            style.symbol_size = size;
        }
        style.width_percent = finite(self.width_percent).filter(|w| *w > 0.0);
        style.scale = match self.scale_factor_mode.unwrap_or_default() {
            ScaleMode::Same => ScaleFactor::Same(finite(self.scale_factor).unwrap_or(1.0)),
            ScaleMode::Individual => ScaleFactor::Individual {
                base: finite(self.scale_factor_base).unwrap_or(1.0),
                drill: finite(self.scale_factor_drill).unwrap_or(1.0),
            },
        };
        style
    }
}

// ============================================================================
// CELL COERCION
// ============================================================================

fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// One category cell. Date columns parse ISO strings into epoch millis.
pub fn category_cell(value: &Value, is_date: bool) -> CategoryValue {
    match value {
        Value::Null => CategoryValue::Empty,
        Value::Bool(b) => CategoryValue::Boolean(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if is_date => CategoryValue::Date(f as i64),
            Some(f) => CategoryValue::Number(f),
            None => CategoryValue::Empty,
        },
        Value::String(s) if is_date => match parse_date(s) {
            Some(ms) => CategoryValue::Date(ms),
            None => CategoryValue::Text(s.clone()),
        },
        Value::String(s) => CategoryValue::Text(s.clone()),
        other => CategoryValue::Text(other.to_string()),
    }
}

/// One measure cell. Anything that is not a finite number is missing.
pub fn measure_cell(value: &Value) -> Option<NumericPoint> {
    let point = match value {
        Value::Number(n) => NumericPoint::Plain(n.as_f64()?),
        Value::String(s) => NumericPoint::Plain(s.trim().parse::<f64>().ok()?),
        Value::Object(map) => NumericPoint::Wrapped {
            value: map.get("value")?.as_f64()?,
        },
        _ => return None,
    };
    let raw = match point {
        NumericPoint::Plain(v) | NumericPoint::Wrapped { value: v } => v,
    };
    raw.is_finite().then_some(point)
}

fn measure_column(column: &ValueColumn) -> MeasureColumn {
    let measure = MeasureColumn::new(column.values.iter().map(measure_cell).collect());
    match &column.highlights {
        Some(h) => measure.with_highlights(h.iter().map(measure_cell).collect()),
        None => measure,
    }
}

// ============================================================================
// INGESTION
// ============================================================================

/// What one data refresh yields besides the settings.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub cache: DrillCache,
    /// From the first display measure's sort state.
    pub sort: Option<SortDirection>,
}

/// Builds the drill cache for one data refresh.
pub fn ingest(view: &DataView, settings: &VisualSettings) -> DrillResult<Ingested> {
    let mut cache = DrillCache::new();

    for column in &view.categories {
        let values = column
            .values
            .iter()
            .map(|v| category_cell(v, column.is_date_time))
            .collect();
        cache.add_level(column.name.clone(), values)?;
    }

    // Field parameters can bind the same measure twice.
    let mut seen: HashSet<(Option<String>, String)> = HashSet::new();
    let display: Vec<&ValueColumn> = view
        .values
        .iter()
        .filter(|c| c.source.is_display())
        .filter(|c| {
            let key = (c.source.group_label(), c.source.display_name.clone());
            let fresh = seen.insert(key);
            if !fresh {
                log_debug!("DATA", "dropping duplicate measure '{}'", c.source.display_name);
            }
            fresh
        })
        .collect();

    let sort = display
        .first()
        .and_then(|c| c.source.sort)
        .and_then(SortDirection::from_host_code);

    if display.iter().any(|c| c.source.group_label().is_some()) {
        for series in grouped_series(&display, settings) {
            cache.add_series(series);
        }
    } else {
        for column in &display {
            let name = column.source.display_name.clone();
            cache.add_series(build_series(name, column, settings));
        }
    }

    if let Some(column) = view
        .values
        .iter()
        .find(|c| c.source.has_role(LABEL_VISIBILITY_ROLE))
    {
        cache.set_label_visibility(measure_column(column));
    }

    log_debug!(
        "DATA",
        "ingested {} rows, {} levels, {} series",
        cache.row_count(),
        cache.level_count(),
        cache.series().len()
    );
    Ok(Ingested { cache, sort })
}

fn build_series(name: String, column: &ValueColumn, settings: &VisualSettings) -> SeriesColumn {
    let style = column.source.series_config().style(settings.series_color(&name));
    let series = SeriesColumn::new(name, measure_column(column)).with_style(style);
    match &column.source.format {
        Some(format) => series.with_source_format(format.clone()),
        None => series,
    }
}

/// Series per (group, measure), groups in first-seen order.
fn grouped_series(display: &[&ValueColumn], settings: &VisualSettings) -> Vec<SeriesColumn> {
    let mut groups: Vec<(String, Vec<&ValueColumn>)> = Vec::new();
    for &column in display {
        let group = column.source.group_label().unwrap_or_default();
        match groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, members)) => members.push(column),
            None => groups.push((group, vec![column])),
        }
    }

    groups
        .into_iter()
        .flat_map(|(group, members)| {
            let single = members.len() == 1;
            members.into_iter().map(move |column| {
                let name = if single {
                    group.clone()
                } else {
                    format!("{} · {}", group, column.source.display_name)
                };
                build_series(name, column, settings)
            })
        })
        .collect()
}
