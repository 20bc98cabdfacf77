//! FILENAME: core/drill-engine/src/axis.rs
//! Axis Scale - Value-axis bounds, splits and tick formatting for one level.

use chart_model::{ValueAxis, ValueFormatter};

use crate::aggregate::Series;
use crate::definition::AxisOptions;

/// Share of the range placed below a negative minimum.
const NEGATIVE_PADDING: f64 = 0.1;

/// Computed value-axis configuration. Every field is None when the axis has
/// no finite values; the renderer then auto-scales.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisScale {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Requested split count. Advisory unless `interval` is also set.
    pub split_count: Option<u32>,
    /// Fixed tick spacing, present only with a user split count and a
    /// non-zero range.
    pub interval: Option<f64>,
    pub formatter: Option<ValueFormatter>,
}

impl AxisScale {
    pub fn is_auto(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Formats a tick value, or None when the axis is auto-scaled.
    pub fn format_tick(&self, value: f64) -> Option<String> {
        self.formatter.as_ref().map(|f| f.format(value))
    }
}

/// Computes the scale for the series plotted on `axis`.
pub fn compute_scale(series: &[Series], axis: ValueAxis, options: &AxisOptions) -> AxisScale {
    let on_axis: Vec<&Series> = series
        .iter()
        .filter(|s| s.style.value_axis == axis)
        .collect();

    let mut min_value = f64::INFINITY;
    let mut max_value = f64::NEG_INFINITY;
    for v in on_axis.iter().flat_map(|s| s.data.iter()).copied() {
        if v.is_finite() {
            min_value = min_value.min(v);
            max_value = max_value.max(v);
        }
    }
    if !min_value.is_finite() || !max_value.is_finite() {
        return AxisScale::default();
    }

    let range = max_value - min_value;
    let tolerance = if options.tolerance.is_finite() {
        options.tolerance.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let max = max_value + range * tolerance * 0.5;
    let min = if min_value >= 0.0 {
        0.0
    } else {
        min_value - range * NEGATIVE_PADDING
    };

    let split_count = (options.split_count > 0).then_some(options.split_count);
    let interval = match split_count {
        Some(splits) if range > 0.0 => Some((max - min) / splits as f64),
        _ => None,
    };

    let mut format = options.format.clone();
    if format.source_format.is_none() {
        format.source_format = on_axis.iter().find_map(|s| s.source_format.clone());
    }
    let reference = min_value.abs().max(max_value.abs());

    AxisScale {
        min: Some(min),
        max: Some(max),
        split_count,
        interval,
        formatter: Some(ValueFormatter::new(format, reference)),
    }
}
