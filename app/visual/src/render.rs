//! FILENAME: app/visual/src/render.rs
// PURPOSE: Turns a LevelView plus settings into a ChartOption.
// CONTEXT: The same builder serves the root and every drill depth, so the
// option shape never changes between levels. Output is always delivered as a
// full replace.

use chart_model::{number_to_string, ChartType, Color, ValueFormatter};
use drill_engine::{AxisScale, LevelView, SelectionState, Series};

use crate::api_types::{
    AreaStyle, AxisLabelOption, AxisTick, CategoryAxisOption, ChartOption, ItemStyle, LabelOption,
    LineStyle, SeriesKind, SeriesOption, TitleOption, Toggle, ValueAxes, ValueAxisOption,
    ANIMATION_DURATION_MS, ANIMATION_EASING,
};
use crate::legend;
use crate::log_warn;
use crate::settings::{DataLabelSettings, FontStyle, ValueAxisSettings, VisualSettings};

const LINE_SMOOTHING: f64 = 0.4;
const DEFAULT_TICK_SPLITS: u32 = 5;
const MAX_TICKS: usize = 50;

// ============================================================================
// RENDERER SEAM
// ============================================================================

/// The chart widget. Implementations draw `option`, dropping all previous
/// state when `replace` is set.
pub trait ChartRenderer {
    fn render(&mut self, option: &ChartOption, replace: bool);

    /// Called instead of `render` when the view has nothing to plot.
    fn render_empty(&mut self);
}

// ============================================================================
// OPTION BUILDER
// ============================================================================

/// Builds the complete option for one view.
pub fn build_option(
    view: &LevelView,
    settings: &VisualSettings,
    selection: SelectionState,
) -> ChartOption {
    let level = &view.level;
    let labels = &settings.data_labels;
    let reference = level
        .series
        .iter()
        .flat_map(|s| s.data.iter())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let series: Vec<SeriesOption> = level
        .series
        .iter()
        .map(|s| {
            let formatted = format_labels(s, level.label_visibility.as_deref(), labels, reference);
            series_option(s, formatted, labels)
        })
        .collect();

    let primary = value_axis(&view.primary_axis, &settings.y_axis, settings.y_axis.show_grid_lines);
    let y_axis = match &view.secondary_axis {
        Some(secondary) => ValueAxes::Dual([primary, value_axis(secondary, &settings.y_axis, false)]),
        None => ValueAxes::Single(primary),
    };

    let layout = legend::layout(&settings.legend);

    ChartOption {
        title: title(view, settings.drill_header.show),
        categories: level.categories.iter().map(|c| c.label()).collect(),
        legend_names: level.series.iter().map(|s| s.name.clone()).collect(),
        series,
        legend: layout.legend,
        x_axis: category_axis(settings),
        y_axis,
        grid_bottom: layout.grid_bottom,
        animation_duration: ANIMATION_DURATION_MS,
        animation_easing: ANIMATION_EASING,
        selected_index: selection.selected.filter(|&i| i < level.len()),
    }
}

fn title(view: &LevelView, show_header: bool) -> TitleOption {
    match view.drilled_label() {
        Some(label) if show_header => TitleOption {
            show: true,
            text: format!("Details for {}", label),
            top: "2%".to_string(),
        },
        _ => TitleOption {
            show: false,
            text: String::new(),
            top: "2%".to_string(),
        },
    }
}

// ============================================================================
// SERIES
// ============================================================================

/// One label string per point. Hidden labels are empty strings.
pub fn format_labels(
    series: &Series,
    visibility: Option<&[f64]>,
    settings: &DataLabelSettings,
    reference: f64,
) -> Vec<String> {
    let formatter = ValueFormatter::new(
        settings.format_options(series.source_format.as_deref()),
        reference,
    );

    series
        .data
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let gated = visibility.map_or(false, |vis| vis.get(i).copied().unwrap_or(0.0) <= 0.0);
            if gated {
                String::new()
            } else if !v.is_finite() || (v == 0.0 && settings.treat_zero_as_blank) {
                settings.show_blank_as.clone()
            } else {
                formatter.format(v)
            }
        })
        .collect()
}

fn series_option(series: &Series, formatted: Vec<String>, labels: &DataLabelSettings) -> SeriesOption {
    let style = &series.style;
    let is_line = style.chart_type != ChartType::Bar;

    let color = if is_line {
        style.line_color
    } else {
        style.fill_color
    };

    SeriesOption {
        name: series.name.clone(),
        kind: if is_line { SeriesKind::Line } else { SeriesKind::Bar },
        data: series.data.clone(),
        item_style: ItemStyle {
            color: color.to_css(),
        },
        bar_width: if is_line {
            None
        } else {
            style.width_percent.map(|w| format!("{}%", number_to_string(w)))
        },
        line_style: is_line.then(|| LineStyle {
            color: style.line_color.to_css(),
            width: style.line_width,
            kind: style.line_type,
            opacity: style.line_opacity,
        }),
        area_style: (style.chart_type == ChartType::Area).then(AreaStyle::default),
        smooth: is_line.then_some(LINE_SMOOTHING),
        show_symbol: is_line.then_some(style.show_symbol),
        symbol_size: is_line.then_some(style.symbol_size),
        y_axis_index: style.is_secondary().then_some(1),
        label: LabelOption {
            show: labels.show,
            position: labels.position.chart_position(),
            distance: labels.distance,
            color: labels.color.to_css(),
            font_family: labels.font_family.clone(),
            font_size: labels.font_size,
            font_style: labels.font_style.style(),
            font_weight: labels.font_style.weight(),
            opacity: labels.opacity(),
        },
        formatted_labels: formatted,
    }
}

// ============================================================================
// AXES
// ============================================================================

fn axis_label(
    show: bool,
    color: Color,
    size: f64,
    family: &str,
    style: FontStyle,
    rotate: Option<f64>,
) -> AxisLabelOption {
    AxisLabelOption {
        show,
        color: color.to_css(),
        font_size: size,
        font_family: family.to_string(),
        font_style: style.style(),
        font_weight: style.weight(),
        rotate,
    }
}

fn category_axis(settings: &VisualSettings) -> CategoryAxisOption {
    let x = &settings.x_axis;
    let rotate = (x.rotate_labels.is_finite() && x.rotate_labels != 0.0).then_some(x.rotate_labels);
    CategoryAxisOption {
        axis_line: Toggle {
            show: x.show_axis_line,
        },
        axis_label: axis_label(
            x.show_labels,
            x.label_color,
            x.label_size,
            &x.font_family,
            x.font_style,
            rotate,
        ),
        split_line: Toggle {
            show: x.show_grid_lines,
        },
    }
}

fn value_axis(scale: &AxisScale, settings: &ValueAxisSettings, grid_lines: bool) -> ValueAxisOption {
    ValueAxisOption {
        axis_label: axis_label(
            settings.show_labels,
            settings.label_color,
            settings.label_size,
            &settings.font_family,
            settings.font_style,
            None,
        ),
        split_line: Toggle { show: grid_lines },
        min: scale.min,
        max: scale.max,
        split_number: scale.split_count,
        interval: scale.interval,
        ticks: ticks(scale),
    }
}

/// Tick values and labels for a bounded axis. Auto-scaled axes get none.
pub fn ticks(scale: &AxisScale) -> Vec<AxisTick> {
    let (min, max) = match (scale.min, scale.max) {
        (Some(min), Some(max)) if max >= min => (min, max),
        _ => return Vec::new(),
    };

    let splits = scale.split_count.filter(|&n| n > 0).unwrap_or(DEFAULT_TICK_SPLITS);
    let step = scale
        .interval
        .unwrap_or((max - min) / splits as f64);

    let label = |v: f64| {
        scale
            .format_tick(v)
            .unwrap_or_else(|| number_to_string(v))
    };

    if !(step.is_finite() && step > 0.0) {
        return vec![AxisTick { value: min, label: label(min) }];
    }

    let epsilon = step * 1e-9;
    let wanted = ((max - min + epsilon) / step).floor() + 1.0;
    if wanted > MAX_TICKS as f64 {
        log_warn!("RENDER", "axis tick count clamped {} -> {}", wanted, MAX_TICKS);
    }
    (0..MAX_TICKS)
        .map(|i| min + step * i as f64)
        .take_while(|v| *v <= max + epsilon)
        .map(|v| AxisTick { value: v, label: label(v) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_model::{CategoryValue, SeriesStyle, ValueAxis};
    use drill_engine::{build_view, DrillDefinition, DrillPath, LevelResult};

    fn series(name: &str, data: Vec<f64>, style: SeriesStyle) -> Series {
        Series {
            name: name.to_string(),
            data,
            style,
            source_format: None,
        }
    }

    fn view(level: LevelResult, path: DrillPath) -> LevelView {
        build_view(level, &DrillDefinition::default(), path, true)
    }

    fn root_level() -> LevelResult {
        LevelResult::new(
            vec![CategoryValue::text("West"), CategoryValue::text("East")],
            vec![series("Sales", vec![1500.0, 250.0], SeriesStyle::default())],
        )
    }

    #[test]
    fn test_root_has_hidden_title() {
        let option = build_option(
            &view(root_level(), DrillPath::new()),
            &VisualSettings::default(),
            SelectionState::default(),
        );
        assert!(!option.title.show);
        assert_eq!(option.categories, vec!["West", "East"]);
        assert_eq!(option.legend_names, vec!["Sales"]);
        assert_eq!(option.animation_duration, 800);
        assert_eq!(option.animation_easing, "cubicInOut");
        assert!(matches!(option.y_axis, ValueAxes::Single(_)));
        assert_eq!(option.series[0].kind, SeriesKind::Bar);
    }

    #[test]
    fn test_drilled_title() {
        let mut path = DrillPath::new();
        path.push(CategoryValue::text("West"));
        let v = view(root_level(), path);

        let option = build_option(&v, &VisualSettings::default(), SelectionState::default());
        assert!(option.title.show);
        assert_eq!(option.title.text, "Details for West");

        let mut settings = VisualSettings::default();
        settings.drill_header.show = false;
        let option = build_option(&v, &settings, SelectionState::default());
        assert!(!option.title.show);
    }

    #[test]
    fn test_labels_use_view_reference() {
        let option = build_option(
            &view(root_level(), DrillPath::new()),
            &VisualSettings::default(),
            SelectionState::default(),
        );
        // Largest value is 1500, so both labels are in thousands.
        assert_eq!(option.series[0].formatted_labels, vec!["1.5K", "0.25K"]);
    }

    #[test]
    fn test_label_gating_and_blanks() {
        let settings = DataLabelSettings {
            show_blank_as: "n/a".to_string(),
            treat_zero_as_blank: true,
            display_units: chart_model::DisplayUnits::None,
            decimals: chart_model::Decimals::Fixed(0),
            ..DataLabelSettings::default()
        };
        let s = series("Sales", vec![5.0, 0.0, 7.0], SeriesStyle::default());
        let labels = format_labels(&s, Some(&[1.0, 1.0, 0.0]), &settings, 7.0);
        assert_eq!(labels, vec!["5", "n/a", ""]);
    }

    #[test]
    fn test_secondary_axis_shape() {
        let mut secondary = SeriesStyle::default();
        secondary.value_axis = ValueAxis::Secondary;
        secondary.chart_type = ChartType::Area;
        let level = LevelResult::new(
            vec![CategoryValue::text("West")],
            vec![
                series("Sales", vec![10.0], SeriesStyle::default()),
                series("Margin", vec![0.4], secondary),
            ],
        );

        let option = build_option(
            &view(level, DrillPath::new()),
            &VisualSettings::default(),
            SelectionState::default(),
        );
        let secondary_axis = option.y_axis.secondary().unwrap();
        assert!(!secondary_axis.split_line.show);
        assert!(option.y_axis.primary().split_line.show);

        let area = &option.series[1];
        assert_eq!(area.kind, SeriesKind::Line);
        assert_eq!(area.area_style, Some(AreaStyle {}));
        assert_eq!(area.y_axis_index, Some(1));
        assert_eq!(area.smooth, Some(0.4));

        let json = serde_json::to_value(&option).unwrap();
        assert!(json["yAxis"].is_array());
        assert_eq!(json["series"][1]["type"], "line");
        assert_eq!(json["series"][1]["areaStyle"], serde_json::json!({}));
        assert!(json["series"][0].get("yAxisIndex").is_none());
    }

    #[test]
    fn test_bar_width_and_selection() {
        let mut style = SeriesStyle::default();
        style.width_percent = Some(60.0);
        let level = LevelResult::new(
            vec![CategoryValue::text("West")],
            vec![series("Sales", vec![10.0], style)],
        );
        let option = build_option(
            &view(level, DrillPath::new()),
            &VisualSettings::default(),
            SelectionState {
                selected: Some(3),
                hover: None,
            },
        );
        assert_eq!(option.series[0].bar_width.as_deref(), Some("60%"));
        assert_eq!(option.series[0].line_style, None);
        assert_eq!(option.selected_index, None);
    }

    #[test]
    fn test_ticks_follow_interval() {
        let scale = AxisScale {
            min: Some(0.0),
            max: Some(20.0),
            split_count: Some(4),
            interval: Some(5.0),
            formatter: None,
        };
        let values: Vec<f64> = ticks(&scale).iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        assert!(ticks(&AxisScale::default()).is_empty());
    }

    #[test]
    fn test_ticks_clamped_with_warning() {
        let scale = AxisScale {
            min: Some(0.0),
            max: Some(1000.0),
            split_count: Some(200),
            interval: None,
            formatter: None,
        };
        let generated = ticks(&scale);
        assert_eq!(generated.len(), MAX_TICKS);
        assert_eq!(generated.last().map(|t| t.value), Some(245.0));
        assert!(crate::logging::lines()
            .iter()
            .any(|l| l.contains("|W|RENDER|axis tick count clamped 201 -> 50")));
    }
}
