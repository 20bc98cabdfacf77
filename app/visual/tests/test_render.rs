//! FILENAME: tests/test_render.rs
//! Integration tests for the chart option handed to the renderer.

mod common;

use common::{SalesFixture, TestHarness};
use serde_json::{json, Value};
use visual_lib::{SeriesKind, ValueAxes};

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

// ============================================================================
// OUTPUT SHAPE
// ============================================================================

#[test]
fn test_output_contract_fields() {
    let harness = TestHarness::with_sample_data();
    let json = serde_json::to_value(harness.last_option()).unwrap();

    for key in [
        "title",
        "categories",
        "legendNames",
        "series",
        "legend",
        "xAxis",
        "yAxis",
        "gridBottom",
        "animationDuration",
        "animationEasing",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["animationDuration"], 800);
    assert_eq!(json["animationEasing"], "cubicInOut");
    assert!(json["yAxis"].is_object());
}

#[test]
fn test_secondary_axis_at_every_depth() {
    let mut harness = TestHarness::with_fixture(SalesFixture::new().with_margin());
    let root = serde_json::to_value(harness.last_option()).unwrap();
    assert!(matches!(harness.last_option().y_axis, ValueAxes::Dual(_)));

    let margin = &harness.last_option().series[1];
    assert_eq!(margin.kind, SeriesKind::Line);
    assert_eq!(margin.y_axis_index, Some(1));
    assert_eq!(margin.item_style.color, "#cc0000");

    harness.click("West");
    let drilled = serde_json::to_value(harness.last_option()).unwrap();
    assert!(drilled["yAxis"].is_array());
    assert_eq!(drilled["yAxis"].as_array().map(|a| a.len()), Some(2));

    assert_eq!(keys(&root), keys(&drilled));
    assert_eq!(keys(&root["series"][1]), keys(&drilled["series"][1]));
}

#[test]
fn test_secondary_axis_scale_is_independent() {
    let harness = TestHarness::with_fixture(SalesFixture::new().with_margin());
    let option = harness.last_option();

    // Margin is 0.5 per row and West has four rows.
    assert_eq!(option.y_axis.primary().max, Some(35.0));
    let secondary = option.y_axis.secondary().unwrap();
    assert_eq!(secondary.max, Some(2.0));
    assert!(!secondary.split_line.show);
}

// ============================================================================
// DATA LABELS
// ============================================================================

#[test]
fn test_label_visibility_gates_labels() {
    let mut harness = TestHarness::with_fixture(SalesFixture::new().with_label_visibility());
    let labels = &harness.last_option().series[0].formatted_labels;
    assert_eq!(labels[1], "");
    assert!(!labels[0].is_empty());
    assert!(!labels[2].is_empty());

    harness.click("East");
    let labels = &harness.last_option().series[0].formatted_labels;
    assert!(labels.iter().all(|l| l.is_empty()));
}

#[test]
fn test_labels_follow_source_format() {
    let harness = TestHarness::with_fixture(SalesFixture::new().with_sales_format("$#,0"));
    assert_eq!(
        harness.last_option().series[0].formatted_labels,
        vec!["$35", "$14", "$9"]
    );
}

#[test]
fn test_label_style_from_settings() {
    let fixture = SalesFixture::new().with_objects(json!({
        "dataLabels": {
            "position": "insideBase",
            "fontStyle": "bold",
            "transparency": 50,
            "color": { "solid": { "color": "#123456" } }
        }
    }));
    let harness = TestHarness::with_fixture(fixture);
    let label = &harness.last_option().series[0].label;
    assert_eq!(label.position, "insideLeft");
    assert_eq!(label.font_weight, "bold");
    assert_eq!(label.font_style, "normal");
    assert_eq!(label.color, "#123456");
    assert!((label.opacity - 0.5).abs() < 1e-9);
}

// ============================================================================
// LEGEND AND COLORS
// ============================================================================

#[test]
fn test_legend_identical_after_back() {
    let fixture = SalesFixture::new().with_objects(json!({
        "legend": { "position": "bottom", "alignment": "right", "extraMargin": 2 }
    }));
    let mut harness = TestHarness::with_fixture(fixture);
    let root_legend = harness.last_option().legend.clone();
    assert_eq!(root_legend.bottom.as_deref(), Some("7%"));
    assert_eq!(harness.last_option().grid_bottom, "12%");

    harness.click("West");
    assert_eq!(harness.last_option().legend, root_legend);
    harness.back();
    assert_eq!(harness.last_option().legend, root_legend);
}

#[test]
fn test_user_series_color() {
    let fixture = SalesFixture::new().with_objects(json!({
        "dataPoint": { "Sales": { "solid": { "color": "#00aa00" } } }
    }));
    let harness = TestHarness::with_fixture(fixture);
    assert_eq!(harness.last_option().series[0].item_style.color, "#00aa00");
}

#[test]
fn test_default_series_color() {
    let harness = TestHarness::with_sample_data();
    assert_eq!(harness.last_option().series[0].item_style.color, "#3366cc");
}

// ============================================================================
// SCALE FACTOR
// ============================================================================

#[test]
fn test_individual_scale_factor_by_depth() {
    let mut harness = TestHarness::new();
    harness.load(
        &json!({
            "categories": [
                { "name": "Region", "values": ["West", "West", "East"] },
                { "name": "Month", "values": ["Jan", "Feb", "Jan"] }
            ],
            "values": [{
                "source": {
                    "displayName": "Sales",
                    "roles": { "series1": true },
                    "objects": { "seriesConfig": {
                        "scaleFactorMode": "individual",
                        "scaleFactorBase": 2,
                        "scaleFactorDrill": 10
                    } }
                },
                "values": [1, 2, 4]
            }]
        })
        .to_string(),
    );

    assert_eq!(harness.series_data("Sales"), vec![6.0, 8.0]);
    harness.click("West");
    assert_eq!(harness.series_data("Sales"), vec![10.0, 20.0]);
    harness.back();
    assert_eq!(harness.series_data("Sales"), vec![6.0, 8.0]);
}
