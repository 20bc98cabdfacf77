//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for drill visual integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use visual_lib::{ChartOption, ChartRenderer, DrillVisual};

/// Renderer that keeps every option it was handed.
#[derive(Default)]
pub struct RecordingRenderer {
    pub options: Vec<ChartOption>,
    pub replace_flags: Vec<bool>,
    pub empty_count: usize,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, option: &ChartOption, replace: bool) {
        self.options.push(option.clone());
        self.replace_flags.push(replace);
    }

    fn render_empty(&mut self) {
        self.empty_count += 1;
    }
}

/// Region > Month > Product sales rows.
///
/// Totals: West 35 (Jan 15, Feb 20), East 14 (Jan 6, Feb 8), North 9.
/// North only has March rows, so it cannot be drilled.
pub struct SalesFixture {
    pub rows: Vec<(&'static str, &'static str, &'static str, f64)>,
    pub sort: Option<i64>,
    pub objects: Value,
    pub with_margin: bool,
    pub with_label_visibility: bool,
    pub sales_format: Option<&'static str>,
}

impl SalesFixture {
    pub fn new() -> Self {
        SalesFixture {
            rows: vec![
                ("West", "Jan", "Widget", 10.0),
                ("West", "Jan", "Gadget", 5.0),
                ("West", "Feb", "Widget", 12.0),
                ("West", "Feb", "Gadget", 8.0),
                ("East", "Jan", "Widget", 6.0),
                ("East", "Feb", "Gadget", 8.0),
                ("North", "Mar", "Widget", 4.0),
                ("North", "Mar", "Gadget", 5.0),
            ],
            sort: None,
            objects: Value::Null,
            with_margin: false,
            with_label_visibility: false,
            sales_format: None,
        }
    }

    pub fn sorted(mut self, code: i64) -> Self {
        self.sort = Some(code);
        self
    }

    pub fn with_objects(mut self, objects: Value) -> Self {
        self.objects = objects;
        self
    }

    /// Adds a "Margin" line series on the secondary axis.
    pub fn with_margin(mut self) -> Self {
        self.with_margin = true;
        self
    }

    /// Adds a label-visibility column that hides East's labels.
    pub fn with_label_visibility(mut self) -> Self {
        self.with_label_visibility = true;
        self
    }

    pub fn with_sales_format(mut self, format: &'static str) -> Self {
        self.sales_format = Some(format);
        self
    }

    fn column(&self, pick: impl Fn(&(&str, &str, &str, f64)) -> Value) -> Vec<Value> {
        self.rows.iter().map(|r| pick(r)).collect()
    }

    pub fn to_json(&self) -> String {
        let mut sales_source = json!({
            "displayName": "Sales",
            "roles": { "series1": true }
        });
        if let Some(code) = self.sort {
            sales_source["sort"] = json!(code);
        }
        if let Some(format) = self.sales_format {
            sales_source["format"] = json!(format);
        }

        let mut values = vec![json!({
            "source": sales_source,
            "values": self.column(|r| json!(r.3)),
        })];

        if self.with_margin {
            values.push(json!({
                "source": {
                    "displayName": "Margin",
                    "roles": { "series2": true },
                    "objects": { "seriesConfig": {
                        "chartType": "line",
                        "valueAxis": "secondary",
                        "lineColor": { "solid": { "color": "#cc0000" } }
                    } }
                },
                "values": self.column(|_| json!(0.5)),
            }));
        }

        if self.with_label_visibility {
            values.push(json!({
                "source": { "displayName": "ShowLabel", "roles": { "labelVisibility": true } },
                "values": self.column(|r| json!(if r.0 == "East" { 0 } else { 1 })),
            }));
        }

        json!({
            "categories": [
                { "name": "Region", "values": self.column(|r| json!(r.0)) },
                { "name": "Month", "values": self.column(|r| json!(r.1)) },
                { "name": "Product", "values": self.column(|r| json!(r.2)) }
            ],
            "values": values,
            "objects": self.objects,
        })
        .to_string()
    }
}

/// Test harness around one visual instance.
pub struct TestHarness {
    pub visual: DrillVisual<RecordingRenderer>,
}

impl TestHarness {
    /// Create a new test harness with no data loaded.
    pub fn new() -> Self {
        TestHarness {
            visual: DrillVisual::new(RecordingRenderer::default()),
        }
    }

    /// Create a harness loaded with the default sales fixture.
    pub fn with_sample_data() -> Self {
        Self::with_fixture(SalesFixture::new())
    }

    pub fn with_fixture(fixture: SalesFixture) -> Self {
        let mut harness = Self::new();
        harness.load(&fixture.to_json());
        harness
    }

    /// Runs a data refresh and waits for the redraw.
    pub fn load(&mut self, data_view: &str) {
        self.visual.update(data_view).unwrap();
        self.visual.render_complete();
    }

    /// Clicks the category with the given label and waits for the redraw.
    pub fn click(&mut self, label: &str) {
        let index = self
            .categories()
            .iter()
            .position(|c| c == label)
            .unwrap_or_else(|| panic!("no category '{}' in {:?}", label, self.categories()));
        self.visual.click(index).unwrap();
        self.visual.render_complete();
    }

    pub fn back(&mut self) {
        self.visual.back().unwrap();
        self.visual.render_complete();
    }

    pub fn reset(&mut self) {
        self.visual.reset().unwrap();
        self.visual.render_complete();
    }

    pub fn render_count(&self) -> usize {
        self.visual.renderer().options.len()
    }

    pub fn last_option(&self) -> &ChartOption {
        self.visual
            .renderer()
            .options
            .last()
            .expect("nothing rendered yet")
    }

    pub fn categories(&self) -> Vec<String> {
        self.last_option().categories.clone()
    }

    pub fn series_data(&self, name: &str) -> Vec<f64> {
        self.last_option()
            .series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.data.clone())
            .unwrap_or_else(|| panic!("no series '{}'", name))
    }

    pub fn depth(&self) -> usize {
        self.visual.navigator().depth()
    }
}
