//! FILENAME: app/visual/src/lib.rs
// PURPOSE: Host-facing library for the drill-down bar chart visual.
// CONTEXT: The host hands over data views and formatting objects as JSON and
// forwards user events; the visual answers with chart options through a
// ChartRenderer.

pub mod api_types;
pub mod dataview;
pub mod legend;
pub mod logging;
pub mod render;
pub mod settings;
pub mod visual;

pub use api_types::{
    AxisTick, ChartOption, LabelOption, SeriesKind, SeriesOption, TitleOption, ValueAxes,
    ValueAxisOption, VisualState,
};
pub use dataview::{ingest, DataView, Ingested, SeriesConfig};
pub use legend::{LegendLayout, LegendOption, Orient};
pub use logging::{next_seq, write_log};
pub use render::{build_option, ChartRenderer};
pub use settings::VisualSettings;
pub use visual::{DrillVisual, VisualError, VisualResult};
