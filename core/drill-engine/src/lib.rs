//! FILENAME: core/drill-engine/src/lib.rs
//! Drill-down subsystem for hierarchical bar charts.
//!
//! This crate turns a column-oriented row set into one chart view per
//! navigation state. It depends on `chart-model` only for shared types
//! (CategoryValue, SeriesStyle, ValueFormatter).
//!
//! Layers:
//! - `definition`: Serializable configuration (limit, sort, axis preferences)
//! - `cache`: Internal representation of one data refresh (HOW we store)
//! - `aggregate` / `ordering` / `axis`: One level's computation (HOW we calculate)
//! - `snapshot`: The cached root level
//! - `view`: Prepared output for the render layer (WHAT we display)
//! - `navigator`: Drill path state machine (WHERE we are)

pub mod aggregate;
pub mod axis;
pub mod cache;
pub mod definition;
pub mod error;
pub mod navigator;
pub mod ordering;
pub mod snapshot;
pub mod view;

pub use aggregate::{
    aggregate, any_drillable, apply_scale, can_drill_further, distinct_count, LevelResult, Series,
};
pub use axis::{compute_scale, AxisScale};
pub use cache::*;
pub use definition::*;
pub use error::{DrillError, DrillResult};
pub use navigator::DrillNavigator;
pub use ordering::CategoryOrdering;
pub use snapshot::RootSnapshot;
pub use view::*;
