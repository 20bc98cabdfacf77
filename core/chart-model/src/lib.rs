//! FILENAME: core/chart-model/src/lib.rs
//! PURPOSE: Shared value types for the drill chart.
//! CONTEXT: Re-exports public types and modules for use by the drill engine
//! and the host visual.

pub mod category;
pub mod style;
pub mod value_format;

// Re-export commonly used types at the crate root
pub use category::{
    category_key_equals, number_to_string, point_value, CategoryKey, CategoryValue, NumericPoint,
    OrderedFloat,
};
pub use style::{
    ChartType, Color, LineType, ScaleFactor, SeriesStyle, ValueAxis, DEFAULT_SERIES_COLOR,
};
pub use value_format::{
    Decimals, DisplayUnits, FormatError, FormatOptions, ValueFormatter, ValueType, MAX_DECIMALS,
};
