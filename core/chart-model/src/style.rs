//! FILENAME: core/chart-model/src/style.rs
//! PURPOSE: Resolved per-series display styling.
//! CONTEXT: Host style objects arrive sparse and loosely typed. The visual
//! layer resolves them into a `SeriesStyle` once per data refresh, so every
//! field here is concrete and carries its documented default.

use serde::{Deserialize, Serialize};

/// Fallback fill when neither the series config nor the host palette has a color.
pub const DEFAULT_SERIES_COLOR: Color = Color::new(0x33, 0x66, 0xcc);

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // Alpha channel (255 = opaque)
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Convert to CSS string: `#rrggbb` when opaque, `rgba()` otherwise.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }

    /// Parse from hex string ("#FF0000", "FF0000", "#F00" or "#FF000080").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Color::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::new(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::with_alpha(r, g, b, a))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        DEFAULT_SERIES_COLOR
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
}

/// Stroke pattern for line and area series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Which value axis a series is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueAxis {
    #[default]
    Primary,
    Secondary,
}

/// Per-series multiplier applied to aggregated values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleFactor {
    /// One multiplier reused at every depth.
    Same(f64),
    /// Distinct multipliers for the root view and for drilled views.
    Individual { base: f64, drill: f64 },
}

impl ScaleFactor {
    /// The multiplier in effect at the given drill depth.
    pub fn at_depth(&self, depth: usize) -> f64 {
        match *self {
            ScaleFactor::Same(f) => f,
            ScaleFactor::Individual { base, .. } if depth == 0 => base,
            ScaleFactor::Individual { drill, .. } => drill,
        }
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        ScaleFactor::Same(1.0)
    }
}

/// Complete display styling for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub chart_type: ChartType,
    pub fill_color: Color,
    /// Defaults to `fill_color`.
    pub line_color: Color,
    pub line_width: f64,
    pub line_type: LineType,
    /// Fraction in `[0, 1]`.
    pub line_opacity: f64,
    /// Bar thickness as a percentage of the band. None leaves it to the renderer.
    pub width_percent: Option<f64>,
    pub value_axis: ValueAxis,
    pub show_symbol: bool,
    pub symbol_size: f64,
    pub scale: ScaleFactor,
}

impl SeriesStyle {
    /// Default styling around a resolved fill color.
    pub fn with_fill(fill_color: Color) -> Self {
        SeriesStyle {
            chart_type: ChartType::Bar,
            fill_color,
            line_color: fill_color,
            line_width: 2.0,
            line_type: LineType::Solid,
            line_opacity: 1.0,
            width_percent: None,
            value_axis: ValueAxis::Primary,
            show_symbol: false,
            symbol_size: 3.0,
            scale: ScaleFactor::default(),
        }
    }

    pub fn is_secondary(&self) -> bool {
        self.value_axis == ValueAxis::Secondary
    }
}

impl Default for SeriesStyle {
    fn default() -> Self {
        SeriesStyle::with_fill(DEFAULT_SERIES_COLOR)
    }
}
