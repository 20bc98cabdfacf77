//! FILENAME: app/visual/src/legend.rs
// PURPOSE: Legend placement and the grid margin that depends on it.
// CONTEXT: Used for the root view and for every drill depth alike, so a back
// navigation always lands on the same legend.

use chart_model::number_to_string;
use serde::Serialize;

use crate::settings::{LegendAlignment, LegendIcon, LegendPosition, LegendSettings};

const EDGE_OFFSET: f64 = 5.0;
const SIDE_OFFSET: f64 = 2.0;
const GRID_BOTTOM_PLAIN: f64 = 3.0;
const GRID_BOTTOM_WITH_LEGEND: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orient {
    Horizontal,
    Vertical,
}

/// The legend block of the chart option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendOption {
    pub show: bool,
    pub orient: Orient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    /// `[top, right, bottom, left]`
    pub padding: [f64; 4],
    pub item_width: f64,
    pub item_height: f64,
    pub font_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub legend: LegendOption,
    pub grid_bottom: String,
}

fn percent(value: f64) -> String {
    format!("{}%", number_to_string(value))
}

impl LegendIcon {
    pub fn symbol(&self) -> &'static str {
        match self {
            LegendIcon::Circle => "circle",
            LegendIcon::Rect => "rect",
            LegendIcon::RoundRect => "roundRect",
            LegendIcon::Triangle => "triangle",
            LegendIcon::Diamond => "diamond",
            LegendIcon::Pin => "pin",
            LegendIcon::Arrow => "arrow",
        }
    }
}

/// Computes the legend option and the grid's bottom margin.
pub fn layout(settings: &LegendSettings) -> LegendLayout {
    let extra = if settings.extra_margin.is_finite() {
        settings.extra_margin
    } else {
        0.0
    };
    let side = |v: Option<f64>| v.filter(|p| p.is_finite()).unwrap_or(settings.padding);

    let mut legend = LegendOption {
        show: settings.show,
        orient: Orient::Horizontal,
        top: None,
        bottom: None,
        left: None,
        right: None,
        padding: [
            side(settings.padding_top),
            side(settings.padding_right),
            side(settings.padding_bottom),
            side(settings.padding_left),
        ],
        item_width: settings.marker_size,
        item_height: settings.marker_size,
        font_size: settings.font_size,
        icon: settings.icon_shape.map(|i| i.symbol()),
    };

    match settings.position {
        LegendPosition::Top | LegendPosition::Bottom => {
            let offset = Some(percent(EDGE_OFFSET + extra));
            if settings.position == LegendPosition::Top {
                legend.top = offset;
            } else {
                legend.bottom = offset;
            }
            match settings.alignment {
                LegendAlignment::Left => legend.left = Some(percent(SIDE_OFFSET)),
                LegendAlignment::Right => legend.right = Some(percent(SIDE_OFFSET)),
                LegendAlignment::Center => legend.left = Some("center".to_string()),
            }
        }
        LegendPosition::Left => {
            legend.orient = Orient::Vertical;
            legend.left = Some(percent(SIDE_OFFSET));
            legend.top = Some(percent(EDGE_OFFSET));
        }
        LegendPosition::Right => {
            legend.orient = Orient::Vertical;
            legend.right = Some(percent(SIDE_OFFSET));
            legend.top = Some(percent(EDGE_OFFSET));
        }
    }

    let grid_bottom = if settings.show && settings.position == LegendPosition::Bottom {
        percent(GRID_BOTTOM_WITH_LEGEND + extra)
    } else {
        percent(GRID_BOTTOM_PLAIN)
    };

    LegendLayout { legend, grid_bottom }
}
