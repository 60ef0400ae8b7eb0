use serde::{Deserialize, Serialize};

use crate::core::{AxisFamily, PlotOrientation, Rect, RectangleEdge, ValueRange};

/// State of one registered axis at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub family: AxisFamily,
    pub index: usize,
    pub edge: RectangleEdge,
    /// Value range; absent for category axes.
    #[serde(default)]
    pub range: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    pub auto_range: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosshairSnapshot {
    pub visible: bool,
    pub value: f64,
    /// Column key the domain crosshair of a category plot sits on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Serializable view of a plot after its last draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSnapshot {
    pub orientation: PlotOrientation,
    #[serde(default)]
    pub data_area: Option<Rect>,
    pub axes: Vec<AxisSnapshot>,
    pub dataset_count: usize,
    pub domain_crosshair: CrosshairSnapshot,
    pub range_crosshair: CrosshairSnapshot,
}

impl PlotSnapshot {
    #[must_use]
    pub fn axis(&self, family: AxisFamily, index: usize) -> Option<&AxisSnapshot> {
        self.axes
            .iter()
            .find(|axis| axis.family == family && axis.index == index)
    }
}
