use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Point, Rect, RectangleEdge, ValueAxis};
use crate::error::{PlotError, PlotResult};

/// Stages of one plot draw, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrawPhase {
    Sizing,
    Background,
    Axes,
    Gridlines,
    BackgroundMarkers,
    BackgroundAnnotations,
    Items,
    ForegroundAnnotations,
    Crosshairs,
    NoDataMessage,
    ForegroundMarkers,
    ShadowComposite,
    Outline,
}

/// What the last draw of a plot produced.
///
/// Kept by the plot so clicks and anchored zooms can be mapped back through
/// the same data area the user saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRenderingInfo {
    pub plot_area: Rect,
    pub data_area: Rect,
    phases: Vec<DrawPhase>,
    items_drawn: BTreeMap<usize, usize>,
    found_data: bool,
}

impl PlotRenderingInfo {
    #[must_use]
    pub fn new(plot_area: Rect, data_area: Rect) -> Self {
        Self {
            plot_area,
            data_area,
            phases: vec![DrawPhase::Sizing],
            items_drawn: BTreeMap::new(),
            found_data: false,
        }
    }

    pub fn enter(&mut self, phase: DrawPhase) {
        trace!(?phase, "plot draw phase");
        self.phases.push(phase);
    }

    /// Phases in the order they ran.
    #[must_use]
    pub fn phases(&self) -> &[DrawPhase] {
        &self.phases
    }

    #[must_use]
    pub fn ran(&self, phase: DrawPhase) -> bool {
        self.phases.contains(&phase)
    }

    pub(crate) fn record_items(&mut self, dataset_index: usize, count: usize) {
        *self.items_drawn.entry(dataset_index).or_default() += count;
    }

    /// Number of `draw_item` calls made for `dataset_index`, across passes.
    #[must_use]
    pub fn items_drawn(&self, dataset_index: usize) -> usize {
        self.items_drawn.get(&dataset_index).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_items_drawn(&self) -> usize {
        self.items_drawn.values().sum()
    }

    /// Whether any dataset had something to draw.
    #[must_use]
    pub fn found_data(&self) -> bool {
        self.found_data
    }

    pub(crate) fn set_found_data(&mut self, found: bool) {
        self.found_data = found;
    }
}

pub fn validate_zoom_factor(factor: f64) -> PlotResult<f64> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(PlotError::InvalidArgument(format!(
            "zoom factor must be finite and >= 0, got {factor}"
        )));
    }
    Ok(factor)
}

pub fn validate_zoom_window(lower: f64, upper: f64) -> PlotResult<(f64, f64)> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(PlotError::InvalidArgument(format!(
            "zoom window must be finite with lower < upper, got [{lower}, {upper}]"
        )));
    }
    Ok((lower, upper))
}

pub fn validate_pan_percent(percent: f64) -> PlotResult<f64> {
    if !percent.is_finite() {
        return Err(PlotError::InvalidArgument(
            "pan percent must be finite".to_owned(),
        ));
    }
    Ok(percent)
}

/// Pans `axis` by `percent` of its length in screen direction.
///
/// Inverted axes run the other way on screen, so the shift is negated for them.
pub fn pan_value_axis(axis: &mut ValueAxis, percent: f64) {
    let percent = if axis.is_inverted() { -percent } else { percent };
    axis.pan(percent);
}

/// Anchor of an anchored zoom: the screen point and the area/edge it is read against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomAnchor {
    pub point: Point,
    pub data_area: Rect,
    pub edge: RectangleEdge,
}

/// Scales `axis` by `factor`.
///
/// With an anchor the value under the anchor keeps its screen position;
/// otherwise the range is scaled around its centre. A factor of zero turns
/// auto-range back on.
pub fn zoom_value_axis(axis: &mut ValueAxis, factor: f64, anchor: Option<ZoomAnchor>) {
    match anchor {
        Some(anchor) => {
            let device = anchor.point.coordinate_for_edge(anchor.edge);
            let value = axis.device_to_value(device, anchor.data_area, anchor.edge);
            axis.resize_range_keep_anchor(factor, value);
        }
        None => axis.resize_range(factor),
    }
}
