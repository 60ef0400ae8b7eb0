//! Item renderer contracts consumed by the plots.
//!
//! A renderer draws one item at a time; the plot owns iteration order,
//! passes, visible-item windows and crosshair bookkeeping.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::api::crosshair::CrosshairState;
use crate::core::{
    Annotation, AnnotationContext, CategoryAxis, CategoryDataset, Layer, Marker, PlotOrientation,
    Point, Rect, RectangleEdge, ValueAxis, ValueRange, XyDataset,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DrawingSurface};

/// Colors handed to series in order when a renderer has no explicit paint.
pub const DEFAULT_SERIES_PALETTE: [Color; 6] = [
    Color::rgb(0.86, 0.20, 0.18),
    Color::rgb(0.20, 0.40, 0.80),
    Color::rgb(0.18, 0.62, 0.30),
    Color::rgb(0.95, 0.60, 0.10),
    Color::rgb(0.55, 0.30, 0.70),
    Color::rgb(0.10, 0.65, 0.70),
];

#[must_use]
pub fn palette_color(series: usize) -> Color {
    DEFAULT_SERIES_PALETTE[series % DEFAULT_SERIES_PALETTE.len()]
}

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub label: String,
    pub color: Color,
    pub dataset_index: usize,
    pub series_index: usize,
}

/// Geometry, axes and data one XY item is drawn against.
#[derive(Clone, Copy)]
pub struct XyItemContext<'a> {
    pub data_area: Rect,
    pub orientation: PlotOrientation,
    pub domain_axis: &'a ValueAxis,
    pub domain_edge: RectangleEdge,
    pub range_axis: &'a ValueAxis,
    pub range_edge: RectangleEdge,
    pub dataset: &'a dyn XyDataset,
    pub dataset_index: usize,
}

impl XyItemContext<'_> {
    /// Device coordinates of `(x, y)` along the domain and range axes.
    #[must_use]
    pub fn trans(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.domain_axis
                .value_to_device(x, self.data_area, self.domain_edge),
            self.range_axis
                .value_to_device(y, self.data_area, self.range_edge),
        )
    }

    /// Screen point for domain/range device coordinates.
    #[must_use]
    pub fn point(&self, trans_x: f64, trans_y: f64) -> Point {
        match self.orientation {
            PlotOrientation::Vertical => Point::new(trans_x, trans_y),
            PlotOrientation::Horizontal => Point::new(trans_y, trans_x),
        }
    }

    #[must_use]
    pub fn annotation_context(&self) -> AnnotationContext<'_> {
        AnnotationContext {
            data_area: self.data_area,
            orientation: self.orientation,
            domain_axis: self.domain_axis,
            domain_edge: self.domain_edge,
            range_axis: self.range_axis,
            range_edge: self.range_edge,
        }
    }
}

/// Scratch state of one XY renderer for one dataset draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyRendererState {
    pub process_visible_items_only: bool,
    pub pass: usize,
    pub first_item: usize,
    pub last_item: usize,
    /// Device points collected for the current series pass.
    pub series_path: Vec<Point>,
}

impl XyRendererState {
    #[must_use]
    pub fn new(process_visible_items_only: bool) -> Self {
        Self {
            process_visible_items_only,
            ..Self::default()
        }
    }
}

/// Draws the items of XY datasets.
pub trait XyItemRenderer: Debug {
    /// Number of full traversals of the items per draw.
    fn pass_count(&self) -> usize {
        1
    }

    /// Whether only items inside the domain axis range (plus one neighbour on
    /// each side) should be visited.
    fn process_visible_items_only(&self) -> bool {
        true
    }

    fn initialise(&self, _context: &XyItemContext<'_>) -> XyRendererState {
        XyRendererState::new(self.process_visible_items_only())
    }

    /// Called before the items of `series` are visited in `state.pass`.
    fn start_series_pass(
        &self,
        state: &mut XyRendererState,
        _context: &XyItemContext<'_>,
        _series: usize,
    ) {
        state.series_path.clear();
    }

    /// Called after the items of `series` were visited in `state.pass`.
    fn end_series_pass(
        &self,
        _surface: &mut dyn DrawingSurface,
        _state: &mut XyRendererState,
        _context: &XyItemContext<'_>,
        _series: usize,
    ) -> PlotResult<()> {
        Ok(())
    }

    fn draw_item(
        &self,
        surface: &mut dyn DrawingSurface,
        state: &mut XyRendererState,
        context: &XyItemContext<'_>,
        series: usize,
        item: usize,
        crosshair: &mut CrosshairState,
    ) -> PlotResult<()>;

    fn is_series_visible(&self, _series: usize) -> bool {
        true
    }

    fn is_series_visible_in_legend(&self, series: usize) -> bool {
        self.is_series_visible(series)
    }

    fn series_color(&self, series: usize) -> Color {
        palette_color(series)
    }

    fn legend_item(
        &self,
        dataset: &dyn XyDataset,
        dataset_index: usize,
        series: usize,
    ) -> Option<LegendItem> {
        Some(LegendItem {
            label: dataset.series_key(series).to_owned(),
            color: self.series_color(series),
            dataset_index,
            series_index: series,
        })
    }

    /// Domain extent of the visible series.
    fn find_domain_bounds(&self, dataset: &dyn XyDataset) -> Option<ValueRange> {
        let mut result = None;
        for series in (0..dataset.series_count()).filter(|s| self.is_series_visible(*s)) {
            for item in 0..dataset.item_count(series) {
                result = ValueRange::expand_to_include(result, dataset.x_value(series, item));
            }
        }
        result
    }

    /// Range extent of the visible series.
    fn find_range_bounds(&self, dataset: &dyn XyDataset) -> Option<ValueRange> {
        let mut result = None;
        for series in (0..dataset.series_count()).filter(|s| self.is_series_visible(*s)) {
            for item in 0..dataset.item_count(series) {
                result = ValueRange::expand_to_include(result, dataset.y_value(series, item));
            }
        }
        result
    }

    fn annotations(&self) -> &[Box<dyn Annotation>] {
        &[]
    }

    fn add_annotation(&mut self, _annotation: Box<dyn Annotation>) -> PlotResult<()> {
        Err(PlotError::InvalidArgument(
            "renderer does not hold annotations".to_owned(),
        ))
    }

    fn clear_annotations(&mut self) {}

    fn draw_annotations(
        &self,
        surface: &mut dyn DrawingSurface,
        context: &AnnotationContext<'_>,
        layer: Layer,
    ) -> PlotResult<()> {
        for annotation in self.annotations().iter().filter(|a| a.layer() == layer) {
            annotation.draw(surface, context)?;
        }
        Ok(())
    }

    fn draw_domain_marker(
        &self,
        surface: &mut dyn DrawingSurface,
        marker: &Marker,
        axis: &ValueAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        marker.draw_on_value_axis(surface, axis, data_area, edge)
    }

    fn draw_range_marker(
        &self,
        surface: &mut dyn DrawingSurface,
        marker: &Marker,
        axis: &ValueAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        marker.draw_on_value_axis(surface, axis, data_area, edge)
    }

    fn clone_box(&self) -> Box<dyn XyItemRenderer>;
}

impl Clone for Box<dyn XyItemRenderer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Geometry, axes and data one category item is drawn against.
#[derive(Clone, Copy)]
pub struct CategoryItemContext<'a> {
    pub data_area: Rect,
    pub orientation: PlotOrientation,
    pub domain_axis: &'a CategoryAxis,
    pub domain_edge: RectangleEdge,
    pub range_axis: &'a ValueAxis,
    pub range_edge: RectangleEdge,
    pub dataset: &'a dyn CategoryDataset,
    pub dataset_index: usize,
}

impl CategoryItemContext<'_> {
    /// Slot of the dataset column on the domain axis.
    #[must_use]
    pub fn category_slot(&self, column: usize) -> Option<usize> {
        let key = self.dataset.column_key(column);
        self.domain_axis
            .categories()
            .iter()
            .position(|category| category == key)
    }

    #[must_use]
    pub fn category_count(&self) -> usize {
        self.domain_axis.categories().len()
    }

    #[must_use]
    pub fn range_to_device(&self, value: f64) -> f64 {
        self.range_axis
            .value_to_device(value, self.data_area, self.range_edge)
    }

    /// Screen point for domain/range device coordinates.
    #[must_use]
    pub fn point(&self, trans_x: f64, trans_y: f64) -> Point {
        match self.orientation {
            PlotOrientation::Vertical => Point::new(trans_x, trans_y),
            PlotOrientation::Horizontal => Point::new(trans_y, trans_x),
        }
    }

    #[must_use]
    pub fn annotation_context(&self) -> AnnotationContext<'_> {
        AnnotationContext {
            data_area: self.data_area,
            orientation: self.orientation,
            domain_axis: self.domain_axis,
            domain_edge: self.domain_edge,
            range_axis: self.range_axis,
            range_edge: self.range_edge,
        }
    }
}

/// Scratch state of one category renderer for one dataset draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRendererState {
    pub pass: usize,
    /// Width of one item along the domain axis, in device units.
    pub bar_width: f64,
    /// Rows that are drawn, in dataset order.
    pub visible_rows: Vec<usize>,
}

/// Draws the items of category datasets.
pub trait CategoryItemRenderer: Debug {
    fn pass_count(&self) -> usize {
        1
    }

    fn initialise(&self, context: &CategoryItemContext<'_>) -> CategoryRendererState {
        CategoryRendererState {
            visible_rows: (0..context.dataset.row_count())
                .filter(|row| self.is_series_visible(*row))
                .collect(),
            ..CategoryRendererState::default()
        }
    }

    fn draw_item(
        &self,
        surface: &mut dyn DrawingSurface,
        state: &mut CategoryRendererState,
        context: &CategoryItemContext<'_>,
        row: usize,
        column: usize,
        crosshair: &mut CrosshairState,
    ) -> PlotResult<()>;

    fn is_series_visible(&self, _row: usize) -> bool {
        true
    }

    fn is_series_visible_in_legend(&self, row: usize) -> bool {
        self.is_series_visible(row)
    }

    fn series_color(&self, row: usize) -> Color {
        palette_color(row)
    }

    fn legend_item(
        &self,
        dataset: &dyn CategoryDataset,
        dataset_index: usize,
        row: usize,
    ) -> Option<LegendItem> {
        Some(LegendItem {
            label: dataset.row_key(row).to_owned(),
            color: self.series_color(row),
            dataset_index,
            series_index: row,
        })
    }

    fn find_range_bounds(&self, dataset: &dyn CategoryDataset) -> Option<ValueRange> {
        let mut result = None;
        for row in (0..dataset.row_count()).filter(|row| self.is_series_visible(*row)) {
            for column in 0..dataset.column_count() {
                if let Some(value) = dataset.value(row, column) {
                    result = ValueRange::expand_to_include(result, value);
                }
            }
        }
        result
    }

    /// Device coordinate along the domain axis of the middle of an item.
    fn item_middle(
        &self,
        _row: usize,
        column: usize,
        dataset: &dyn CategoryDataset,
        axis: &CategoryAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> f64 {
        let key = dataset.column_key(column);
        let count = axis.categories().len();
        let slot = axis
            .categories()
            .iter()
            .position(|category| category == key)
            .unwrap_or(column);
        axis.category_middle(slot, count.max(1), data_area, edge)
    }

    fn annotations(&self) -> &[Box<dyn Annotation>] {
        &[]
    }

    fn add_annotation(&mut self, _annotation: Box<dyn Annotation>) -> PlotResult<()> {
        Err(PlotError::InvalidArgument(
            "renderer does not hold annotations".to_owned(),
        ))
    }

    fn clear_annotations(&mut self) {}

    fn draw_annotations(
        &self,
        surface: &mut dyn DrawingSurface,
        context: &AnnotationContext<'_>,
        layer: Layer,
    ) -> PlotResult<()> {
        for annotation in self.annotations().iter().filter(|a| a.layer() == layer) {
            annotation.draw(surface, context)?;
        }
        Ok(())
    }

    fn draw_domain_marker(
        &self,
        surface: &mut dyn DrawingSurface,
        marker: &Marker,
        axis: &CategoryAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        marker.draw_on_category_axis(surface, axis, data_area, edge)
    }

    fn draw_range_marker(
        &self,
        surface: &mut dyn DrawingSurface,
        marker: &Marker,
        axis: &ValueAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        marker.draw_on_value_axis(surface, axis, data_area, edge)
    }

    fn clone_box(&self) -> Box<dyn CategoryItemRenderer>;
}

impl Clone for Box<dyn CategoryItemRenderer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(palette_color(0), palette_color(DEFAULT_SERIES_PALETTE.len()));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn horizontal_context_swaps_screen_axes() {
        let mut domain = ValueAxis::new();
        domain.set_range_bounds(0.0, 10.0).expect("range");
        let range = ValueAxis::new();
        let dataset = crate::core::XySeriesCollection::new();
        let context = XyItemContext {
            data_area: Rect::new(0.0, 0.0, 100.0, 100.0),
            orientation: PlotOrientation::Horizontal,
            domain_axis: &domain,
            domain_edge: RectangleEdge::Left,
            range_axis: &range,
            range_edge: RectangleEdge::Bottom,
            dataset: &dataset,
            dataset_index: 0,
        };
        let (trans_x, trans_y) = context.trans(5.0, 0.5);
        assert_eq!(context.point(trans_x, trans_y), Point::new(trans_y, trans_x));
    }
}
