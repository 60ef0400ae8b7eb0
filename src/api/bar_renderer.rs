use std::collections::{BTreeMap, BTreeSet};

use crate::api::crosshair::CrosshairState;
use crate::api::renderer::{
    CategoryItemContext, CategoryItemRenderer, CategoryRendererState, palette_color,
};
use crate::core::{
    Annotation, CategoryAxis, CategoryDataset, PlotOrientation, Rect, RectangleEdge, ValueRange,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DrawingSurface, Stroke};

/// Draws each category value as a bar from a base value.
///
/// Bars of the visible rows sit side by side inside each category slot,
/// separated by the item margin.
#[derive(Debug, Clone)]
pub struct BarRenderer {
    item_margin: f64,
    maximum_bar_width: f64,
    base: f64,
    include_base_in_range: bool,
    outline: Option<Stroke>,
    series_colors: BTreeMap<usize, Color>,
    hidden_series: BTreeSet<usize>,
    annotations: Vec<Box<dyn Annotation>>,
}

impl Default for BarRenderer {
    fn default() -> Self {
        Self {
            item_margin: 0.2,
            maximum_bar_width: 1.0,
            base: 0.0,
            include_base_in_range: true,
            outline: None,
            series_colors: BTreeMap::new(),
            hidden_series: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }
}

impl BarRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of the slot left empty between the bars of one category.
    pub fn with_item_margin(mut self, margin: f64) -> PlotResult<Self> {
        if !margin.is_finite() || !(0.0..1.0).contains(&margin) {
            return Err(PlotError::InvalidArgument(
                "item margin must be finite and in [0, 1)".to_owned(),
            ));
        }
        self.item_margin = margin;
        Ok(self)
    }

    /// Caps a bar's width as a fraction of the data area extent.
    pub fn with_maximum_bar_width(mut self, fraction: f64) -> PlotResult<Self> {
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(PlotError::InvalidArgument(
                "maximum bar width must be finite and in (0, 1]".to_owned(),
            ));
        }
        self.maximum_bar_width = fraction;
        Ok(self)
    }

    pub fn with_base(mut self, base: f64) -> PlotResult<Self> {
        if !base.is_finite() {
            return Err(PlotError::InvalidArgument(
                "bar base must be finite".to_owned(),
            ));
        }
        self.base = base;
        Ok(self)
    }

    #[must_use]
    pub fn with_include_base_in_range(mut self, include: bool) -> Self {
        self.include_base_in_range = include;
        self
    }

    pub fn with_outline(mut self, outline: Option<Stroke>) -> PlotResult<Self> {
        self.outline = outline.map(Stroke::validate).transpose()?;
        Ok(self)
    }

    pub fn set_series_color(&mut self, row: usize, color: Color) -> PlotResult<()> {
        self.series_colors.insert(row, color.validate()?);
        Ok(())
    }

    pub fn set_series_visible(&mut self, row: usize, visible: bool) {
        if visible {
            self.hidden_series.remove(&row);
        } else {
            self.hidden_series.insert(row);
        }
    }

    fn visible_row_count(&self, dataset: &dyn CategoryDataset) -> usize {
        (0..dataset.row_count())
            .filter(|row| self.is_series_visible(*row))
            .count()
    }

    fn bar_width(&self, space: f64, axis: &CategoryAxis, categories: usize, rows: usize) -> f64 {
        let (lower, upper, category_margin) = axis.margins();
        let category_margin = if categories > 1 { category_margin } else { 0.0 };
        let item_margin = if rows > 1 { self.item_margin } else { 0.0 };
        let used = space * (1.0 - lower - upper - category_margin - item_margin);
        let max_width = space * self.maximum_bar_width;
        if rows * categories > 0 {
            (used / (rows * categories) as f64).min(max_width)
        } else {
            used.min(max_width)
        }
    }

    /// Device coordinate where the bar of `slot.position` starts.
    fn bar_start(&self, axis: &CategoryAxis, slot: BarSlot, area: Rect, edge: RectangleEdge) -> f64 {
        if slot.rows > 1 {
            let space = area.extent_for_edge(edge);
            let (lower, upper, category_margin) = axis.margins();
            let mut factor = 1.0 - self.item_margin - lower - upper;
            if slot.categories > 1 {
                factor -= category_margin;
            }
            let series_width = space * factor / (slot.categories * slot.rows) as f64;
            let series_gap = space * self.item_margin / (slot.categories * (slot.rows - 1)) as f64;
            axis.category_start(slot.category, slot.categories, area, edge)
                + slot.position as f64 * (series_width + series_gap)
                + series_width / 2.0
                - slot.bar_width / 2.0
        } else {
            axis.category_middle(slot.category, slot.categories, area, edge) - slot.bar_width / 2.0
        }
    }
}

/// Where one bar sits: its category slot and its rank among the visible rows.
#[derive(Debug, Clone, Copy)]
struct BarSlot {
    category: usize,
    categories: usize,
    position: usize,
    rows: usize,
    bar_width: f64,
}

impl CategoryItemRenderer for BarRenderer {
    fn initialise(&self, context: &CategoryItemContext<'_>) -> CategoryRendererState {
        let visible_rows: Vec<usize> = (0..context.dataset.row_count())
            .filter(|row| self.is_series_visible(*row))
            .collect();
        let space = context.data_area.extent_for_edge(context.domain_edge);
        let bar_width = self.bar_width(
            space,
            context.domain_axis,
            context.category_count(),
            visible_rows.len(),
        );
        CategoryRendererState {
            pass: 0,
            bar_width,
            visible_rows,
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
    ) -> PlotResult<()> {
        let Some(position) = state.visible_rows.iter().position(|visible| *visible == row) else {
            return Ok(());
        };
        let Some(value) = context.dataset.value(row, column) else {
            return Ok(());
        };
        let Some(slot) = context.category_slot(column) else {
            return Ok(());
        };
        let axis_range = context.range_axis.range();
        let low = value.min(self.base);
        let high = value.max(self.base);
        if high < axis_range.lower() || low > axis_range.upper() {
            return Ok(());
        }
        let start = context.range_to_device(low.max(axis_range.lower()));
        let end = context.range_to_device(high.min(axis_range.upper()));
        let bar_start = self.bar_start(
            context.domain_axis,
            BarSlot {
                category: slot,
                categories: context.category_count(),
                position,
                rows: state.visible_rows.len(),
                bar_width: state.bar_width,
            },
            context.data_area,
            context.domain_edge,
        );
        let bar = match context.orientation {
            PlotOrientation::Vertical => {
                Rect::from_corners(bar_start, start, bar_start + state.bar_width, end)
            }
            PlotOrientation::Horizontal => {
                Rect::from_corners(start, bar_start, end, bar_start + state.bar_width)
            }
        };
        surface.fill_rect(bar, self.series_color(row))?;
        if let Some(outline) = self.outline {
            surface.stroke_rect(bar, outline)?;
        }
        crosshair.update_category_point(
            context.dataset.row_key(row),
            context.dataset.column_key(column),
            value,
            context.dataset_index,
            (
                bar_start + state.bar_width / 2.0,
                context.range_to_device(value),
            ),
            context.orientation,
        );
        Ok(())
    }

    fn is_series_visible(&self, row: usize) -> bool {
        !self.hidden_series.contains(&row)
    }

    fn series_color(&self, row: usize) -> Color {
        self.series_colors
            .get(&row)
            .copied()
            .unwrap_or_else(|| palette_color(row))
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
        if self.include_base_in_range && result.is_some() {
            result = ValueRange::expand_to_include(result, self.base);
        }
        result
    }

    fn item_middle(
        &self,
        row: usize,
        column: usize,
        dataset: &dyn CategoryDataset,
        axis: &CategoryAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> f64 {
        let categories = axis.categories().len().max(1);
        let key = dataset.column_key(column);
        let slot = axis
            .categories()
            .iter()
            .position(|category| category == key)
            .unwrap_or(column);
        let rows = self.visible_row_count(dataset);
        let position = (0..row)
            .filter(|candidate| self.is_series_visible(*candidate))
            .count();
        let bar_width = self.bar_width(data_area.extent_for_edge(edge), axis, categories, rows);
        let slot = BarSlot {
            category: slot,
            categories,
            position,
            rows,
            bar_width,
        };
        self.bar_start(axis, slot, data_area, edge) + bar_width / 2.0
    }

    fn annotations(&self) -> &[Box<dyn Annotation>] {
        &self.annotations
    }

    fn add_annotation(&mut self, annotation: Box<dyn Annotation>) -> PlotResult<()> {
        self.annotations.push(annotation);
        Ok(())
    }

    fn clear_annotations(&mut self) {
        self.annotations.clear();
    }

    fn clone_box(&self) -> Box<dyn CategoryItemRenderer> {
        Box::new(self.clone())
    }
}
