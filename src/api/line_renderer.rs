use std::collections::{BTreeMap, BTreeSet};

use crate::api::crosshair::CrosshairState;
use crate::api::renderer::{XyItemContext, XyItemRenderer, XyRendererState, palette_color};
use crate::core::{Annotation, Rect};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DrawingSurface, Stroke};

const LINE_PASS: usize = 0;
const SHAPE_PASS: usize = 1;

/// Connects the items of each series with lines and marks them with squares.
///
/// Lines are drawn in the first pass and shapes in the second, so every
/// shape sits above every line. Crosshair candidates are offered during the
/// shape pass.
#[derive(Debug, Clone)]
pub struct XyLineRenderer {
    lines_visible: bool,
    shapes_visible: bool,
    shape_size: f64,
    line_width: f64,
    series_colors: BTreeMap<usize, Color>,
    hidden_series: BTreeSet<usize>,
    annotations: Vec<Box<dyn Annotation>>,
}

impl Default for XyLineRenderer {
    fn default() -> Self {
        Self {
            lines_visible: true,
            shapes_visible: true,
            shape_size: 6.0,
            line_width: 1.5,
            series_colors: BTreeMap::new(),
            hidden_series: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }
}

impl XyLineRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_lines_visible(mut self, visible: bool) -> Self {
        self.lines_visible = visible;
        self
    }

    #[must_use]
    pub fn with_shapes_visible(mut self, visible: bool) -> Self {
        self.shapes_visible = visible;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> PlotResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(PlotError::InvalidArgument(
                "line width must be finite and > 0".to_owned(),
            ));
        }
        self.line_width = width;
        Ok(self)
    }

    pub fn with_shape_size(mut self, size: f64) -> PlotResult<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(PlotError::InvalidArgument(
                "shape size must be finite and > 0".to_owned(),
            ));
        }
        self.shape_size = size;
        Ok(self)
    }

    pub fn set_series_color(&mut self, series: usize, color: Color) -> PlotResult<()> {
        self.series_colors.insert(series, color.validate()?);
        Ok(())
    }

    pub fn set_series_visible(&mut self, series: usize, visible: bool) {
        if visible {
            self.hidden_series.remove(&series);
        } else {
            self.hidden_series.insert(series);
        }
    }

    fn line_stroke(&self, series: usize) -> Stroke {
        Stroke::solid(self.line_width, self.series_color(series))
    }

    fn flush_path(
        &self,
        surface: &mut dyn DrawingSurface,
        state: &mut XyRendererState,
        series: usize,
    ) -> PlotResult<()> {
        if state.series_path.len() >= 2 {
            surface.draw_polyline(&state.series_path, self.line_stroke(series))?;
        }
        state.series_path.clear();
        Ok(())
    }
}

impl XyItemRenderer for XyLineRenderer {
    fn pass_count(&self) -> usize {
        2
    }

    fn end_series_pass(
        &self,
        surface: &mut dyn DrawingSurface,
        state: &mut XyRendererState,
        _context: &XyItemContext<'_>,
        series: usize,
    ) -> PlotResult<()> {
        if state.pass == LINE_PASS {
            self.flush_path(surface, state, series)?;
        }
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
    ) -> PlotResult<()> {
        if !self.is_series_visible(series) {
            return Ok(());
        }
        let x = context.dataset.x_value(series, item);
        let y = context.dataset.y_value(series, item);
        let (trans_x, trans_y) = context.trans(x, y);
        match state.pass {
            LINE_PASS if self.lines_visible => {
                // a missing value breaks the line
                if !x.is_finite() || !y.is_finite() {
                    return self.flush_path(surface, state, series);
                }
                state.series_path.push(context.point(trans_x, trans_y));
            }
            SHAPE_PASS => {
                if !x.is_finite() || !y.is_finite() {
                    return Ok(());
                }
                if self.shapes_visible {
                    let center = context.point(trans_x, trans_y);
                    let half = self.shape_size / 2.0;
                    surface.fill_rect(
                        Rect::new(
                            center.x - half,
                            center.y - half,
                            self.shape_size,
                            self.shape_size,
                        ),
                        self.series_color(series),
                    )?;
                }
                crosshair.update_crosshair_point(
                    x,
                    y,
                    context.dataset_index,
                    trans_x,
                    trans_y,
                    context.orientation,
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn is_series_visible(&self, series: usize) -> bool {
        !self.hidden_series.contains(&series)
    }

    fn series_color(&self, series: usize) -> Color {
        self.series_colors
            .get(&series)
            .copied()
            .unwrap_or_else(|| palette_color(series))
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

    fn clone_box(&self) -> Box<dyn XyItemRenderer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        DataPoint, PlotOrientation, Point, RectangleEdge, ValueAxis, Viewport, XyDataset,
        XySeries, XySeriesCollection,
    };
    use crate::render::{DrawCommand, RecordingSurface};

    fn draw_all(
        renderer: &XyLineRenderer,
        dataset: &XySeriesCollection,
        anchor: Option<Point>,
    ) -> (RecordingSurface, CrosshairState) {
        let domain = ValueAxis::new().with_range(0.0, 10.0).expect("range");
        let range = ValueAxis::new().with_range(0.0, 10.0).expect("range");
        let context = XyItemContext {
            data_area: Rect::new(0.0, 0.0, 100.0, 100.0),
            orientation: PlotOrientation::Vertical,
            domain_axis: &domain,
            domain_edge: RectangleEdge::Bottom,
            range_axis: &range,
            range_edge: RectangleEdge::Left,
            dataset,
            dataset_index: 0,
        };
        let mut surface = RecordingSurface::new(Viewport::new(100, 100));
        let mut crosshair = CrosshairState::new(false);
        crosshair.set_anchor(anchor);
        let mut state = renderer.initialise(&context);
        for pass in 0..renderer.pass_count() {
            state.pass = pass;
            renderer.start_series_pass(&mut state, &context, 0);
            for item in 0..dataset.item_count(0) {
                renderer
                    .draw_item(&mut surface, &mut state, &context, 0, item, &mut crosshair)
                    .expect("item");
            }
            renderer
                .end_series_pass(&mut surface, &mut state, &context, 0)
                .expect("end");
        }
        (surface, crosshair)
    }

    #[test]
    fn lines_precede_shapes() {
        let dataset = XySeriesCollection::new().with_series(XySeries::from_points(
            "s",
            vec![DataPoint::new(1.0, 1.0), DataPoint::new(2.0, 4.0)],
        ));
        let (surface, _) = draw_all(&XyLineRenderer::new(), &dataset, None);
        let commands = surface.commands();
        assert!(matches!(commands[0], DrawCommand::Polyline { .. }));
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn missing_values_split_the_line() {
        let dataset = XySeriesCollection::new().with_series(XySeries::unsorted(
            "s",
            vec![
                DataPoint::new(1.0, 1.0),
                DataPoint::new(2.0, 2.0),
                DataPoint::new(3.0, f64::NAN),
                DataPoint::new(4.0, 3.0),
                DataPoint::new(5.0, 4.0),
            ],
        ));
        let renderer = XyLineRenderer::new().with_shapes_visible(false);
        let (surface, _) = draw_all(&renderer, &dataset, None);
        let polylines = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polyline { .. }))
            .count();
        assert_eq!(polylines, 2);
    }

    #[test]
    fn shape_pass_offers_crosshair_candidates() {
        let dataset = XySeriesCollection::new().with_series(XySeries::from_points(
            "s",
            vec![DataPoint::new(2.0, 3.0), DataPoint::new(8.0, 9.0)],
        ));
        // (8, 9) lands at device (80, 10)
        let (_, crosshair) = draw_all(&XyLineRenderer::new(), &dataset, Some(Point::new(78.0, 12.0)));
        assert_eq!((crosshair.crosshair_x(), crosshair.crosshair_y()), (8.0, 9.0));
    }

    #[test]
    fn hidden_series_are_skipped() {
        let dataset = XySeriesCollection::new().with_series(XySeries::from_points(
            "s",
            vec![DataPoint::new(1.0, 1.0), DataPoint::new(2.0, 4.0)],
        ));
        let mut renderer = XyLineRenderer::new();
        renderer.set_series_visible(0, false);
        let (surface, _) = draw_all(&renderer, &dataset, None);
        assert!(surface.commands().is_empty());
        assert!(renderer.find_range_bounds(&dataset).is_none());
    }
}
