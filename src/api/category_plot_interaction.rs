use tracing::debug;

use crate::api::change::{PlotChangeEvent, PlotLink};
use crate::api::plot::Plot;
use crate::api::renderer::LegendItem;
use crate::api::snapshot::PlotSnapshot;
use crate::core::{AxisFamily, PlotOrientation, Point, Rect};
use crate::error::PlotResult;
use crate::interaction::{
    PlotRenderingInfo, ZoomAnchor, pan_value_axis, validate_pan_percent, validate_zoom_factor,
    validate_zoom_window, zoom_value_axis,
};
use crate::render::DrawingSurface;

use super::CategoryPlot;

impl Plot for CategoryPlot {
    fn link(&self) -> &PlotLink {
        &self.link
    }

    fn orientation(&self) -> PlotOrientation {
        self.config.orientation
    }

    fn set_orientation(&mut self, orientation: PlotOrientation) -> PlotResult<()> {
        if self.config.orientation == orientation {
            return Ok(());
        }
        self.config.orientation = orientation;
        self.axes.set_orientation(orientation);
        self.link.publish(PlotChangeEvent::General)
    }

    fn draw(
        &mut self,
        surface: &mut dyn DrawingSurface,
        area: Rect,
        anchor: Option<Point>,
    ) -> PlotResult<Option<PlotRenderingInfo>> {
        self.render(surface, area, anchor)
    }

    fn rendering_info(&self) -> Option<&PlotRenderingInfo> {
        self.rendering_info.as_ref()
    }

    /// Records the range value under the click as anchor and range crosshair.
    fn handle_click(&mut self, point: Point) -> PlotResult<bool> {
        let Some(data_area) = self.rendering_info.as_ref().map(|info| info.data_area) else {
            return Ok(false);
        };
        if !data_area.contains(point) {
            return Ok(false);
        }
        let Some(axis) = self.range_axis(0) else {
            return Ok(false);
        };
        let edge = self.axes.edge_of(AxisFamily::Range, 0);
        let value = axis.device_to_value(point.coordinate_for_edge(edge), data_area, edge);
        self.set_anchor_value(value)?;
        self.set_range_crosshair_value(value)?;
        Ok(true)
    }

    fn is_domain_zoomable(&self) -> bool {
        false
    }

    fn is_domain_pannable(&self) -> bool {
        false
    }

    fn is_range_pannable(&self) -> bool {
        self.config.range_pannable
    }

    fn zoom_domain_axes(&mut self, factor: f64, _anchor: Option<Point>) -> PlotResult<()> {
        validate_zoom_factor(factor)?;
        debug!("domain zoom ignored: category axes do not zoom");
        Ok(())
    }

    fn zoom_domain_axes_window(&mut self, lower: f64, upper: f64) -> PlotResult<()> {
        validate_zoom_window(lower, upper)?;
        debug!("domain zoom ignored: category axes do not zoom");
        Ok(())
    }

    fn zoom_range_axes(&mut self, factor: f64, anchor: Option<Point>) -> PlotResult<()> {
        let factor = validate_zoom_factor(factor)?;
        let data_area = self.rendering_info.as_ref().map(|info| info.data_area);
        if anchor.is_some() && data_area.is_none() {
            debug!("anchored zoom before first draw: zooming around the centre");
        }
        for index in self.axes.range_axis_indices() {
            let edge = self.axes.edge_of(AxisFamily::Range, index);
            let zoom_anchor = anchor.zip(data_area).map(|(point, data_area)| ZoomAnchor {
                point,
                data_area,
                edge,
            });
            self.update_range_axis(index, |axis| zoom_value_axis(axis, factor, zoom_anchor))?;
        }
        Ok(())
    }

    fn zoom_range_axes_window(&mut self, lower: f64, upper: f64) -> PlotResult<()> {
        let (lower, upper) = validate_zoom_window(lower, upper)?;
        for index in self.axes.range_axis_indices() {
            self.update_range_axis(index, |axis| axis.zoom_range(lower, upper))?;
        }
        Ok(())
    }

    fn pan_domain_axes(&mut self, percent: f64) -> PlotResult<()> {
        validate_pan_percent(percent)?;
        debug!("pan ignored: category axes do not pan");
        Ok(())
    }

    fn pan_range_axes(&mut self, percent: f64) -> PlotResult<()> {
        let percent = validate_pan_percent(percent)?;
        if !self.config.range_pannable {
            debug!("pan ignored: range axes not pannable");
            return Ok(());
        }
        for index in self.axes.range_axis_indices() {
            self.update_range_axis(index, |axis| pan_value_axis(axis, percent))?;
        }
        Ok(())
    }

    fn legend_items(&self) -> Vec<LegendItem> {
        self.build_legend_items()
    }

    fn snapshot(&self) -> PlotSnapshot {
        self.build_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::bar_renderer::BarRenderer;
    use crate::api::shared_dataset::SharedDataset;
    use crate::core::{CategoryAxis, DefaultCategoryDataset, ValueAxis, Viewport};
    use crate::interaction::DrawPhase;
    use crate::render::RecordingSurface;
    use approx::assert_relative_eq;

    fn plot() -> CategoryPlot {
        let mut plot = CategoryPlot::new();
        plot.set_domain_axis(0, Some(CategoryAxis::new())).expect("domain");
        plot.set_range_axis(0, Some(ValueAxis::new().with_range(0.0, 10.0).expect("range")))
            .expect("range");
        let data = DefaultCategoryDataset::new()
            .with_value(4.0, "sales", "Q1")
            .with_value(6.0, "sales", "Q2");
        plot.set_dataset(0, Some(SharedDataset::new(data).as_category()))
            .expect("dataset");
        plot.set_renderer(0, Some(Box::new(BarRenderer::new()))).expect("renderer");
        plot
    }

    #[test]
    fn click_sets_anchor_and_range_crosshair() {
        let mut plot = plot();
        let mut surface = RecordingSurface::new(Viewport::new(300, 200));
        let info = plot
            .draw(&mut surface, Rect::new(0.0, 0.0, 300.0, 200.0), None)
            .expect("draw")
            .expect("info");
        let area = info.data_area;
        assert!(plot.handle_click(Point::new(area.center_x(), area.center_y())).expect("click"));
        assert_relative_eq!(plot.anchor_value(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(plot.range_crosshair_value(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn domain_zoom_and_pan_leave_the_axis_alone() {
        let mut plot = plot();
        assert!(!plot.is_domain_zoomable());
        plot.zoom_domain_axes(0.5, None).expect("zoom");
        plot.pan_domain_axes(0.2).expect("pan");
        assert_eq!(plot.domain_axis(0).expect("axis").categories().len(), 2);
        assert!(plot.zoom_domain_axes(f64::NAN, None).is_err());
    }

    #[test]
    fn draw_locks_the_crosshair_onto_the_nearest_bar() {
        let mut plot = plot();
        let mut surface = RecordingSurface::new(Viewport::new(300, 200));
        let area = Rect::new(0.0, 0.0, 300.0, 200.0);
        let info = plot.draw(&mut surface, area, None).expect("draw").expect("info");
        assert!(info.ran(DrawPhase::Items));
        assert_eq!(info.items_drawn(0), 2);

        // click near the top of the second bar
        let data_area = info.data_area;
        let anchor = Point::new(data_area.max_x() - 5.0, data_area.min_y());
        plot.draw(&mut surface, area, Some(anchor)).expect("redraw");
        assert_eq!(plot.domain_crosshair_keys(), (Some("sales"), Some("Q2")));
        assert_relative_eq!(plot.range_crosshair_value(), 6.0);
    }
}
