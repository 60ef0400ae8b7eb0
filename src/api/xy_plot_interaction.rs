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

use super::XyPlot;

impl XyPlot {
    /// Zooms every local axis of `family`. An anchor is only honoured once a
    /// draw recorded the data area it refers to.
    fn zoom_family(&mut self, family: AxisFamily, factor: f64, anchor: Option<Point>) -> PlotResult<()> {
        let factor = validate_zoom_factor(factor)?;
        let data_area = self.rendering_info.as_ref().map(|info| info.data_area);
        if anchor.is_some() && data_area.is_none() {
            debug!(?family, "anchored zoom before first draw: zooming around the centre");
        }
        for index in self.axes.axis_indices(family) {
            let edge = self.axes.edge_of(family, index);
            let zoom_anchor = anchor.zip(data_area).map(|(point, data_area)| ZoomAnchor {
                point,
                data_area,
                edge,
            });
            self.update_axis(family, index, |axis| zoom_value_axis(axis, factor, zoom_anchor))?;
        }
        Ok(())
    }

    fn zoom_family_window(&mut self, family: AxisFamily, lower: f64, upper: f64) -> PlotResult<()> {
        let (lower, upper) = validate_zoom_window(lower, upper)?;
        for index in self.axes.axis_indices(family) {
            self.update_axis(family, index, |axis| axis.zoom_range(lower, upper))?;
        }
        Ok(())
    }

    fn pan_family(&mut self, family: AxisFamily, percent: f64) -> PlotResult<()> {
        let percent = validate_pan_percent(percent)?;
        let pannable = match family {
            AxisFamily::Domain => self.config.domain_pannable,
            AxisFamily::Range => self.config.range_pannable,
        };
        if !pannable {
            debug!(?family, "pan ignored: axes not pannable");
            return Ok(());
        }
        for index in self.axes.axis_indices(family) {
            self.update_axis(family, index, |axis| pan_value_axis(axis, percent))?;
        }
        Ok(())
    }

    /// Data value under `point` on the primary axis of `family`.
    fn value_at(&self, family: AxisFamily, point: Point, data_area: Rect) -> Option<f64> {
        let axis = match family {
            AxisFamily::Domain => self.axes.domain_axis(0),
            AxisFamily::Range => self.axes.range_axis(0),
        }?;
        let edge = self.axes.edge_of(family, 0);
        Some(axis.device_to_value(point.coordinate_for_edge(edge), data_area, edge))
    }
}

impl Plot for XyPlot {
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

    fn handle_click(&mut self, point: Point) -> PlotResult<bool> {
        let Some(data_area) = self.rendering_info.as_ref().map(|info| info.data_area) else {
            return Ok(false);
        };
        if !data_area.contains(point) {
            return Ok(false);
        }
        self.refresh_axes();
        if let Some(value) = self.value_at(AxisFamily::Domain, point, data_area) {
            self.set_crosshair_value(AxisFamily::Domain, value)?;
        }
        if let Some(value) = self.value_at(AxisFamily::Range, point, data_area) {
            self.set_crosshair_value(AxisFamily::Range, value)?;
        }
        Ok(true)
    }

    fn is_domain_zoomable(&self) -> bool {
        true
    }

    fn is_domain_pannable(&self) -> bool {
        self.config.domain_pannable
    }

    fn is_range_pannable(&self) -> bool {
        self.config.range_pannable
    }

    fn zoom_domain_axes(&mut self, factor: f64, anchor: Option<Point>) -> PlotResult<()> {
        self.zoom_family(AxisFamily::Domain, factor, anchor)
    }

    fn zoom_domain_axes_window(&mut self, lower: f64, upper: f64) -> PlotResult<()> {
        self.zoom_family_window(AxisFamily::Domain, lower, upper)
    }

    fn zoom_range_axes(&mut self, factor: f64, anchor: Option<Point>) -> PlotResult<()> {
        self.zoom_family(AxisFamily::Range, factor, anchor)
    }

    fn zoom_range_axes_window(&mut self, lower: f64, upper: f64) -> PlotResult<()> {
        self.zoom_family_window(AxisFamily::Range, lower, upper)
    }

    fn pan_domain_axes(&mut self, percent: f64) -> PlotResult<()> {
        self.pan_family(AxisFamily::Domain, percent)
    }

    fn pan_range_axes(&mut self, percent: f64) -> PlotResult<()> {
        self.pan_family(AxisFamily::Range, percent)
    }

    fn legend_items(&self) -> Vec<LegendItem> {
        self.build_legend_items()
    }

    fn snapshot(&self) -> PlotSnapshot {
        self.build_snapshot()
    }
}
