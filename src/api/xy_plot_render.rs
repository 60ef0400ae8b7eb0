use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::api::crosshair::CrosshairState;
use crate::api::layout::LayoutEngine;
use crate::api::plot::{
    draw_no_data_message, draw_outline, draw_tick_gridlines, draw_value_line, fill_background,
    fill_tick_bands,
};
use crate::api::renderer::XyItemContext;
use crate::core::{
    AnnotationContext, AxisFamily, AxisKey, AxisState, Layer, PlotOrientation, Point, Rect,
    SeriesRenderingOrder, XyDataset, is_empty_xy, visible_item_window,
};
use crate::error::PlotResult;
use crate::interaction::{DrawPhase, PlotRenderingInfo};
use crate::render::{DrawingSurface, ShadowGenerator};

use super::XyPlot;

struct DrawOutcome {
    info: PlotRenderingInfo,
    domain_crosshair: f64,
    range_crosshair: f64,
}

/// Inclusive item window of one series and whether any item in it is visible.
fn series_window(
    dataset: &dyn XyDataset,
    series: usize,
    lower: f64,
    upper: f64,
    visible_only: bool,
) -> Option<(usize, usize, bool)> {
    let count = dataset.item_count(series);
    if count == 0 {
        return None;
    }
    if !visible_only {
        return Some((0, count - 1, true));
    }
    visible_item_window(dataset, series, lower, upper)
        .map(|window| (window.first, window.last, window.has_visible_items))
}

impl XyPlot {
    /// Runs one full draw and keeps its outcome: rendering info and the
    /// resolved crosshair values, which are stored without notification.
    pub(super) fn render(
        &mut self,
        surface: &mut dyn DrawingSurface,
        area: Rect,
        anchor: Option<Point>,
    ) -> PlotResult<Option<PlotRenderingInfo>> {
        self.refresh_axes();
        let Some(outcome) = self.draw_plot(surface, area, anchor)? else {
            self.rendering_info = None;
            return Ok(None);
        };
        self.domain_crosshair_value = outcome.domain_crosshair;
        self.range_crosshair_value = outcome.range_crosshair;
        self.rendering_info = Some(outcome.info.clone());
        Ok(Some(outcome.info))
    }

    fn draw_plot(
        &self,
        surface: &mut dyn DrawingSurface,
        area: Rect,
        anchor: Option<Point>,
    ) -> PlotResult<Option<DrawOutcome>> {
        let engine = LayoutEngine::new(&self.config.layout);
        let Some(layout) = engine.reserve_space(&self.axes, area) else {
            debug!(
                width = area.width,
                height = area.height,
                "xy plot not drawn: no room for a data area"
            );
            return Ok(None);
        };
        let data_area = layout.data_area;
        let style = &self.config.style;
        let mut info = PlotRenderingInfo::new(layout.plot_area, data_area);

        info.enter(DrawPhase::Background);
        fill_background(surface, data_area, style)?;
        self.draw_quadrants(surface, data_area)?;

        info.enter(DrawPhase::Axes);
        let axis_states = engine.draw_axes(&self.axes, surface, layout.plot_area, data_area)?;
        self.draw_tick_bands(surface, data_area, &axis_states)?;

        let anchor = anchor.filter(|point| data_area.contains(*point));
        let mut crosshair = self.initial_crosshair(anchor, data_area);

        let original_alpha = surface.composite_alpha();
        surface.save_clip(data_area)?;
        surface.set_composite_alpha(style.foreground_alpha)?;

        info.enter(DrawPhase::Gridlines);
        self.draw_gridlines(surface, data_area, &axis_states)?;

        let shadow = style
            .shadow
            .as_ref()
            .filter(|_| !surface.rendering_hints().suppress_shadow);
        if shadow.is_some() {
            surface.begin_layer()?;
            surface.save_clip(data_area)?;
            surface.set_composite_alpha(style.foreground_alpha)?;
        }

        info.enter(DrawPhase::BackgroundMarkers);
        self.draw_markers(surface, data_area, Layer::Background)?;
        info.enter(DrawPhase::BackgroundAnnotations);
        self.draw_annotations(surface, data_area, Layer::Background)?;

        info.enter(DrawPhase::Items);
        let mut found_data = false;
        for dataset_index in self
            .bindings
            .dataset_indices(self.config.dataset_rendering_order)
        {
            found_data |=
                self.render_dataset(surface, data_area, dataset_index, &mut crosshair, &mut info)?;
        }
        info.set_found_data(found_data);

        info.enter(DrawPhase::ForegroundAnnotations);
        self.draw_annotations(surface, data_area, Layer::Foreground)?;

        info.enter(DrawPhase::Crosshairs);
        let (domain_crosshair, range_crosshair) =
            self.resolve_crosshairs(surface, data_area, anchor, &mut crosshair)?;

        if !found_data {
            info.enter(DrawPhase::NoDataMessage);
            if let Some(message) = &style.no_data_message {
                draw_no_data_message(surface, data_area, message)?;
            }
        }

        info.enter(DrawPhase::ForegroundMarkers);
        self.draw_markers(surface, data_area, Layer::Foreground)?;

        match shadow {
            Some(generator) => {
                surface.restore_clip()?;
                let image = surface.end_layer()?;
                surface.restore_clip()?;
                surface.set_composite_alpha(original_alpha)?;
                info.enter(DrawPhase::ShadowComposite);
                let shadow_image = generator.create_drop_shadow(&image);
                surface.draw_image(&shadow_image, generator.offset_x(), generator.offset_y())?;
                surface.draw_image(&image, 0.0, 0.0)?;
                surface.set_composite_alpha(original_alpha)?;
            }
            None => {
                surface.restore_clip()?;
                surface.set_composite_alpha(original_alpha)?;
            }
        }

        info.enter(DrawPhase::Outline);
        draw_outline(surface, data_area, style)?;

        trace!(
            x = data_area.x,
            y = data_area.y,
            width = data_area.width,
            height = data_area.height,
            items = info.total_items_drawn(),
            found_data,
            "xy plot drawn"
        );
        Ok(Some(DrawOutcome {
            info,
            domain_crosshair,
            range_crosshair,
        }))
    }

    /// Fills the four quadrants around the quadrant origin, both axes permitting.
    fn draw_quadrants(&self, surface: &mut dyn DrawingSurface, data_area: Rect) -> PlotResult<()> {
        let paints = &self.config.quadrant_paints;
        if paints.iter().all(Option::is_none) {
            return Ok(());
        }
        let (Some(domain), Some(range)) = (self.axes.domain_axis(0), self.axes.range_axis(0))
        else {
            return Ok(());
        };
        let domain_edge = self.axes.edge_of(AxisFamily::Domain, 0);
        let range_edge = self.axes.edge_of(AxisFamily::Range, 0);
        let to_x = |value: f64| domain.value_to_device(value, data_area, domain_edge);
        let to_y = |value: f64| range.value_to_device(value, data_area, range_edge);

        let origin = self.config.quadrant_origin;
        let x = domain.range().constrain(origin.x);
        let y = range.range().constrain(origin.y);
        let (x_min, x_max) = (domain.lower_bound(), domain.upper_bound());
        let (y_min, y_max) = (range.lower_bound(), range.upper_bound());
        let (xx, yy) = (to_x(x), to_y(y));

        // (has extent, far domain corner, far range corner) per quadrant
        let quadrants = [
            (x > x_min && y < y_max, to_x(x_min), to_y(y_max)),
            (x < x_max && y < y_max, to_x(x_max), to_y(y_max)),
            (x > x_min && y > y_min, to_x(x_min), to_y(y_min)),
            (x < x_max && y > y_min, to_x(x_max), to_y(y_min)),
        ];

        let original_alpha = surface.composite_alpha();
        let mut alpha_applied = false;
        for (paint, (has_extent, corner_x, corner_y)) in paints.iter().zip(quadrants) {
            let Some(paint) = paint else {
                continue;
            };
            if !has_extent {
                continue;
            }
            let rect = match self.config.orientation {
                PlotOrientation::Vertical => Rect::from_corners(corner_x, corner_y, xx, yy),
                PlotOrientation::Horizontal => Rect::from_corners(corner_y, corner_x, yy, xx),
            };
            if rect.is_empty() {
                continue;
            }
            if !alpha_applied {
                surface.set_composite_alpha(self.config.style.background_alpha)?;
                alpha_applied = true;
            }
            surface.fill_rect(rect, *paint)?;
        }
        if alpha_applied {
            surface.set_composite_alpha(original_alpha)?;
        }
        Ok(())
    }

    fn initial_crosshair(&self, anchor: Option<Point>, data_area: Rect) -> CrosshairState {
        let mut crosshair = CrosshairState::new(false);
        crosshair.set_anchor(anchor);
        if let Some(point) = anchor {
            if let Some(axis) = self.axes.domain_axis(0) {
                let edge = self.axes.edge_of(AxisFamily::Domain, 0);
                crosshair.set_anchor_x(axis.device_to_value(
                    point.coordinate_for_edge(edge),
                    data_area,
                    edge,
                ));
            }
            if let Some(axis) = self.axes.range_axis(0) {
                let edge = self.axes.edge_of(AxisFamily::Range, 0);
                crosshair.set_anchor_y(axis.device_to_value(
                    point.coordinate_for_edge(edge),
                    data_area,
                    edge,
                ));
            }
        }
        crosshair.set_crosshair_x(self.domain_crosshair_value);
        crosshair.set_crosshair_y(self.range_crosshair_value);
        crosshair
    }

    /// Alternating tick bands of the primary axes, beneath the gridlines.
    fn draw_tick_bands(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        axis_states: &IndexMap<AxisKey, AxisState>,
    ) -> PlotResult<()> {
        if let (Some(paint), Some(axis), Some(state)) = (
            self.config.domain_tick_band_paint,
            self.axes.domain_axis(0),
            axis_states.get(&AxisKey::domain(0)),
        ) {
            let edge = self.axes.edge_of(AxisFamily::Domain, 0);
            fill_tick_bands(surface, &axis, &state.ticks, data_area, edge, paint)?;
        }
        if let (Some(paint), Some(axis), Some(state)) = (
            self.config.range_tick_band_paint,
            self.axes.range_axis(0),
            axis_states.get(&AxisKey::range(0)),
        ) {
            let edge = self.axes.edge_of(AxisFamily::Range, 0);
            fill_tick_bands(surface, &axis, &state.ticks, data_area, edge, paint)?;
        }
        Ok(())
    }

    /// Gridlines and zero baselines of the primary axes, from their drawn ticks.
    fn draw_gridlines(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        axis_states: &IndexMap<AxisKey, AxisState>,
    ) -> PlotResult<()> {
        if let Some(axis) = self.axes.domain_axis(0) {
            let edge = self.axes.edge_of(AxisFamily::Domain, 0);
            if let Some(state) = axis_states.get(&AxisKey::domain(0)) {
                draw_tick_gridlines(
                    surface,
                    &axis,
                    &state.ticks,
                    data_area,
                    edge,
                    &self.config.domain_gridlines,
                )?;
            }
            let baseline = self.config.domain_zero_baseline;
            if baseline.visible {
                draw_value_line(surface, &axis, data_area, edge, 0.0, baseline.stroke)?;
            }
        }
        if let Some(axis) = self.axes.range_axis(0) {
            let edge = self.axes.edge_of(AxisFamily::Range, 0);
            if let Some(state) = axis_states.get(&AxisKey::range(0)) {
                draw_tick_gridlines(
                    surface,
                    &axis,
                    &state.ticks,
                    data_area,
                    edge,
                    &self.config.range_gridlines,
                )?;
            }
            let baseline = self.config.range_zero_baseline;
            if baseline.visible {
                draw_value_line(surface, &axis, data_area, edge, 0.0, baseline.stroke)?;
            }
        }
        Ok(())
    }

    /// Markers of every renderer index, drawn by that renderer against the
    /// axes of the same-indexed dataset.
    fn draw_markers(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        layer: Layer,
    ) -> PlotResult<()> {
        for index in self
            .bindings
            .renderer_indices(self.config.dataset_rendering_order)
        {
            let Some(renderer) = self.bindings.renderer(index) else {
                continue;
            };
            let domain_index = self.bindings.axis_for_dataset(AxisFamily::Domain, index);
            if let Some(axis) = self.axes.domain_axis(domain_index) {
                let edge = self.axes.edge_of(AxisFamily::Domain, domain_index);
                for marker in self.domain_markers.markers(index, layer) {
                    renderer.draw_domain_marker(surface, marker, &axis, data_area, edge)?;
                }
            }
            let range_index = self.bindings.axis_for_dataset(AxisFamily::Range, index);
            if let Some(axis) = self.axes.range_axis(range_index) {
                let edge = self.axes.edge_of(AxisFamily::Range, range_index);
                for marker in self.range_markers.markers(index, layer) {
                    renderer.draw_range_marker(surface, marker, &axis, data_area, edge)?;
                }
            }
        }
        Ok(())
    }

    /// Renderer annotations against each renderer's axes, then the plot's
    /// own annotations against the primary axes.
    fn draw_annotations(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        layer: Layer,
    ) -> PlotResult<()> {
        for index in self
            .bindings
            .renderer_indices(self.config.dataset_rendering_order)
        {
            let Some(renderer) = self.bindings.renderer(index) else {
                continue;
            };
            let domain_index = self.bindings.axis_for_dataset(AxisFamily::Domain, index);
            let range_index = self.bindings.axis_for_dataset(AxisFamily::Range, index);
            let (Some(domain), Some(range)) = (
                self.axes.domain_axis(domain_index),
                self.axes.range_axis(range_index),
            ) else {
                continue;
            };
            let context = AnnotationContext {
                data_area,
                orientation: self.config.orientation,
                domain_axis: &*domain,
                domain_edge: self.axes.edge_of(AxisFamily::Domain, domain_index),
                range_axis: &*range,
                range_edge: self.axes.edge_of(AxisFamily::Range, range_index),
            };
            renderer.draw_annotations(surface, &context, layer)?;
        }

        let (Some(domain), Some(range)) = (self.axes.domain_axis(0), self.axes.range_axis(0))
        else {
            return Ok(());
        };
        let context = AnnotationContext {
            data_area,
            orientation: self.config.orientation,
            domain_axis: &*domain,
            domain_edge: self.axes.edge_of(AxisFamily::Domain, 0),
            range_axis: &*range,
            range_edge: self.axes.edge_of(AxisFamily::Range, 0),
        };
        for annotation in self.annotations.iter().filter(|a| a.layer() == layer) {
            annotation.draw(surface, &context)?;
        }
        Ok(())
    }

    /// Draws every pass of one dataset; returns whether it had visible items.
    fn render_dataset(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        dataset_index: usize,
        crosshair: &mut CrosshairState,
        info: &mut PlotRenderingInfo,
    ) -> PlotResult<bool> {
        let Some(dataset) = self.bindings.dataset(dataset_index) else {
            return Ok(false);
        };
        let data = match dataset.read() {
            Ok(data) => data,
            Err(err) => {
                debug!(error = %err, dataset_index, "dataset skipped: not readable");
                return Ok(false);
            }
        };
        if is_empty_xy(&*data) {
            return Ok(false);
        }
        let domain_index = self.bindings.axis_for_dataset(AxisFamily::Domain, dataset_index);
        let range_index = self.bindings.axis_for_dataset(AxisFamily::Range, dataset_index);
        let (Some(domain_axis), Some(range_axis)) = (
            self.axes.domain_axis(domain_index),
            self.axes.range_axis(range_index),
        ) else {
            debug!(dataset_index, "dataset skipped: mapped axis missing");
            return Ok(false);
        };
        let Some(renderer) = self.bindings.renderer_for(dataset_index) else {
            debug!(dataset_index, "dataset skipped: no renderer");
            return Ok(false);
        };

        let context = XyItemContext {
            data_area,
            orientation: self.config.orientation,
            domain_axis: &domain_axis,
            domain_edge: self.axes.edge_of(AxisFamily::Domain, domain_index),
            range_axis: &range_axis,
            range_edge: self.axes.edge_of(AxisFamily::Range, range_index),
            dataset: &*data,
            dataset_index,
        };
        let series_count = data.series_count();
        let series_order: Vec<usize> = match self.config.series_rendering_order {
            SeriesRenderingOrder::Forward => (0..series_count).collect(),
            SeriesRenderingOrder::Reverse => (0..series_count).rev().collect(),
        };

        let mut state = renderer.initialise(&context);
        let pass_count = renderer.pass_count();
        let (lower, upper) = (domain_axis.lower_bound(), domain_axis.upper_bound());
        let mut found_data = false;
        let mut drawn = 0;
        for pass in 0..pass_count {
            state.pass = pass;
            for &series in &series_order {
                let Some((first, last, visible)) = series_window(
                    &*data,
                    series,
                    lower,
                    upper,
                    state.process_visible_items_only,
                ) else {
                    continue;
                };
                found_data |= visible;
                state.first_item = first;
                state.last_item = last;
                renderer.start_series_pass(&mut state, &context, series);
                for item in first..=last {
                    renderer.draw_item(surface, &mut state, &context, series, item, crosshair)?;
                    drawn += 1;
                }
                renderer.end_series_pass(surface, &mut state, &context, series)?;
            }
        }
        info.record_items(dataset_index, drawn);
        trace!(dataset_index, pass_count, items = drawn, "dataset rendered");
        Ok(found_data)
    }

    /// Settles the final crosshair values and draws the visible crosshairs.
    ///
    /// A family not locked onto data takes the value under the anchor,
    /// read through the axes of the dataset that produced the closest item.
    fn resolve_crosshairs(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        anchor: Option<Point>,
        crosshair: &mut CrosshairState,
    ) -> PlotResult<(f64, f64)> {
        let dataset_index = crosshair.dataset_index();

        let domain_index = self.bindings.axis_for_dataset(AxisFamily::Domain, dataset_index);
        let domain_axis = self.axes.domain_axis(domain_index);
        let domain_edge = self.axes.edge_of(AxisFamily::Domain, domain_index);
        let domain_config = self.config.domain_crosshair;
        if let (Some(axis), Some(point), false) =
            (&domain_axis, anchor, domain_config.lock_on_data)
        {
            crosshair.set_crosshair_x(axis.device_to_value(
                point.coordinate_for_edge(domain_edge),
                data_area,
                domain_edge,
            ));
        }
        let domain_value = crosshair.crosshair_x();
        if let (Some(axis), true) = (&domain_axis, domain_config.visible) {
            draw_value_line(surface, axis, data_area, domain_edge, domain_value, domain_config.stroke)?;
        }

        let range_index = self.bindings.axis_for_dataset(AxisFamily::Range, dataset_index);
        let range_axis = self.axes.range_axis(range_index);
        let range_edge = self.axes.edge_of(AxisFamily::Range, range_index);
        let range_config = self.config.range_crosshair;
        if let (Some(axis), Some(point), false) = (&range_axis, anchor, range_config.lock_on_data) {
            crosshair.set_crosshair_y(axis.device_to_value(
                point.coordinate_for_edge(range_edge),
                data_area,
                range_edge,
            ));
        }
        let range_value = crosshair.crosshair_y();
        if let (Some(axis), true) = (&range_axis, range_config.visible) {
            draw_value_line(surface, axis, data_area, range_edge, range_value, range_config.stroke)?;
        }

        Ok((domain_value, range_value))
    }
}
