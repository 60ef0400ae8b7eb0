use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::api::crosshair::CrosshairState;
use crate::api::layout::LayoutEngine;
use crate::api::plot::{
    draw_no_data_message, draw_outline, draw_tick_gridlines, draw_value_line, fill_background,
    line_across,
};
use crate::api::renderer::CategoryItemContext;
use crate::core::{
    AnnotationContext, AxisFamily, AxisKey, AxisState, Layer, Point, Rect, SortOrder,
    is_empty_category,
};
use crate::error::PlotResult;
use crate::interaction::{DrawPhase, PlotRenderingInfo};
use crate::render::{DrawingSurface, ShadowGenerator};

use super::CategoryPlot;

struct DrawOutcome {
    info: PlotRenderingInfo,
    crosshair: CrosshairState,
}

fn ordered(count: usize, order: SortOrder) -> Vec<usize> {
    match order {
        SortOrder::Ascending => (0..count).collect(),
        SortOrder::Descending => (0..count).rev().collect(),
    }
}

impl CategoryPlot {
    /// Runs one full draw. The crosshair item found while drawing replaces the
    /// stored crosshair keys, dataset index and range value without notifying.
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
        let crosshair = outcome.crosshair;
        self.crosshair_dataset_index = crosshair.dataset_index();
        self.domain_crosshair_row_key = crosshair.row_key().map(str::to_owned);
        self.domain_crosshair_column_key = crosshair.column_key().map(str::to_owned);
        self.range_crosshair_value = crosshair.crosshair_y();
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
                "category plot not drawn: no room for a data area"
            );
            return Ok(None);
        };
        let data_area = layout.data_area;
        let style = &self.config.style;
        let mut info = PlotRenderingInfo::new(layout.plot_area, data_area);

        info.enter(DrawPhase::Background);
        fill_background(surface, data_area, style)?;

        info.enter(DrawPhase::Axes);
        let axis_states = engine.draw_axes(&self.axes, surface, layout.plot_area, data_area)?;

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
            width = data_area.width,
            height = data_area.height,
            items = info.total_items_drawn(),
            found_data,
            "category plot drawn"
        );
        Ok(Some(DrawOutcome { info, crosshair }))
    }

    fn initial_crosshair(&self, anchor: Option<Point>, data_area: Rect) -> CrosshairState {
        let mut crosshair = CrosshairState::new(false);
        crosshair.set_anchor(anchor);
        if let (Some(point), Some(axis)) = (anchor, self.axes.range_axis(0)) {
            let edge = self.axes.edge_of(AxisFamily::Range, 0);
            crosshair.set_anchor_y(axis.device_to_value(
                point.coordinate_for_edge(edge),
                data_area,
                edge,
            ));
        }
        crosshair.set_category_keys(
            self.domain_crosshair_row_key.clone(),
            self.domain_crosshair_column_key.clone(),
        );
        crosshair.set_crosshair_y(self.range_crosshair_value);
        crosshair
    }

    /// Category gridlines at the configured slot position, then range
    /// gridlines and the zero baseline.
    fn draw_gridlines(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        axis_states: &IndexMap<AxisKey, AxisState>,
    ) -> PlotResult<()> {
        let gridlines = self.config.domain_gridlines;
        if let (true, Some(axis)) = (gridlines.visible, self.axes.domain_axis(0)) {
            let edge = self.axes.edge_of(AxisFamily::Domain, 0);
            let count = axis.categories().len();
            for category in 0..count {
                let coordinate = axis.category_coordinate(
                    self.config.domain_gridline_position,
                    category,
                    count,
                    data_area,
                    edge,
                );
                surface.draw_line(line_across(data_area, edge, coordinate, gridlines.stroke))?;
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

    /// Draws one dataset column by column; returns whether it held any data.
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
        if is_empty_category(&*data) {
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

        let context = CategoryItemContext {
            data_area,
            orientation: self.config.orientation,
            domain_axis: &domain_axis,
            domain_edge: self.axes.edge_of(AxisFamily::Domain, domain_index),
            range_axis: &range_axis,
            range_edge: self.axes.edge_of(AxisFamily::Range, range_index),
            dataset: &*data,
            dataset_index,
        };
        let columns = ordered(data.column_count(), self.config.column_rendering_order);
        let rows = ordered(data.row_count(), self.config.row_rendering_order);

        let mut state = renderer.initialise(&context);
        let pass_count = renderer.pass_count();
        let mut drawn = 0;
        for pass in 0..pass_count {
            state.pass = pass;
            for &column in &columns {
                for &row in &rows {
                    renderer.draw_item(surface, &mut state, &context, row, column, crosshair)?;
                    drawn += 1;
                }
            }
        }
        info.record_items(dataset_index, drawn);
        trace!(dataset_index, pass_count, items = drawn, "dataset rendered");
        Ok(true)
    }

    /// Draws the domain crosshair at the middle of the chosen item and the
    /// range crosshair at its settled value.
    fn resolve_crosshairs(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        anchor: Option<Point>,
        crosshair: &mut CrosshairState,
    ) -> PlotResult<()> {
        let dataset_index = crosshair.dataset_index();

        let domain_config = self.config.domain_crosshair;
        if domain_config.visible {
            self.draw_domain_crosshair(surface, data_area, dataset_index, crosshair)?;
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
        if let (Some(axis), true) = (&range_axis, range_config.visible) {
            draw_value_line(
                surface,
                axis,
                data_area,
                range_edge,
                crosshair.crosshair_y(),
                range_config.stroke,
            )?;
        }
        Ok(())
    }

    fn draw_domain_crosshair(
        &self,
        surface: &mut dyn DrawingSurface,
        data_area: Rect,
        dataset_index: usize,
        crosshair: &CrosshairState,
    ) -> PlotResult<()> {
        let (Some(row_key), Some(column_key)) = (crosshair.row_key(), crosshair.column_key())
        else {
            return Ok(());
        };
        let (Some(dataset), Some(renderer)) = (
            self.bindings.dataset(dataset_index),
            self.bindings.renderer_for(dataset_index),
        ) else {
            return Ok(());
        };
        let domain_index = self.bindings.axis_for_dataset(AxisFamily::Domain, dataset_index);
        let Some(axis) = self.axes.domain_axis(domain_index) else {
            return Ok(());
        };
        let data = dataset.read()?;
        let (Some(row), Some(column)) = (data.row_index(row_key), data.column_index(column_key))
        else {
            return Ok(());
        };
        let edge = self.axes.edge_of(AxisFamily::Domain, domain_index);
        let coordinate = renderer.item_middle(row, column, &*data, &axis, data_area, edge);
        surface.draw_line(line_across(
            data_area,
            edge,
            coordinate,
            self.config.domain_crosshair.stroke,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_order_reverses_indices() {
        assert_eq!(ordered(3, SortOrder::Ascending), vec![0, 1, 2]);
        assert_eq!(ordered(3, SortOrder::Descending), vec![2, 1, 0]);
        assert!(ordered(0, SortOrder::Descending).is_empty());
    }
}
