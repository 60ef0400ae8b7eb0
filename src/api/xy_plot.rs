use std::rc::Rc;

use tracing::debug;

use crate::api::axis_registry::AxisRegistry;
use crate::api::change::{PlotChangeEvent, PlotLink};
use crate::api::config::{XyPlotConfig, validate_weight};
use crate::api::dataset_binding::DatasetBinding;
use crate::api::plot::combine_annotation_bounds;
use crate::api::renderer::{LegendItem, XyItemRenderer};
use crate::api::shared_dataset::SharedXyDataset;
use crate::api::snapshot::{AxisSnapshot, CrosshairSnapshot, PlotSnapshot};
use crate::core::{
    Annotation, AxisFamily, AxisLocation, Layer, Marker, MarkerSet, ValueAxis, ValueRange,
    XyDataset, find_domain_bounds, find_range_bounds,
};
use crate::error::PlotResult;
use crate::interaction::PlotRenderingInfo;

/// Plot of XY datasets against numeric domain and range axes.
///
/// Axes, datasets and renderers live in sparse index-keyed slots. Dataset
/// `i` is drawn by renderer `i` (or renderer 0) against the first domain and
/// range axis it is mapped to. Every mutator publishes a [`PlotChangeEvent`]
/// through the plot's [`PlotLink`].
#[derive(Debug)]
pub struct XyPlot {
    pub(super) link: PlotLink,
    pub(super) config: XyPlotConfig,
    pub(super) axes: AxisRegistry<ValueAxis, ValueAxis>,
    pub(super) bindings: DatasetBinding<dyn XyDataset, dyn XyItemRenderer>,
    pub(super) domain_markers: MarkerSet,
    pub(super) range_markers: MarkerSet,
    pub(super) annotations: Vec<Box<dyn Annotation>>,
    pub(super) domain_crosshair_value: f64,
    pub(super) range_crosshair_value: f64,
    pub(super) rendering_info: Option<PlotRenderingInfo>,
    pub(super) fixed_legend_items: Option<Vec<LegendItem>>,
}

impl Default for XyPlot {
    fn default() -> Self {
        Self::from_valid_config(XyPlotConfig::default())
    }
}

impl Drop for XyPlot {
    fn drop(&mut self) {
        self.bindings.release(&self.link);
    }
}

impl XyPlot {
    /// Plot with the default configuration and no axes, datasets or renderers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: XyPlotConfig) -> PlotResult<Self> {
        Ok(Self::from_valid_config(config.validate()?))
    }

    fn from_valid_config(config: XyPlotConfig) -> Self {
        Self {
            link: PlotLink::new(),
            axes: AxisRegistry::new(config.orientation),
            config,
            bindings: DatasetBinding::new(),
            domain_markers: MarkerSet::default(),
            range_markers: MarkerSet::default(),
            annotations: Vec::new(),
            domain_crosshair_value: 0.0,
            range_crosshair_value: 0.0,
            rendering_info: None,
            fixed_legend_items: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &XyPlotConfig {
        &self.config
    }

    /// Replaces the whole configuration after validating it.
    pub fn set_config(&mut self, config: XyPlotConfig) -> PlotResult<()> {
        let config = config.validate()?;
        self.axes.set_orientation(config.orientation);
        self.config = config;
        self.link.publish(PlotChangeEvent::General)
    }

    #[must_use]
    pub fn weight(&self) -> u32 {
        self.config.weight
    }

    /// Relative share of space when this plot is stacked with siblings.
    pub fn set_weight(&mut self, weight: u32) -> PlotResult<()> {
        validate_weight(weight)?;
        self.config.weight = weight;
        self.link.publish(PlotChangeEvent::General)
    }

    /// Links this plot under `parent`: events propagate upward and axis
    /// lookups missing here fall back to the parent's axes.
    pub fn set_parent(&self, parent: Option<&XyPlot>) -> PlotResult<()> {
        self.link.set_parent(parent.map(|parent| &parent.link))?;
        self.axes.set_parent(parent.map(|parent| &parent.axes));
        Ok(())
    }

    // axes

    /// Axis at `index`, falling back to the parent chain.
    #[must_use]
    pub fn axis(&self, family: AxisFamily, index: usize) -> Option<Rc<ValueAxis>> {
        self.refresh_axes();
        match family {
            AxisFamily::Domain => self.axes.domain_axis(index),
            AxisFamily::Range => self.axes.range_axis(index),
        }
    }

    #[must_use]
    pub fn domain_axis(&self, index: usize) -> Option<Rc<ValueAxis>> {
        self.axis(AxisFamily::Domain, index)
    }

    #[must_use]
    pub fn range_axis(&self, index: usize) -> Option<Rc<ValueAxis>> {
        self.axis(AxisFamily::Range, index)
    }

    /// Replaces the local axis at `index` and configures the new one against
    /// the datasets mapped to it; returns the detached previous axis.
    pub fn set_axis(
        &mut self,
        family: AxisFamily,
        index: usize,
        axis: Option<ValueAxis>,
    ) -> PlotResult<Option<Rc<ValueAxis>>> {
        let previous = match family {
            AxisFamily::Domain => self.axes.set_domain_axis(index, axis),
            AxisFamily::Range => self.axes.set_range_axis(index, axis),
        };
        debug!(?family, axis_index = index, "axis slot replaced");
        self.configure_axis(family, index);
        self.link.publish(PlotChangeEvent::AxisChanged { family, index })?;
        Ok(previous)
    }

    /// Mutates the local axis at `index`, re-runs auto-ranging when it is on,
    /// and publishes the change. `None` when no local axis sits there.
    pub fn update_axis<T>(
        &mut self,
        family: AxisFamily,
        index: usize,
        mutate: impl FnOnce(&mut ValueAxis) -> T,
    ) -> PlotResult<Option<T>> {
        let result = match family {
            AxisFamily::Domain => self.axes.update_domain_axis(index, mutate),
            AxisFamily::Range => self.axes.update_range_axis(index, mutate),
        };
        if result.is_none() {
            return Ok(None);
        }
        self.configure_axis(family, index);
        self.link.publish(PlotChangeEvent::AxisChanged { family, index })?;
        Ok(result)
    }

    /// Index of `axis` by identity, searching the parent chain too.
    #[must_use]
    pub fn axis_index(&self, family: AxisFamily, axis: &Rc<ValueAxis>) -> Option<usize> {
        match family {
            AxisFamily::Domain => self.axes.domain_axis_index(axis),
            AxisFamily::Range => self.axes.range_axis_index(axis),
        }
    }

    #[must_use]
    pub fn axis_location(&self, family: AxisFamily, index: usize) -> AxisLocation {
        self.axes.location_of(family, index)
    }

    pub fn set_axis_location(
        &mut self,
        family: AxisFamily,
        index: usize,
        location: Option<AxisLocation>,
    ) -> PlotResult<()> {
        self.axes.set_location(family, index, location)?;
        self.link.publish(PlotChangeEvent::AxisChanged { family, index })
    }

    #[must_use]
    pub fn axis_registry(&self) -> &AxisRegistry<ValueAxis, ValueAxis> {
        &self.axes
    }

    // datasets and renderers

    #[must_use]
    pub fn dataset(&self, index: usize) -> Option<&SharedXyDataset> {
        self.bindings.dataset(index)
    }

    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.bindings.dataset_count()
    }

    #[must_use]
    pub fn index_of_dataset(&self, dataset: &SharedXyDataset) -> Option<usize> {
        self.bindings.index_of_dataset(dataset)
    }

    /// Replaces the dataset at `index`, moves the change subscription and
    /// reconfigures every axis; returns the previous dataset.
    pub fn set_dataset(
        &mut self,
        index: usize,
        dataset: Option<SharedXyDataset>,
    ) -> PlotResult<Option<SharedXyDataset>> {
        let previous = self.bindings.set_dataset(index, dataset, &self.link);
        self.dataset_changed(index)?;
        Ok(previous)
    }

    /// Maps dataset `dataset_index` to the axes of `family`; `None` restores
    /// the default mapping to axis 0.
    pub fn map_dataset_to_axes(
        &mut self,
        family: AxisFamily,
        dataset_index: usize,
        axis_indices: Option<&[usize]>,
    ) -> PlotResult<()> {
        self.bindings
            .map_to_axes(family, dataset_index, axis_indices)?;
        self.dataset_changed(dataset_index)
    }

    /// Axis of `family` the dataset's coordinates are converted through.
    #[must_use]
    pub fn axis_index_for_dataset(&self, family: AxisFamily, dataset_index: usize) -> usize {
        self.bindings.axis_for_dataset(family, dataset_index)
    }

    #[must_use]
    pub fn renderer(&self, index: usize) -> Option<&dyn XyItemRenderer> {
        self.bindings.renderer(index)
    }

    /// Renderer drawing `dataset_index`, falling back to renderer 0.
    #[must_use]
    pub fn renderer_for_dataset(&self, dataset_index: usize) -> Option<&dyn XyItemRenderer> {
        self.bindings.renderer_for(dataset_index)
    }

    pub fn set_renderer(
        &mut self,
        index: usize,
        renderer: Option<Box<dyn XyItemRenderer>>,
    ) -> PlotResult<Option<Box<dyn XyItemRenderer>>> {
        let previous = self.bindings.set_renderer(index, renderer);
        self.configure_axes();
        self.link.publish(PlotChangeEvent::RendererChanged { index })?;
        Ok(previous)
    }

    /// Mutates the renderer at `index` and publishes the change.
    pub fn update_renderer<T>(
        &mut self,
        index: usize,
        mutate: impl FnOnce(&mut dyn XyItemRenderer) -> T,
    ) -> PlotResult<Option<T>> {
        let result = match self.bindings.renderer_mut(index) {
            Some(renderer) => mutate(renderer),
            None => return Ok(None),
        };
        self.configure_axes();
        self.link.publish(PlotChangeEvent::RendererChanged { index })?;
        Ok(Some(result))
    }

    // auto-range

    /// Union of the bounds of every dataset mapped to the axis, widened by
    /// qualifying annotations; `None` when nothing contributes.
    #[must_use]
    pub fn data_range(&self, family: AxisFamily, axis_index: usize) -> Option<ValueRange> {
        let mut result = None;
        for dataset_index in self.bindings.datasets_mapped_to_axis(family, axis_index) {
            let Some(dataset) = self.bindings.dataset(dataset_index) else {
                continue;
            };
            let data = match dataset.read() {
                Ok(data) => data,
                Err(err) => {
                    debug!(error = %err, dataset_index, "dataset skipped in range query");
                    continue;
                }
            };
            let renderer = self.bindings.renderer_for(dataset_index);
            let bounds = match (renderer, family) {
                (Some(renderer), AxisFamily::Domain) => renderer.find_domain_bounds(&*data),
                (Some(renderer), AxisFamily::Range) => renderer.find_range_bounds(&*data),
                (None, AxisFamily::Domain) => find_domain_bounds(&*data),
                (None, AxisFamily::Range) => find_range_bounds(&*data),
            };
            result = ValueRange::combine(result, bounds);
            if let Some(renderer) = renderer {
                result = combine_annotation_bounds(result, renderer.annotations(), family);
            }
        }
        if axis_index == 0 {
            result = combine_annotation_bounds(result, &self.annotations, family);
        }
        result
    }

    pub(super) fn configure_axis(&self, family: AxisFamily, index: usize) {
        let range = self.data_range(family, index);
        match family {
            AxisFamily::Domain => self.axes.update_domain_axis(index, |axis| axis.configure(range)),
            AxisFamily::Range => self.axes.update_range_axis(index, |axis| axis.configure(range)),
        };
    }

    pub(super) fn configure_axes(&self) {
        for family in [AxisFamily::Domain, AxisFamily::Range] {
            for index in self.axes.axis_indices(family) {
                self.configure_axis(family, index);
            }
        }
    }

    /// Reconfigures the axes when a shared dataset changed since the last look.
    pub(super) fn refresh_axes(&self) {
        if self.link.take_axes_stale() {
            self.configure_axes();
        }
    }

    fn dataset_changed(&self, index: usize) -> PlotResult<()> {
        self.configure_axes();
        let published = self.link.publish(PlotChangeEvent::DatasetChanged { index });
        self.link.take_axes_stale();
        published
    }

    // markers and annotations

    fn marker_set(&self, family: AxisFamily) -> &MarkerSet {
        match family {
            AxisFamily::Domain => &self.domain_markers,
            AxisFamily::Range => &self.range_markers,
        }
    }

    fn marker_set_mut(&mut self, family: AxisFamily) -> &mut MarkerSet {
        match family {
            AxisFamily::Domain => &mut self.domain_markers,
            AxisFamily::Range => &mut self.range_markers,
        }
    }

    /// Markers of `family` drawn by renderer `index` in `layer`.
    #[must_use]
    pub fn markers(&self, family: AxisFamily, index: usize, layer: Layer) -> &[Marker] {
        self.marker_set(family).markers(index, layer)
    }

    pub fn add_marker(
        &mut self,
        family: AxisFamily,
        index: usize,
        marker: Marker,
        layer: Layer,
    ) -> PlotResult<()> {
        self.marker_set_mut(family).add(index, marker, layer)?;
        self.link.publish(PlotChangeEvent::MarkerChanged)
    }

    /// Removes the first equal marker; publishes only when one was removed.
    pub fn remove_marker(
        &mut self,
        family: AxisFamily,
        index: usize,
        marker: &Marker,
        layer: Layer,
    ) -> PlotResult<bool> {
        let removed = self.marker_set_mut(family).remove(index, marker, layer);
        if removed {
            self.link.publish(PlotChangeEvent::MarkerChanged)?;
        }
        Ok(removed)
    }

    /// Clears the markers of one renderer index, or all of them.
    pub fn clear_markers(&mut self, family: AxisFamily, index: Option<usize>) -> PlotResult<()> {
        let markers = self.marker_set_mut(family);
        match index {
            Some(index) => markers.clear_index(index),
            None => markers.clear(),
        }
        self.link.publish(PlotChangeEvent::MarkerChanged)
    }

    #[must_use]
    pub fn annotations(&self) -> &[Box<dyn Annotation>] {
        &self.annotations
    }

    pub fn add_annotation(&mut self, annotation: Box<dyn Annotation>) -> PlotResult<()> {
        let widens = annotation.include_in_data_bounds();
        self.annotations.push(annotation);
        if widens {
            self.configure_axes();
        }
        self.link.publish(PlotChangeEvent::AnnotationChanged)
    }

    pub fn remove_annotation(&mut self, position: usize) -> PlotResult<Option<Box<dyn Annotation>>> {
        if position >= self.annotations.len() {
            return Ok(None);
        }
        let removed = self.annotations.remove(position);
        if removed.include_in_data_bounds() {
            self.configure_axes();
        }
        self.link.publish(PlotChangeEvent::AnnotationChanged)?;
        Ok(Some(removed))
    }

    pub fn clear_annotations(&mut self) -> PlotResult<()> {
        self.annotations.clear();
        self.configure_axes();
        self.link.publish(PlotChangeEvent::AnnotationChanged)
    }

    // crosshairs

    #[must_use]
    pub fn crosshair_value(&self, family: AxisFamily) -> f64 {
        match family {
            AxisFamily::Domain => self.domain_crosshair_value,
            AxisFamily::Range => self.range_crosshair_value,
        }
    }

    /// Sets the crosshair value; listeners only hear about it while the
    /// crosshair is visible.
    pub fn set_crosshair_value(&mut self, family: AxisFamily, value: f64) -> PlotResult<()> {
        let visible = match family {
            AxisFamily::Domain => {
                self.domain_crosshair_value = value;
                self.config.domain_crosshair.visible
            }
            AxisFamily::Range => {
                self.range_crosshair_value = value;
                self.config.range_crosshair.visible
            }
        };
        if visible {
            self.link.publish(PlotChangeEvent::CrosshairChanged)?;
        }
        Ok(())
    }

    pub fn set_crosshair_visible(&mut self, family: AxisFamily, visible: bool) -> PlotResult<()> {
        match family {
            AxisFamily::Domain => self.config.domain_crosshair.visible = visible,
            AxisFamily::Range => self.config.range_crosshair.visible = visible,
        }
        self.link.publish(PlotChangeEvent::CrosshairChanged)
    }

    pub fn set_crosshair_locked_on_data(
        &mut self,
        family: AxisFamily,
        locked: bool,
    ) -> PlotResult<()> {
        match family {
            AxisFamily::Domain => self.config.domain_crosshair.lock_on_data = locked,
            AxisFamily::Range => self.config.range_crosshair.lock_on_data = locked,
        }
        self.link.publish(PlotChangeEvent::CrosshairChanged)
    }

    /// Legend entries used instead of the renderers' own, if set.
    #[must_use]
    pub fn fixed_legend_items(&self) -> Option<&[LegendItem]> {
        self.fixed_legend_items.as_deref()
    }

    pub fn set_fixed_legend_items(&mut self, items: Option<Vec<LegendItem>>) -> PlotResult<()> {
        self.fixed_legend_items = items;
        self.link.publish(PlotChangeEvent::General)
    }

    // copies and views

    /// Independent copy: axes, renderers, markers and annotations are deep
    /// copies, datasets are shared and subscribed for the copy. The copy has
    /// no listeners and no parent.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let link = PlotLink::new();
        link.set_notify(self.link.is_notify());
        link.set_accepts_renderer_changes(self.link.accepts_renderer_changes());
        let bindings = self.bindings.duplicate(&link, |renderer| renderer.clone_box());
        Self {
            axes: self.axes.duplicate(),
            config: self.config.clone(),
            bindings,
            domain_markers: self.domain_markers.clone(),
            range_markers: self.range_markers.clone(),
            annotations: self.annotations.clone(),
            domain_crosshair_value: self.domain_crosshair_value,
            range_crosshair_value: self.range_crosshair_value,
            rendering_info: None,
            fixed_legend_items: self.fixed_legend_items.clone(),
            link,
        }
    }

    pub(super) fn build_legend_items(&self) -> Vec<LegendItem> {
        if let Some(fixed) = &self.fixed_legend_items {
            return fixed.clone();
        }
        let mut items = Vec::new();
        for dataset_index in self
            .bindings
            .dataset_indices(self.config.dataset_rendering_order)
        {
            let (Some(dataset), Some(renderer)) = (
                self.bindings.dataset(dataset_index),
                self.bindings.renderer_for(dataset_index),
            ) else {
                continue;
            };
            let Ok(data) = dataset.read() else {
                continue;
            };
            items.extend(
                (0..data.series_count())
                    .filter(|series| renderer.is_series_visible_in_legend(*series))
                    .filter_map(|series| renderer.legend_item(&*data, dataset_index, series)),
            );
        }
        items
    }

    pub(super) fn build_snapshot(&self) -> PlotSnapshot {
        self.refresh_axes();
        let mut axes = Vec::new();
        for family in [AxisFamily::Domain, AxisFamily::Range] {
            for index in self.axes.axis_indices(family) {
                let axis = match family {
                    AxisFamily::Domain => self.axes.domain_axis(index),
                    AxisFamily::Range => self.axes.range_axis(index),
                };
                let Some(axis) = axis else {
                    continue;
                };
                axes.push(AxisSnapshot {
                    family,
                    index,
                    edge: self.axes.edge_of(family, index),
                    range: Some(axis.range()),
                    categories: Vec::new(),
                    auto_range: axis.is_auto_range(),
                });
            }
        }
        PlotSnapshot {
            orientation: self.config.orientation,
            data_area: self.rendering_info.as_ref().map(|info| info.data_area),
            axes,
            dataset_count: self.bindings.dataset_count(),
            domain_crosshair: CrosshairSnapshot {
                visible: self.config.domain_crosshair.visible,
                value: self.domain_crosshair_value,
                category: None,
            },
            range_crosshair: CrosshairSnapshot {
                visible: self.config.range_crosshair.visible,
                value: self.range_crosshair_value,
                category: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::change::test_support::EventLog;
    use crate::api::line_renderer::XyLineRenderer;
    use crate::api::shared_dataset::SharedDataset;
    use crate::core::{DataPoint, TextAnnotation, XySeries, XySeriesCollection};

    fn dataset(points: &[(f64, f64)]) -> SharedXyDataset {
        let points = points.iter().map(|(x, y)| DataPoint::new(*x, *y)).collect();
        SharedDataset::new(XySeriesCollection::new().with_series(XySeries::from_points("s", points)))
            .as_xy()
    }

    fn plot() -> XyPlot {
        let mut plot = XyPlot::new();
        plot.set_axis(AxisFamily::Domain, 0, Some(ValueAxis::new()))
            .expect("domain");
        plot.set_axis(AxisFamily::Range, 0, Some(ValueAxis::new()))
            .expect("range");
        plot.set_renderer(0, Some(Box::new(XyLineRenderer::new())))
            .expect("renderer");
        plot
    }

    #[test]
    fn data_range_unions_mapped_datasets() {
        let mut plot = plot();
        plot.set_dataset(0, Some(dataset(&[(1.0, 10.0), (2.0, 20.0)])))
            .expect("d0");
        plot.set_dataset(1, Some(dataset(&[(1.0, 5.0), (2.0, 25.0)])))
            .expect("d1");
        let range = plot.data_range(AxisFamily::Range, 0).expect("range");
        assert_eq!((range.lower(), range.upper()), (5.0, 25.0));
        assert!(plot.data_range(AxisFamily::Range, 1).is_none());
    }

    #[test]
    fn included_plot_annotations_widen_axis_zero_only() {
        let mut plot = plot();
        plot.set_dataset(0, Some(dataset(&[(1.0, 1.0), (2.0, 2.0)])))
            .expect("dataset");
        plot.add_annotation(Box::new(
            TextAnnotation::new("peak", 5.0, 9.0)
                .expect("annotation")
                .with_include_in_bounds(true),
        ))
        .expect("add");
        let range = plot.data_range(AxisFamily::Range, 0).expect("range");
        assert_eq!(range.upper(), 9.0);
    }

    #[test]
    fn shared_dataset_updates_reconfigure_lazily() {
        let mut plot = plot();
        let data = SharedDataset::new(XySeriesCollection::new().with_series(XySeries::from_points(
            "s",
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)],
        )));
        plot.set_dataset(0, Some(data.as_xy())).expect("dataset");
        let before = plot.range_axis(0).expect("axis").range();
        data.update(|collection| {
            collection.add_series(XySeries::from_points("t", vec![DataPoint::new(0.0, 100.0)]))
        })
        .expect("update")
        .expect("series");
        let after = plot.range_axis(0).expect("axis").range();
        assert!(after.upper() > before.upper());
        assert!(after.upper() >= 100.0);
    }

    #[test]
    fn hidden_crosshair_values_change_silently() {
        let mut plot = plot();
        let (log, events) = EventLog::new("log");
        plot.link.add_listener(Box::new(log)).expect("listener");
        plot.set_crosshair_value(AxisFamily::Domain, 3.0).expect("set");
        assert!(events.borrow().is_empty());
        plot.set_crosshair_visible(AxisFamily::Domain, true)
            .expect("visible");
        plot.set_crosshair_value(AxisFamily::Domain, 4.0).expect("set");
        assert_eq!(events.borrow().len(), 2);
        assert_eq!(plot.crosshair_value(AxisFamily::Domain), 4.0);
    }

    #[test]
    fn duplicate_shares_datasets_but_not_axes() {
        let mut plot = plot();
        let data = dataset(&[(1.0, 1.0), (2.0, 3.0)]);
        plot.set_dataset(0, Some(data.clone())).expect("dataset");
        let copy = plot.duplicate();
        assert!(copy.dataset(0).expect("shared").ptr_eq(&data));
        assert_eq!(data.subscriber_count(), 2);
        plot.update_axis(AxisFamily::Domain, 0, |axis| axis.set_inverted(true))
            .expect("update");
        assert!(!copy.domain_axis(0).expect("axis").is_inverted());
    }

    #[test]
    fn fixed_legend_items_replace_the_renderer_entries() {
        let mut plot = plot();
        plot.set_dataset(0, Some(dataset(&[(1.0, 1.0), (2.0, 3.0)])))
            .expect("dataset");
        assert_eq!(plot.build_legend_items().len(), 1);

        let (log, events) = EventLog::new("log");
        plot.link.add_listener(Box::new(log)).expect("listener");
        let fixed = vec![LegendItem {
            label: "Total".to_owned(),
            color: crate::render::Color::RED,
            dataset_index: 0,
            series_index: 0,
        }];
        plot.set_fixed_legend_items(Some(fixed.clone())).expect("fixed");
        assert_eq!(events.borrow().as_slice(), &[PlotChangeEvent::General]);
        assert_eq!(plot.build_legend_items(), fixed);
        assert_eq!(plot.duplicate().fixed_legend_items(), Some(fixed.as_slice()));

        plot.set_fixed_legend_items(None).expect("clear");
        assert_eq!(plot.build_legend_items()[0].label, "s");
    }
}
