use std::rc::Rc;

use indexmap::IndexSet;
use tracing::debug;

use crate::api::axis_registry::AxisRegistry;
use crate::api::change::{PlotChangeEvent, PlotLink};
use crate::api::config::{CategoryPlotConfig, validate_weight};
use crate::api::dataset_binding::DatasetBinding;
use crate::api::plot::combine_annotation_bounds;
use crate::api::renderer::{CategoryItemRenderer, LegendItem};
use crate::api::shared_dataset::SharedCategoryDataset;
use crate::api::snapshot::{AxisSnapshot, CrosshairSnapshot, PlotSnapshot};
use crate::core::{
    Annotation, AxisFamily, AxisLocation, CategoryAxis, CategoryDataset, Layer, Marker,
    MarkerSet, ValueAxis, ValueRange, find_category_range_bounds,
};
use crate::error::PlotResult;
use crate::interaction::PlotRenderingInfo;

/// Plot of category datasets: category slots along the domain, values along
/// the range.
///
/// Shares the slot model of [`crate::api::XyPlot`]; domain axes are
/// [`CategoryAxis`] instances whose categories are the column keys of the
/// datasets mapped to them, in first-seen order.
#[derive(Debug)]
pub struct CategoryPlot {
    pub(super) link: PlotLink,
    pub(super) config: CategoryPlotConfig,
    pub(super) axes: AxisRegistry<CategoryAxis, ValueAxis>,
    pub(super) bindings: DatasetBinding<dyn CategoryDataset, dyn CategoryItemRenderer>,
    pub(super) domain_markers: MarkerSet,
    pub(super) range_markers: MarkerSet,
    pub(super) annotations: Vec<Box<dyn Annotation>>,
    pub(super) anchor_value: f64,
    pub(super) range_crosshair_value: f64,
    pub(super) domain_crosshair_row_key: Option<String>,
    pub(super) domain_crosshair_column_key: Option<String>,
    pub(super) crosshair_dataset_index: usize,
    pub(super) rendering_info: Option<PlotRenderingInfo>,
    pub(super) fixed_legend_items: Option<Vec<LegendItem>>,
}

impl Default for CategoryPlot {
    fn default() -> Self {
        Self::from_valid_config(CategoryPlotConfig::default())
    }
}

impl Drop for CategoryPlot {
    fn drop(&mut self) {
        self.bindings.release(&self.link);
    }
}

impl CategoryPlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CategoryPlotConfig) -> PlotResult<Self> {
        Ok(Self::from_valid_config(config.validate()?))
    }

    fn from_valid_config(config: CategoryPlotConfig) -> Self {
        Self {
            link: PlotLink::new(),
            axes: AxisRegistry::new(config.orientation),
            config,
            bindings: DatasetBinding::new(),
            domain_markers: MarkerSet::default(),
            range_markers: MarkerSet::default(),
            annotations: Vec::new(),
            anchor_value: 0.0,
            range_crosshair_value: 0.0,
            domain_crosshair_row_key: None,
            domain_crosshair_column_key: None,
            crosshair_dataset_index: 0,
            rendering_info: None,
            fixed_legend_items: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CategoryPlotConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CategoryPlotConfig) -> PlotResult<()> {
        let config = config.validate()?;
        self.axes.set_orientation(config.orientation);
        self.config = config;
        self.link.publish(PlotChangeEvent::General)
    }

    #[must_use]
    pub fn weight(&self) -> u32 {
        self.config.weight
    }

    pub fn set_weight(&mut self, weight: u32) -> PlotResult<()> {
        validate_weight(weight)?;
        self.config.weight = weight;
        self.link.publish(PlotChangeEvent::General)
    }

    pub fn set_parent(&self, parent: Option<&CategoryPlot>) -> PlotResult<()> {
        self.link.set_parent(parent.map(|parent| &parent.link))?;
        self.axes.set_parent(parent.map(|parent| &parent.axes));
        Ok(())
    }

    // axes

    #[must_use]
    pub fn domain_axis(&self, index: usize) -> Option<Rc<CategoryAxis>> {
        self.refresh_axes();
        self.axes.domain_axis(index)
    }

    #[must_use]
    pub fn range_axis(&self, index: usize) -> Option<Rc<ValueAxis>> {
        self.refresh_axes();
        self.axes.range_axis(index)
    }

    pub fn set_domain_axis(
        &mut self,
        index: usize,
        axis: Option<CategoryAxis>,
    ) -> PlotResult<Option<Rc<CategoryAxis>>> {
        let previous = self.axes.set_domain_axis(index, axis);
        self.configure_domain_axis(index);
        self.link.publish(PlotChangeEvent::AxisChanged {
            family: AxisFamily::Domain,
            index,
        })?;
        Ok(previous)
    }

    pub fn set_range_axis(
        &mut self,
        index: usize,
        axis: Option<ValueAxis>,
    ) -> PlotResult<Option<Rc<ValueAxis>>> {
        let previous = self.axes.set_range_axis(index, axis);
        self.configure_range_axis(index);
        self.link.publish(PlotChangeEvent::AxisChanged {
            family: AxisFamily::Range,
            index,
        })?;
        Ok(previous)
    }

    pub fn update_domain_axis<T>(
        &mut self,
        index: usize,
        mutate: impl FnOnce(&mut CategoryAxis) -> T,
    ) -> PlotResult<Option<T>> {
        let Some(result) = self.axes.update_domain_axis(index, mutate) else {
            return Ok(None);
        };
        self.configure_domain_axis(index);
        self.link.publish(PlotChangeEvent::AxisChanged {
            family: AxisFamily::Domain,
            index,
        })?;
        Ok(Some(result))
    }

    pub fn update_range_axis<T>(
        &mut self,
        index: usize,
        mutate: impl FnOnce(&mut ValueAxis) -> T,
    ) -> PlotResult<Option<T>> {
        let Some(result) = self.axes.update_range_axis(index, mutate) else {
            return Ok(None);
        };
        self.configure_range_axis(index);
        self.link.publish(PlotChangeEvent::AxisChanged {
            family: AxisFamily::Range,
            index,
        })?;
        Ok(Some(result))
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
    pub fn axis_registry(&self) -> &AxisRegistry<CategoryAxis, ValueAxis> {
        &self.axes
    }

    // datasets and renderers

    #[must_use]
    pub fn dataset(&self, index: usize) -> Option<&SharedCategoryDataset> {
        self.bindings.dataset(index)
    }

    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.bindings.dataset_count()
    }

    #[must_use]
    pub fn index_of_dataset(&self, dataset: &SharedCategoryDataset) -> Option<usize> {
        self.bindings.index_of_dataset(dataset)
    }

    pub fn set_dataset(
        &mut self,
        index: usize,
        dataset: Option<SharedCategoryDataset>,
    ) -> PlotResult<Option<SharedCategoryDataset>> {
        let previous = self.bindings.set_dataset(index, dataset, &self.link);
        self.dataset_changed(index)?;
        Ok(previous)
    }

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

    #[must_use]
    pub fn axis_index_for_dataset(&self, family: AxisFamily, dataset_index: usize) -> usize {
        self.bindings.axis_for_dataset(family, dataset_index)
    }

    #[must_use]
    pub fn renderer(&self, index: usize) -> Option<&dyn CategoryItemRenderer> {
        self.bindings.renderer(index)
    }

    #[must_use]
    pub fn renderer_for_dataset(&self, dataset_index: usize) -> Option<&dyn CategoryItemRenderer> {
        self.bindings.renderer_for(dataset_index)
    }

    pub fn set_renderer(
        &mut self,
        index: usize,
        renderer: Option<Box<dyn CategoryItemRenderer>>,
    ) -> PlotResult<Option<Box<dyn CategoryItemRenderer>>> {
        let previous = self.bindings.set_renderer(index, renderer);
        self.configure_axes();
        self.link.publish(PlotChangeEvent::RendererChanged { index })?;
        Ok(previous)
    }

    pub fn update_renderer<T>(
        &mut self,
        index: usize,
        mutate: impl FnOnce(&mut dyn CategoryItemRenderer) -> T,
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

    /// Column keys of the datasets mapped to domain axis `axis_index`, in
    /// dataset index order and first-seen column order.
    #[must_use]
    pub fn categories_for_axis(&self, axis_index: usize) -> Vec<String> {
        let mut keys = IndexSet::new();
        for dataset_index in self
            .bindings
            .datasets_mapped_to_axis(AxisFamily::Domain, axis_index)
        {
            let Some(dataset) = self.bindings.dataset(dataset_index) else {
                continue;
            };
            let Ok(data) = dataset.read() else {
                continue;
            };
            for column in 0..data.column_count() {
                keys.insert(data.column_key(column).to_owned());
            }
        }
        keys.into_iter().collect()
    }

    /// Union of the range bounds of the datasets mapped to range axis
    /// `axis_index`, widened by qualifying annotations.
    #[must_use]
    pub fn data_range(&self, axis_index: usize) -> Option<ValueRange> {
        let mut result = None;
        for dataset_index in self
            .bindings
            .datasets_mapped_to_axis(AxisFamily::Range, axis_index)
        {
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
            let bounds = match renderer {
                Some(renderer) => renderer.find_range_bounds(&*data),
                None => find_category_range_bounds(&*data),
            };
            result = ValueRange::combine(result, bounds);
            if let Some(renderer) = renderer {
                result = combine_annotation_bounds(result, renderer.annotations(), AxisFamily::Range);
            }
        }
        if axis_index == 0 {
            result = combine_annotation_bounds(result, &self.annotations, AxisFamily::Range);
        }
        result
    }

    pub(super) fn configure_domain_axis(&self, index: usize) {
        let categories = self.categories_for_axis(index);
        self.axes
            .update_domain_axis(index, |axis| axis.set_categories(categories));
    }

    pub(super) fn configure_range_axis(&self, index: usize) {
        let range = self.data_range(index);
        self.axes
            .update_range_axis(index, |axis| axis.configure(range));
    }

    pub(super) fn configure_axes(&self) {
        for index in self.axes.domain_axis_indices() {
            self.configure_domain_axis(index);
        }
        for index in self.axes.range_axis_indices() {
            self.configure_range_axis(index);
        }
    }

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

    fn marker_set_mut(&mut self, family: AxisFamily) -> &mut MarkerSet {
        match family {
            AxisFamily::Domain => &mut self.domain_markers,
            AxisFamily::Range => &mut self.range_markers,
        }
    }

    #[must_use]
    pub fn markers(&self, family: AxisFamily, index: usize, layer: Layer) -> &[Marker] {
        match family {
            AxisFamily::Domain => self.domain_markers.markers(index, layer),
            AxisFamily::Range => self.range_markers.markers(index, layer),
        }
    }

    /// Domain markers are expected to be category markers; range markers
    /// value or interval markers.
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

    /// Range value of the last click inside the data area.
    #[must_use]
    pub fn anchor_value(&self) -> f64 {
        self.anchor_value
    }

    pub fn set_anchor_value(&mut self, value: f64) -> PlotResult<()> {
        self.anchor_value = value;
        self.link.publish(PlotChangeEvent::General)
    }

    #[must_use]
    pub fn range_crosshair_value(&self) -> f64 {
        self.range_crosshair_value
    }

    pub fn set_range_crosshair_value(&mut self, value: f64) -> PlotResult<()> {
        self.range_crosshair_value = value;
        if self.config.range_crosshair.visible {
            self.link.publish(PlotChangeEvent::CrosshairChanged)?;
        }
        Ok(())
    }

    /// Row and column key of the item the domain crosshair sits on.
    #[must_use]
    pub fn domain_crosshair_keys(&self) -> (Option<&str>, Option<&str>) {
        (
            self.domain_crosshair_row_key.as_deref(),
            self.domain_crosshair_column_key.as_deref(),
        )
    }

    pub fn set_domain_crosshair_keys(
        &mut self,
        row_key: Option<String>,
        column_key: Option<String>,
    ) -> PlotResult<()> {
        self.domain_crosshair_row_key = row_key;
        self.domain_crosshair_column_key = column_key;
        if self.config.domain_crosshair.visible {
            self.link.publish(PlotChangeEvent::CrosshairChanged)?;
        }
        Ok(())
    }

    /// Dataset whose axes the crosshairs are drawn against.
    ///
    /// Draws overwrite it without notifying listeners.
    #[must_use]
    pub fn crosshair_dataset_index(&self) -> usize {
        self.crosshair_dataset_index
    }

    pub fn set_crosshair_dataset_index(&mut self, index: usize) -> PlotResult<()> {
        self.crosshair_dataset_index = index;
        self.link.publish(PlotChangeEvent::CrosshairChanged)
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

    /// Independent copy sharing the datasets; see [`crate::api::XyPlot::duplicate`].
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
            anchor_value: self.anchor_value,
            range_crosshair_value: self.range_crosshair_value,
            domain_crosshair_row_key: self.domain_crosshair_row_key.clone(),
            domain_crosshair_column_key: self.domain_crosshair_column_key.clone(),
            crosshair_dataset_index: self.crosshair_dataset_index,
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
                (0..data.row_count())
                    .filter(|row| renderer.is_series_visible_in_legend(*row))
                    .filter_map(|row| renderer.legend_item(&*data, dataset_index, row)),
            );
        }
        items
    }

    pub(super) fn build_snapshot(&self) -> PlotSnapshot {
        self.refresh_axes();
        let mut axes = Vec::new();
        let mut domain_categories = Vec::new();
        for index in self.axes.domain_axis_indices() {
            let Some(axis) = self.axes.domain_axis(index) else {
                continue;
            };
            if index == 0 {
                domain_categories = axis.categories().to_vec();
            }
            axes.push(AxisSnapshot {
                family: AxisFamily::Domain,
                index,
                edge: self.axes.edge_of(AxisFamily::Domain, index),
                range: None,
                categories: axis.categories().to_vec(),
                auto_range: false,
            });
        }
        for index in self.axes.range_axis_indices() {
            let Some(axis) = self.axes.range_axis(index) else {
                continue;
            };
            axes.push(AxisSnapshot {
                family: AxisFamily::Range,
                index,
                edge: self.axes.edge_of(AxisFamily::Range, index),
                range: Some(axis.range()),
                categories: Vec::new(),
                auto_range: axis.is_auto_range(),
            });
        }
        let column_key = self.domain_crosshair_column_key.clone();
        // a category crosshair reports its slot on the primary domain axis
        let slot = column_key
            .as_ref()
            .and_then(|key| domain_categories.iter().position(|category| category == key))
            .map_or(0.0, |slot| slot as f64);
        PlotSnapshot {
            orientation: self.config.orientation,
            data_area: self.rendering_info.as_ref().map(|info| info.data_area),
            axes,
            dataset_count: self.bindings.dataset_count(),
            domain_crosshair: CrosshairSnapshot {
                visible: self.config.domain_crosshair.visible,
                value: slot,
                category: column_key,
            },
            range_crosshair: CrosshairSnapshot {
                visible: self.config.range_crosshair.visible,
                value: self.range_crosshair_value,
                category: None,
            },
        }
    }
}
