use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use smallvec::SmallVec;
use tracing::debug;

use crate::api::change::PlotLink;
use crate::api::shared_dataset::SharedDataset;
use crate::core::{AxisFamily, DatasetRenderingOrder};
use crate::error::{PlotError, PlotResult};

/// Axis indices a dataset is mapped to; the first entry drives coordinate conversion.
pub type AxisIndexList = SmallVec<[usize; 2]>;

/// Indexed datasets and renderers of one plot plus the dataset-to-axis mappings.
pub struct DatasetBinding<DS: ?Sized, RN: ?Sized> {
    datasets: BTreeMap<usize, SharedDataset<DS>>,
    renderers: BTreeMap<usize, Box<RN>>,
    domain_map: BTreeMap<usize, AxisIndexList>,
    range_map: BTreeMap<usize, AxisIndexList>,
}

impl<DS: ?Sized, RN: ?Sized> fmt::Debug for DatasetBinding<DS, RN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetBinding")
            .field("datasets", &self.datasets.keys().collect::<Vec<_>>())
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .field("domain_map", &self.domain_map)
            .field("range_map", &self.range_map)
            .finish()
    }
}

impl<DS: ?Sized, RN: ?Sized> Default for DatasetBinding<DS, RN> {
    fn default() -> Self {
        Self {
            datasets: BTreeMap::new(),
            renderers: BTreeMap::new(),
            domain_map: BTreeMap::new(),
            range_map: BTreeMap::new(),
        }
    }
}

/// Rejects empty and duplicate-bearing axis index lists.
pub fn validate_axis_indices(indices: &[usize]) -> PlotResult<()> {
    if indices.is_empty() {
        return Err(PlotError::InvalidArgument(
            "axis index list must not be empty".to_owned(),
        ));
    }
    let mut seen = BTreeSet::new();
    for index in indices {
        if !seen.insert(*index) {
            return Err(PlotError::InvalidArgument(format!(
                "axis index list must be unique, `{index}` repeats"
            )));
        }
    }
    Ok(())
}

fn ordered(mut indices: Vec<usize>, order: DatasetRenderingOrder) -> Vec<usize> {
    if order == DatasetRenderingOrder::Reverse {
        indices.reverse();
    }
    indices
}

impl<DS: ?Sized, RN: ?Sized> DatasetBinding<DS, RN> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dataset at `index`, moving the plot's subscription from
    /// the old dataset to the new one; returns the old dataset.
    pub fn set_dataset(
        &mut self,
        index: usize,
        dataset: Option<SharedDataset<DS>>,
        link: &PlotLink,
    ) -> Option<SharedDataset<DS>> {
        let previous = match dataset {
            Some(dataset) => {
                dataset.subscribe(link, index);
                self.datasets.insert(index, dataset)
            }
            None => self.datasets.remove(&index),
        };
        if let Some(previous) = &previous {
            let still_bound = self
                .datasets
                .get(&index)
                .is_some_and(|current| current.ptr_eq(previous));
            if !still_bound {
                previous.unsubscribe(link, index);
            }
        }
        debug!(dataset_index = index, "dataset slot replaced");
        previous
    }

    #[must_use]
    pub fn dataset(&self, index: usize) -> Option<&SharedDataset<DS>> {
        self.datasets.get(&index)
    }

    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    /// Slot index holding `dataset`, by identity.
    #[must_use]
    pub fn index_of_dataset(&self, dataset: &SharedDataset<DS>) -> Option<usize> {
        self.datasets
            .iter()
            .find(|(_, candidate)| candidate.ptr_eq(dataset))
            .map(|(index, _)| *index)
    }

    /// Occupied dataset indices in rendering order.
    #[must_use]
    pub fn dataset_indices(&self, order: DatasetRenderingOrder) -> Vec<usize> {
        ordered(self.datasets.keys().copied().collect(), order)
    }

    /// Occupied renderer indices in rendering order.
    #[must_use]
    pub fn renderer_indices(&self, order: DatasetRenderingOrder) -> Vec<usize> {
        ordered(self.renderers.keys().copied().collect(), order)
    }

    pub fn set_renderer(&mut self, index: usize, renderer: Option<Box<RN>>) -> Option<Box<RN>> {
        debug!(renderer_index = index, "renderer slot replaced");
        match renderer {
            Some(renderer) => self.renderers.insert(index, renderer),
            None => self.renderers.remove(&index),
        }
    }

    #[must_use]
    pub fn renderer(&self, index: usize) -> Option<&RN> {
        self.renderers.get(&index).map(|renderer| &**renderer)
    }

    pub fn renderer_mut(&mut self, index: usize) -> Option<&mut RN> {
        self.renderers.get_mut(&index).map(|renderer| &mut **renderer)
    }

    /// Renderer at `dataset_index`, or the primary renderer when that slot is empty.
    #[must_use]
    pub fn renderer_for(&self, dataset_index: usize) -> Option<&RN> {
        self.renderer(dataset_index).or_else(|| self.renderer(0))
    }

    /// Index of the renderer that draws `dataset_index`.
    #[must_use]
    pub fn renderer_index_for(&self, dataset_index: usize) -> Option<usize> {
        if self.renderers.contains_key(&dataset_index) {
            Some(dataset_index)
        } else if self.renderers.contains_key(&0) {
            Some(0)
        } else {
            None
        }
    }

    fn map(&self, family: AxisFamily) -> &BTreeMap<usize, AxisIndexList> {
        match family {
            AxisFamily::Domain => &self.domain_map,
            AxisFamily::Range => &self.range_map,
        }
    }

    fn map_mut(&mut self, family: AxisFamily) -> &mut BTreeMap<usize, AxisIndexList> {
        match family {
            AxisFamily::Domain => &mut self.domain_map,
            AxisFamily::Range => &mut self.range_map,
        }
    }

    /// Maps a dataset to axes of `family`; `None` restores the default mapping to axis 0.
    pub fn map_to_axes(
        &mut self,
        family: AxisFamily,
        dataset_index: usize,
        axis_indices: Option<&[usize]>,
    ) -> PlotResult<()> {
        match axis_indices {
            Some(indices) => {
                validate_axis_indices(indices)?;
                self.map_mut(family)
                    .insert(dataset_index, indices.iter().copied().collect());
            }
            None => {
                self.map_mut(family).remove(&dataset_index);
            }
        }
        Ok(())
    }

    /// Axes of `family` the dataset is mapped to, `[0]` when unmapped.
    #[must_use]
    pub fn axis_indices_for(&self, family: AxisFamily, dataset_index: usize) -> AxisIndexList {
        self.map(family)
            .get(&dataset_index)
            .cloned()
            .unwrap_or_else(|| smallvec::smallvec![0])
    }

    /// The axis of `family` used to convert the dataset's coordinates.
    #[must_use]
    pub fn axis_for_dataset(&self, family: AxisFamily, dataset_index: usize) -> usize {
        self.map(family)
            .get(&dataset_index)
            .and_then(|indices| indices.first().copied())
            .unwrap_or(0)
    }

    /// Dataset indices, ascending, whose mapping for `family` includes `axis_index`.
    #[must_use]
    pub fn datasets_mapped_to_axis(&self, family: AxisFamily, axis_index: usize) -> Vec<usize> {
        let map = self.map(family);
        self.datasets
            .keys()
            .copied()
            .filter(|dataset_index| match map.get(dataset_index) {
                Some(indices) => indices.contains(&axis_index),
                None => axis_index == 0,
            })
            .collect()
    }

    pub(crate) fn renderers(&self) -> impl Iterator<Item = (usize, &RN)> {
        self.renderers
            .iter()
            .map(|(index, renderer)| (*index, &**renderer))
    }

    /// Drops every dataset subscription held for `link`.
    pub(crate) fn release(&mut self, link: &PlotLink) {
        for (index, dataset) in &self.datasets {
            dataset.unsubscribe(link, *index);
        }
    }
}

impl<DS: ?Sized, RN: ?Sized> DatasetBinding<DS, RN> {
    /// Binding sharing the same datasets under a new subscription, with
    /// renderers produced by `copy_renderer`.
    pub(crate) fn duplicate(
        &self,
        link: &PlotLink,
        copy_renderer: impl Fn(&RN) -> Box<RN>,
    ) -> Self {
        for (index, dataset) in &self.datasets {
            dataset.subscribe(link, *index);
        }
        Self {
            datasets: self.datasets.clone(),
            renderers: self
                .renderers
                .iter()
                .map(|(index, renderer)| (*index, copy_renderer(renderer)))
                .collect(),
            domain_map: self.domain_map.clone(),
            range_map: self.range_map.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{XyDataset, XySeriesCollection};

    type Binding = DatasetBinding<dyn XyDataset, str>;

    fn shared() -> SharedDataset<dyn XyDataset> {
        SharedDataset::new(XySeriesCollection::new()).as_xy()
    }

    #[test]
    fn mapping_rejects_empty_and_duplicates() {
        let mut binding = Binding::new();
        assert!(binding.map_to_axes(AxisFamily::Range, 0, Some(&[])).is_err());
        assert!(binding.map_to_axes(AxisFamily::Range, 0, Some(&[1, 2, 1])).is_err());
        binding
            .map_to_axes(AxisFamily::Range, 0, Some(&[2, 1]))
            .expect("map");
        assert_eq!(binding.axis_for_dataset(AxisFamily::Range, 0), 2);
        assert_eq!(binding.axis_for_dataset(AxisFamily::Domain, 0), 0);
        binding.map_to_axes(AxisFamily::Range, 0, None).expect("clear");
        assert_eq!(binding.axis_for_dataset(AxisFamily::Range, 0), 0);
    }

    #[test]
    fn replacing_a_dataset_moves_the_subscription() {
        let link = PlotLink::new();
        let mut binding = Binding::new();
        let first = shared();
        let second = shared();
        binding.set_dataset(0, Some(first.clone()), &link);
        assert_eq!(first.subscriber_count(), 1);
        let previous = binding.set_dataset(0, Some(second.clone()), &link);
        assert!(previous.is_some_and(|previous| previous.ptr_eq(&first)));
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);
        binding.set_dataset(0, None, &link);
        assert_eq!(second.subscriber_count(), 0);
    }

    #[test]
    fn reverse_order_puts_primary_last() {
        let link = PlotLink::new();
        let mut binding = Binding::new();
        for index in [2, 0, 1] {
            binding.set_dataset(index, Some(shared()), &link);
        }
        assert_eq!(
            binding.dataset_indices(DatasetRenderingOrder::Reverse),
            vec![2, 1, 0]
        );
        assert_eq!(
            binding.dataset_indices(DatasetRenderingOrder::Forward),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn reverse_lookup_honours_default_mapping() {
        let link = PlotLink::new();
        let mut binding = Binding::new();
        binding.set_dataset(0, Some(shared()), &link);
        binding.set_dataset(1, Some(shared()), &link);
        binding
            .map_to_axes(AxisFamily::Range, 1, Some(&[1, 0]))
            .expect("map");
        assert_eq!(binding.datasets_mapped_to_axis(AxisFamily::Range, 0), vec![0, 1]);
        assert_eq!(binding.datasets_mapped_to_axis(AxisFamily::Range, 1), vec![1]);
        assert_eq!(binding.datasets_mapped_to_axis(AxisFamily::Domain, 1), Vec::<usize>::new());
    }

    #[test]
    fn renderer_falls_back_to_primary() {
        let mut binding = Binding::new();
        binding.set_renderer(0, Some(Box::from("primary")));
        assert_eq!(binding.renderer_for(3), Some("primary"));
        assert_eq!(binding.renderer_index_for(3), Some(0));
        binding.set_renderer(3, Some(Box::from("own")));
        assert_eq!(binding.renderer_for(3), Some("own"));
    }
}
