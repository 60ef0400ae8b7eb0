use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::{
    AxisFamily, AxisLocation, PlotOrientation, RectangleEdge, resolve_domain_edge,
    resolve_range_edge,
};
use crate::error::{PlotError, PlotResult};

struct AxisSlots<D, R> {
    parent: Option<Weak<RefCell<AxisSlots<D, R>>>>,
    domain_axes: BTreeMap<usize, Rc<D>>,
    range_axes: BTreeMap<usize, Rc<R>>,
    domain_locations: BTreeMap<usize, AxisLocation>,
    range_locations: BTreeMap<usize, AxisLocation>,
}

impl<D, R> AxisSlots<D, R> {
    fn locations(&self, family: AxisFamily) -> &BTreeMap<usize, AxisLocation> {
        match family {
            AxisFamily::Domain => &self.domain_locations,
            AxisFamily::Range => &self.range_locations,
        }
    }

    fn locations_mut(&mut self, family: AxisFamily) -> &mut BTreeMap<usize, AxisLocation> {
        match family {
            AxisFamily::Domain => &mut self.domain_locations,
            AxisFamily::Range => &mut self.range_locations,
        }
    }
}

/// Indexed domain and range axes of one plot, their logical locations, and
/// the lookup chain into a parent plot's registry.
///
/// Axes are held behind `Rc` so a child plot can hand out its parent's axes
/// without owning them; identity comparisons use pointer equality.
pub struct AxisRegistry<D, R> {
    slots: Rc<RefCell<AxisSlots<D, R>>>,
    orientation: PlotOrientation,
}

impl<D, R> fmt::Debug for AxisRegistry<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        f.debug_struct("AxisRegistry")
            .field("orientation", &self.orientation)
            .field("domain_axes", &slots.domain_axes.keys().collect::<Vec<_>>())
            .field("range_axes", &slots.range_axes.keys().collect::<Vec<_>>())
            .field("has_parent", &slots.parent.is_some())
            .finish()
    }
}

impl<D, R> AxisRegistry<D, R> {
    #[must_use]
    pub fn new(orientation: PlotOrientation) -> Self {
        let mut domain_locations = BTreeMap::new();
        domain_locations.insert(0, AxisLocation::BottomOrLeft);
        let mut range_locations = BTreeMap::new();
        range_locations.insert(0, AxisLocation::BottomOrLeft);
        Self {
            slots: Rc::new(RefCell::new(AxisSlots {
                parent: None,
                domain_axes: BTreeMap::new(),
                range_axes: BTreeMap::new(),
                domain_locations,
                range_locations,
            })),
            orientation,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> PlotOrientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: PlotOrientation) {
        self.orientation = orientation;
    }

    /// Links lookups that miss locally to `parent`'s registry.
    pub fn set_parent(&self, parent: Option<&AxisRegistry<D, R>>) {
        self.slots.borrow_mut().parent = parent.map(|parent| Rc::downgrade(&parent.slots));
    }

    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.slots
            .borrow()
            .parent
            .as_ref()
            .is_some_and(|parent| parent.strong_count() > 0)
    }

    /// Domain axis at `index`, falling back along the parent chain.
    #[must_use]
    pub fn domain_axis(&self, index: usize) -> Option<Rc<D>> {
        self.lookup(|slots| slots.domain_axes.get(&index).cloned())
    }

    /// Range axis at `index`, falling back along the parent chain.
    #[must_use]
    pub fn range_axis(&self, index: usize) -> Option<Rc<R>> {
        self.lookup(|slots| slots.range_axes.get(&index).cloned())
    }

    fn lookup<T>(&self, find: impl Fn(&AxisSlots<D, R>) -> Option<T>) -> Option<T> {
        let mut current = Some(self.slots.clone());
        while let Some(slots) = current {
            let next = {
                let borrowed = slots.borrow();
                if let Some(found) = find(&*borrowed) {
                    return Some(found);
                }
                borrowed.parent.as_ref().and_then(Weak::upgrade)
            };
            current = next;
        }
        None
    }

    /// Replaces the local domain axis at `index`; returns the previous one.
    pub fn set_domain_axis(&self, index: usize, axis: Option<D>) -> Option<Rc<D>> {
        let mut slots = self.slots.borrow_mut();
        match axis {
            Some(axis) => slots.domain_axes.insert(index, Rc::new(axis)),
            None => slots.domain_axes.remove(&index),
        }
    }

    pub fn set_range_axis(&self, index: usize, axis: Option<R>) -> Option<Rc<R>> {
        let mut slots = self.slots.borrow_mut();
        match axis {
            Some(axis) => slots.range_axes.insert(index, Rc::new(axis)),
            None => slots.range_axes.remove(&index),
        }
    }

    /// Indices of locally registered domain axes, ascending.
    #[must_use]
    pub fn domain_axis_indices(&self) -> Vec<usize> {
        self.slots.borrow().domain_axes.keys().copied().collect()
    }

    #[must_use]
    pub fn range_axis_indices(&self) -> Vec<usize> {
        self.slots.borrow().range_axes.keys().copied().collect()
    }

    #[must_use]
    pub fn axis_indices(&self, family: AxisFamily) -> Vec<usize> {
        match family {
            AxisFamily::Domain => self.domain_axis_indices(),
            AxisFamily::Range => self.range_axis_indices(),
        }
    }

    #[must_use]
    pub fn axis_count(&self, family: AxisFamily) -> usize {
        let slots = self.slots.borrow();
        match family {
            AxisFamily::Domain => slots.domain_axes.len(),
            AxisFamily::Range => slots.range_axes.len(),
        }
    }

    /// Index of `axis` by identity, searching locally and then the parent chain.
    #[must_use]
    pub fn domain_axis_index(&self, axis: &Rc<D>) -> Option<usize> {
        self.lookup(|slots| {
            slots
                .domain_axes
                .iter()
                .find(|(_, candidate)| Rc::ptr_eq(candidate, axis))
                .map(|(index, _)| *index)
        })
    }

    #[must_use]
    pub fn range_axis_index(&self, axis: &Rc<R>) -> Option<usize> {
        self.lookup(|slots| {
            slots
                .range_axes
                .iter()
                .find(|(_, candidate)| Rc::ptr_eq(candidate, axis))
                .map(|(index, _)| *index)
        })
    }

    /// Declared location of the axis, or the opposite of index 0's location
    /// when none was declared.
    #[must_use]
    pub fn location_of(&self, family: AxisFamily, index: usize) -> AxisLocation {
        let slots = self.slots.borrow();
        let locations = slots.locations(family);
        if let Some(location) = locations.get(&index) {
            return *location;
        }
        locations
            .get(&0)
            .copied()
            .unwrap_or(AxisLocation::BottomOrLeft)
            .opposite()
    }

    /// Declares the location of an axis; `None` restores the default except at
    /// index 0, which always needs one.
    pub fn set_location(
        &self,
        family: AxisFamily,
        index: usize,
        location: Option<AxisLocation>,
    ) -> PlotResult<()> {
        let mut slots = self.slots.borrow_mut();
        match location {
            Some(location) => {
                slots.locations_mut(family).insert(index, location);
            }
            None if index == 0 => {
                return Err(PlotError::InvalidArgument(
                    "axis location for index 0 must not be empty".to_owned(),
                ));
            }
            None => {
                slots.locations_mut(family).remove(&index);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn edge_of(&self, family: AxisFamily, index: usize) -> RectangleEdge {
        let location = self.location_of(family, index);
        match family {
            AxisFamily::Domain => resolve_domain_edge(location, self.orientation),
            AxisFamily::Range => resolve_range_edge(location, self.orientation),
        }
    }
}

impl<D: Clone, R: Clone> AxisRegistry<D, R> {
    /// Mutates the local domain axis at `index` in place.
    ///
    /// Previously handed-out `Rc` snapshots keep the old value.
    pub fn update_domain_axis<T>(&self, index: usize, mutate: impl FnOnce(&mut D) -> T) -> Option<T> {
        let mut slots = self.slots.borrow_mut();
        let axis = slots.domain_axes.get_mut(&index)?;
        Some(mutate(Rc::make_mut(axis)))
    }

    pub fn update_range_axis<T>(&self, index: usize, mutate: impl FnOnce(&mut R) -> T) -> Option<T> {
        let mut slots = self.slots.borrow_mut();
        let axis = slots.range_axes.get_mut(&index)?;
        Some(mutate(Rc::make_mut(axis)))
    }

    /// Registry with deep copies of the local axes and locations, no parent.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let slots = self.slots.borrow();
        Self {
            slots: Rc::new(RefCell::new(AxisSlots {
                parent: None,
                domain_axes: slots
                    .domain_axes
                    .iter()
                    .map(|(index, axis)| (*index, Rc::new(D::clone(axis))))
                    .collect(),
                range_axes: slots
                    .range_axes
                    .iter()
                    .map(|(index, axis)| (*index, Rc::new(R::clone(axis))))
                    .collect(),
                domain_locations: slots.domain_locations.clone(),
                range_locations: slots.range_locations.clone(),
            })),
            orientation: self.orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueAxis;

    type Registry = AxisRegistry<ValueAxis, ValueAxis>;

    #[test]
    fn child_falls_back_to_parent_axes() {
        let parent = Registry::new(PlotOrientation::Vertical);
        parent.set_domain_axis(0, Some(ValueAxis::new().with_label("shared")));
        let child = Registry::new(PlotOrientation::Vertical);
        child.set_parent(Some(&parent));

        let axis = child.domain_axis(0).expect("inherited axis");
        assert_eq!(axis.label(), Some("shared"));
        assert_eq!(child.domain_axis_index(&axis), Some(0));
        assert!(child.domain_axis(1).is_none());
        assert!(child.domain_axis_indices().is_empty());
    }

    #[test]
    fn index_of_uses_identity() {
        let registry = Registry::new(PlotOrientation::Vertical);
        registry.set_range_axis(3, Some(ValueAxis::new()));
        let stored = registry.range_axis(3).expect("axis");
        let lookalike = Rc::new(ValueAxis::new());
        assert_eq!(registry.range_axis_index(&stored), Some(3));
        assert_eq!(registry.range_axis_index(&lookalike), None);
    }

    #[test]
    fn index_zero_location_cannot_be_cleared() {
        let registry = Registry::new(PlotOrientation::Vertical);
        assert!(registry.set_location(AxisFamily::Domain, 0, None).is_err());
        registry
            .set_location(AxisFamily::Range, 2, Some(AxisLocation::TopOrLeft))
            .expect("location");
        registry.set_location(AxisFamily::Range, 2, None).expect("clear");
        assert_eq!(
            registry.location_of(AxisFamily::Range, 2),
            AxisLocation::TopOrRight
        );
    }

    #[test]
    fn edges_follow_orientation() {
        let mut registry = Registry::new(PlotOrientation::Vertical);
        assert_eq!(registry.edge_of(AxisFamily::Domain, 0), RectangleEdge::Bottom);
        assert_eq!(registry.edge_of(AxisFamily::Range, 0), RectangleEdge::Left);
        assert_eq!(registry.edge_of(AxisFamily::Range, 1), RectangleEdge::Right);
        registry.set_orientation(PlotOrientation::Horizontal);
        assert_eq!(registry.edge_of(AxisFamily::Domain, 0), RectangleEdge::Left);
        assert_eq!(registry.edge_of(AxisFamily::Range, 0), RectangleEdge::Bottom);
    }

    #[test]
    fn update_leaves_snapshots_untouched() {
        let registry = Registry::new(PlotOrientation::Vertical);
        registry.set_domain_axis(0, Some(ValueAxis::new()));
        let snapshot = registry.domain_axis(0).expect("axis");
        registry
            .update_domain_axis(0, |axis| axis.set_inverted(true))
            .expect("present");
        assert!(!snapshot.is_inverted());
        assert!(registry.domain_axis(0).expect("axis").is_inverted());
    }
}
