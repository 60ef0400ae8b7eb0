use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::api::change::{LinkInner, PlotChangeEvent, PlotLink};
use crate::core::{CategoryDataset, XyDataset};
use crate::error::{PlotError, PlotResult};

struct Subscription {
    link: Weak<LinkInner>,
    index: usize,
}

struct DatasetCell<D: ?Sized> {
    subscribers: RefCell<Vec<Subscription>>,
    data: RefCell<D>,
}

/// Shared handle to a dataset.
///
/// Plots keep a clone and a subscription; mutating through
/// [`SharedDataset::update`] notifies every subscribed plot synchronously.
pub struct SharedDataset<D: ?Sized> {
    cell: Rc<DatasetCell<D>>,
}

/// Handle to any XY dataset.
pub type SharedXyDataset = SharedDataset<dyn XyDataset>;

/// Handle to any category dataset.
pub type SharedCategoryDataset = SharedDataset<dyn CategoryDataset>;

impl<D: ?Sized> Clone for SharedDataset<D> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<D: ?Sized> fmt::Debug for SharedDataset<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDataset")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl<D> SharedDataset<D> {
    pub fn new(data: D) -> Self {
        Self {
            cell: Rc::new(DatasetCell {
                subscribers: RefCell::new(Vec::new()),
                data: RefCell::new(data),
            }),
        }
    }
}

impl<D: XyDataset + 'static> SharedDataset<D> {
    /// Type-erased view sharing the same data and subscriptions.
    #[must_use]
    pub fn as_xy(&self) -> SharedXyDataset {
        let cell: Rc<DatasetCell<dyn XyDataset>> = self.cell.clone();
        SharedDataset { cell }
    }
}

impl<D: CategoryDataset + 'static> SharedDataset<D> {
    #[must_use]
    pub fn as_category(&self) -> SharedCategoryDataset {
        let cell: Rc<DatasetCell<dyn CategoryDataset>> = self.cell.clone();
        SharedDataset { cell }
    }
}

impl<D: ?Sized> SharedDataset<D> {
    /// Borrows the data; fails while an update is running.
    pub fn read(&self) -> PlotResult<Ref<'_, D>> {
        self.cell.data.try_borrow().map_err(|_| {
            PlotError::ContractViolation("dataset is being updated".to_owned())
        })
    }

    /// Mutates the data, then publishes `DatasetChanged` to every subscriber.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut D) -> T) -> PlotResult<T> {
        let output = {
            let mut data = self.cell.data.try_borrow_mut().map_err(|_| {
                PlotError::ContractViolation("dataset cannot change while it is read".to_owned())
            })?;
            mutate(&mut *data)
        };
        self.notify_subscribers();
        Ok(output)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Live subscriptions; subscriptions of dropped plots are not counted.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.cell
            .subscribers
            .borrow()
            .iter()
            .filter(|subscription| subscription.link.strong_count() > 0)
            .count()
    }

    pub(crate) fn subscribe(&self, link: &PlotLink, index: usize) {
        let mut subscribers = self.cell.subscribers.borrow_mut();
        subscribers.retain(|subscription| subscription.link.strong_count() > 0);
        let weak = link.downgrade();
        if !subscribers
            .iter()
            .any(|existing| existing.index == index && Weak::ptr_eq(&existing.link, &weak))
        {
            subscribers.push(Subscription { link: weak, index });
        }
    }

    pub(crate) fn unsubscribe(&self, link: &PlotLink, index: usize) {
        let weak = link.downgrade();
        self.cell.subscribers.borrow_mut().retain(|subscription| {
            subscription.link.strong_count() > 0
                && !(subscription.index == index && Weak::ptr_eq(&subscription.link, &weak))
        });
    }

    fn notify_subscribers(&self) {
        let targets: Vec<(Rc<LinkInner>, usize)> = {
            let mut subscribers = self.cell.subscribers.borrow_mut();
            subscribers.retain(|subscription| subscription.link.strong_count() > 0);
            subscribers
                .iter()
                .filter_map(|subscription| {
                    subscription
                        .link
                        .upgrade()
                        .map(|link| (link, subscription.index))
                })
                .collect()
        };
        for (inner, index) in targets {
            let link = PlotLink::from_inner(inner);
            link.mark_axes_stale();
            if let Err(err) = link.publish(PlotChangeEvent::DatasetChanged { index }) {
                warn!(error = %err, dataset_index = index, "dataset change notification failed");
            }
        }
    }
}
