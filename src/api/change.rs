use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::AxisFamily;
use crate::error::{PlotError, PlotResult};

/// What changed on a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlotChangeEvent {
    AxisChanged { family: AxisFamily, index: usize },
    DatasetChanged { index: usize },
    RendererChanged { index: usize },
    MarkerChanged,
    AnnotationChanged,
    CrosshairChanged,
    General,
}

/// Receiver of plot change events.
pub trait PlotChangeListener {
    fn id(&self) -> &str;

    fn plot_changed(&mut self, event: &PlotChangeEvent);
}

pub(crate) struct LinkInner {
    parent: RefCell<Option<Weak<LinkInner>>>,
    listeners: RefCell<Vec<Box<dyn PlotChangeListener>>>,
    notify: Cell<bool>,
    accepts_renderer_changes: Cell<bool>,
    stale_axes: Cell<bool>,
}

impl LinkInner {
    fn parent(&self) -> Option<Rc<LinkInner>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn dispatch(&self, event: &PlotChangeEvent) {
        // A listener that publishes on the same node while being called is not re-entered.
        let Ok(mut listeners) = self.listeners.try_borrow_mut() else {
            debug!(?event, "skipping re-entrant plot change dispatch");
            return;
        };
        for listener in listeners.iter_mut() {
            listener.plot_changed(event);
        }
    }
}

/// Notification node of one plot: its listeners, its notify switch and the
/// weak back-reference to a parent plot's node.
#[derive(Clone)]
pub struct PlotLink {
    inner: Rc<LinkInner>,
}

impl fmt::Debug for PlotLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotLink")
            .field("listeners", &self.listener_count())
            .field("notify", &self.inner.notify.get())
            .field("has_parent", &self.inner.parent().is_some())
            .finish()
    }
}

impl Default for PlotLink {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotLink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(LinkInner {
                parent: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                notify: Cell::new(true),
                accepts_renderer_changes: Cell::new(true),
                stale_axes: Cell::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<LinkInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<LinkInner> {
        Rc::downgrade(&self.inner)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner.parent().map(Self::from_inner)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.parent().is_none()
    }

    /// Attaches this node under `parent`, or detaches it with `None`.
    ///
    /// Rejects links that would close a cycle.
    pub fn set_parent(&self, parent: Option<&PlotLink>) -> PlotResult<()> {
        if let Some(parent) = parent {
            let mut current = Some(parent.clone());
            while let Some(node) = current {
                if node.ptr_eq(self) {
                    return Err(PlotError::InvalidArgument(
                        "plot parent chain must not contain a cycle".to_owned(),
                    ));
                }
                current = node.parent();
            }
        }
        *self.inner.parent.borrow_mut() = parent.map(PlotLink::downgrade);
        Ok(())
    }

    pub fn add_listener(&self, listener: Box<dyn PlotChangeListener>) -> PlotResult<()> {
        let id = listener.id();
        if id.is_empty() {
            return Err(PlotError::InvalidArgument(
                "listener id must not be empty".to_owned(),
            ));
        }
        let mut listeners = self.inner.listeners.try_borrow_mut().map_err(|_| {
            PlotError::ContractViolation("listeners cannot change during dispatch".to_owned())
        })?;
        if listeners.iter().any(|existing| existing.id() == id) {
            return Err(PlotError::InvalidArgument(format!(
                "listener with id `{id}` is already registered"
            )));
        }
        listeners.push(listener);
        Ok(())
    }

    pub fn remove_listener(&self, id: &str) -> bool {
        let Ok(mut listeners) = self.inner.listeners.try_borrow_mut() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|listener| listener.id() != id);
        listeners.len() != before
    }

    #[must_use]
    pub fn has_listener(&self, id: &str) -> bool {
        self.inner
            .listeners
            .try_borrow()
            .is_ok_and(|listeners| listeners.iter().any(|listener| listener.id() == id))
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .try_borrow()
            .map_or(0, |listeners| listeners.len())
    }

    #[must_use]
    pub fn is_notify(&self) -> bool {
        self.inner.notify.get()
    }

    /// Switches publication on or off; turning it back on does not replay
    /// suppressed events.
    pub fn set_notify(&self, notify: bool) {
        self.inner.notify.set(notify);
    }

    #[must_use]
    pub fn accepts_renderer_changes(&self) -> bool {
        self.inner.accepts_renderer_changes.get()
    }

    pub fn set_accepts_renderer_changes(&self, accepts: bool) {
        self.inner.accepts_renderer_changes.set(accepts);
    }

    pub(crate) fn mark_axes_stale(&self) {
        self.inner.stale_axes.set(true);
    }

    /// Returns and clears the stale-axes flag.
    pub(crate) fn take_axes_stale(&self) -> bool {
        self.inner.stale_axes.replace(false)
    }

    /// Publishes `event` to this node's listeners, then to each ancestor's.
    ///
    /// Propagation stops at the first node whose notify switch is off. A
    /// renderer change forwarded to a parent that does not accept renderer
    /// changes is a contract violation.
    pub fn publish(&self, event: PlotChangeEvent) -> PlotResult<()> {
        let mut node = Some(self.inner.clone());
        while let Some(current) = node {
            if !current.notify.get() {
                return Ok(());
            }
            let parent = current.parent();
            if let (PlotChangeEvent::RendererChanged { index }, Some(parent)) = (&event, &parent) {
                if !parent.accepts_renderer_changes.get() {
                    warn!(
                        renderer_index = *index,
                        "renderer change reached a parent plot that cannot handle it"
                    );
                    return Err(PlotError::ContractViolation(format!(
                        "renderer {index} changed but the parent plot does not accept renderer changes"
                    )));
                }
            }
            if matches!(event, PlotChangeEvent::DatasetChanged { .. }) {
                current.stale_axes.set(true);
            }
            current.dispatch(&event);
            node = parent;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{PlotChangeEvent, PlotChangeListener};

    /// Listener that appends every event to a shared log.
    pub(crate) struct EventLog {
        pub id: String,
        pub events: Rc<RefCell<Vec<PlotChangeEvent>>>,
    }

    impl EventLog {
        pub(crate) fn new(id: &str) -> (Self, Rc<RefCell<Vec<PlotChangeEvent>>>) {
            let events = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    id: id.to_owned(),
                    events: events.clone(),
                },
                events,
            )
        }
    }

    impl PlotChangeListener for EventLog {
        fn id(&self) -> &str {
            &self.id
        }

        fn plot_changed(&mut self, event: &PlotChangeEvent) {
            self.events.borrow_mut().push(*event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::EventLog;
    use super::*;

    #[test]
    fn listener_ids_must_be_unique_and_non_empty() {
        let link = PlotLink::new();
        let (log, _) = EventLog::new("a");
        link.add_listener(Box::new(log)).expect("register");
        let (dup, _) = EventLog::new("a");
        assert!(link.add_listener(Box::new(dup)).is_err());
        let (empty, _) = EventLog::new("");
        assert!(link.add_listener(Box::new(empty)).is_err());
        assert!(link.has_listener("a"));
        assert!(link.remove_listener("a"));
        assert!(!link.remove_listener("a"));
    }

    #[test]
    fn events_walk_up_to_the_root() {
        let root = PlotLink::new();
        let child = PlotLink::new();
        child.set_parent(Some(&root)).expect("parent");
        let (root_log, root_events) = EventLog::new("root");
        let (child_log, child_events) = EventLog::new("child");
        root.add_listener(Box::new(root_log)).expect("register");
        child.add_listener(Box::new(child_log)).expect("register");

        child.publish(PlotChangeEvent::General).expect("publish");
        assert_eq!(child_events.borrow().len(), 1);
        assert_eq!(root_events.borrow().len(), 1);

        root.set_notify(false);
        child.publish(PlotChangeEvent::MarkerChanged).expect("publish");
        assert_eq!(child_events.borrow().len(), 2);
        assert_eq!(root_events.borrow().len(), 1);
    }

    #[test]
    fn renderer_change_into_refusing_parent_is_a_violation() {
        let root = PlotLink::new();
        root.set_accepts_renderer_changes(false);
        let child = PlotLink::new();
        child.set_parent(Some(&root)).expect("parent");
        let err = child
            .publish(PlotChangeEvent::RendererChanged { index: 0 })
            .expect_err("violation");
        assert!(matches!(err, PlotError::ContractViolation(_)));
        // A root that refuses renderer changes still publishes its own.
        assert!(root.publish(PlotChangeEvent::RendererChanged { index: 0 }).is_ok());
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let a = PlotLink::new();
        let b = PlotLink::new();
        b.set_parent(Some(&a)).expect("parent");
        assert!(a.set_parent(Some(&b)).is_err());
        assert!(a.set_parent(Some(&a)).is_err());
    }

    #[test]
    fn dataset_events_mark_every_node_stale() {
        let root = PlotLink::new();
        let child = PlotLink::new();
        child.set_parent(Some(&root)).expect("parent");
        child
            .publish(PlotChangeEvent::DatasetChanged { index: 0 })
            .expect("publish");
        assert!(child.take_axes_stale());
        assert!(root.take_axes_stale());
        assert!(!root.take_axes_stale());
    }
}
