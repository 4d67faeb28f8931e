//! Per-component change tracking for vector valued quantities.
//!
//! A computation that only depends on `x[i]` should not be invalidated when
//! some other entry of `x` moves. [`ShieldedVector`] keeps one scalar
//! [`Component`] proxy per entry and only pushes a new value into a proxy
//! when that entry actually changed. Dependents subscribe to the proxies
//! they read instead of to the whole vector.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use crate::error::{check_dim, MvnError, Result};
use crate::vector::{StoredVector, VectorValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(f64)>;

struct ComponentInner {
    index: usize,
    value: Cell<f64>,
    notifications: Cell<u64>,
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Callback)>>,
    // Ids of the callbacks moved out of `subscribers` while they run.
    in_flight: RefCell<Vec<SubscriptionId>>,
}

/// Scalar proxy for one entry of a [`ShieldedVector`].
///
/// Cloning the handle is cheap; all clones observe the same value and share
/// the same subscribers.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("index", &self.inner.index)
            .field("value", &self.inner.value.get())
            .field("notifications", &self.inner.notifications.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Component {
    fn new(index: usize, value: f64) -> Self {
        Self {
            inner: Rc::new(ComponentInner {
                index,
                value: Cell::new(value),
                notifications: Cell::new(0),
                next_id: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                in_flight: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn index(&self) -> usize {
        self.inner.index
    }

    pub fn value(&self) -> f64 {
        self.inner.value.get()
    }

    /// How often a new value was pushed into this proxy.
    pub fn notifications(&self) -> u64 {
        self.inner.notifications.get()
    }

    /// Register a callback that is invoked with the new value whenever this
    /// entry changes.
    ///
    /// Callbacks may inspect, subscribe to or unsubscribe from the component
    /// that is notifying them. A callback added during a notification is
    /// first called on the next one.
    pub fn subscribe<F: FnMut(f64) + 'static>(&self, callback: F) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the subscription was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let before = subscribers.len();
            subscribers.retain(|(other, _)| *other != id);
            if subscribers.len() != before {
                return true;
            }
        }
        let mut in_flight = self.inner.in_flight.borrow_mut();
        match in_flight.iter().position(|other| *other == id) {
            Some(pos) => {
                in_flight.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len() + self.inner.in_flight.borrow().len()
    }

    fn push(&self, value: f64) {
        self.inner.value.set(value);
        self.inner
            .notifications
            .set(self.inner.notifications.get() + 1);

        // No borrow is held while the callbacks run.
        let mut active = std::mem::take(&mut *self.inner.subscribers.borrow_mut());
        *self.inner.in_flight.borrow_mut() = active.iter().map(|(id, _)| *id).collect();
        for (_, callback) in active.iter_mut() {
            callback(value);
        }
        let kept = self.inner.in_flight.take();
        active.retain(|(id, _)| kept.contains(id));

        let mut subscribers = self.inner.subscribers.borrow_mut();
        active.append(&mut subscribers);
        *subscribers = active;
    }

    /// Push `value` if it differs from the value the proxy currently holds.
    fn sync(&self, value: f64) -> bool {
        // NaN never compares equal, so it is always pushed.
        if self.value() != value {
            self.push(value);
            true
        } else {
            false
        }
    }
}

/// A vector valued quantity with one change tracking proxy per entry.
///
/// After every `set_value` or `revert` each proxy holds the current value of
/// its entry, and only the proxies of entries that changed were notified.
#[derive(Debug)]
pub struct ShieldedVector<Q: VectorValue = StoredVector> {
    inner: Q,
    components: Vec<Component>,
}

impl ShieldedVector<StoredVector> {
    pub fn new(value: Vec<f64>) -> Self {
        Self::wrap(StoredVector::new(value))
    }
}

impl<Q: VectorValue> ShieldedVector<Q> {
    /// Add change tracking to an existing vector valued quantity.
    pub fn wrap(inner: Q) -> Self {
        let components = inner
            .value()
            .iter()
            .enumerate()
            .map(|(index, &value)| Component::new(index, value))
            .collect();
        Self { inner, components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn value(&self) -> &[f64] {
        self.inner.value()
    }

    pub fn last_value(&self) -> Option<&[f64]> {
        self.inner.last_value()
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    pub fn into_inner(self) -> Q {
        self.inner
    }

    /// The proxy for entry `index`.
    pub fn component(&self, index: usize) -> Result<&Component> {
        self.components.get(index).ok_or(MvnError::IndexOutOfBounds {
            index,
            len: self.len(),
        })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Store a new value and notify the proxies of the entries that changed.
    ///
    /// Returns the number of proxies that were notified.
    pub fn set_value(&mut self, value: Vec<f64>) -> Result<usize> {
        check_dim("vector value", self.len(), value.len())?;
        self.inner.set_value(value);
        check_dim("stored vector value", self.len(), self.inner.value().len())?;
        Ok(self.sync())
    }

    /// Store a value that differs from the current one in entry `index` only.
    pub fn set_component(&mut self, index: usize, value: f64) -> Result<usize> {
        if index >= self.len() {
            return Err(MvnError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        let mut new_value = self.value().to_vec();
        new_value[index] = value;
        self.set_value(new_value)
    }

    /// Roll back the most recent `set_value`.
    ///
    /// Only the proxies whose value differs from the restored one are
    /// notified. Without a previous value this does nothing.
    pub fn revert(&mut self) -> usize {
        if self.inner.last_value().is_none() {
            return 0;
        }
        self.inner.revert();
        self.sync()
    }

    fn sync(&self) -> usize {
        debug_assert_eq!(self.inner.value().len(), self.components.len());
        self.components
            .iter()
            .zip(self.inner.value())
            .filter(|(component, value)| component.sync(**value))
            .count()
    }
}
