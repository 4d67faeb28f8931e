use std::cell::Cell;
use std::rc::Rc;

use crate::shield::{Component, SubscriptionId};

/// A value computed from some [`Component`]s that is only recomputed after
/// one of them changed.
///
/// The subscriptions are removed again when the cache is dropped.
#[derive(Debug)]
pub struct Cached<T> {
    value: Option<T>,
    stale: Rc<Cell<bool>>,
    recomputations: u64,
    subscriptions: Vec<(Component, SubscriptionId)>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self {
            value: None,
            stale: Rc::new(Cell::new(false)),
            recomputations: 0,
            subscriptions: Vec::new(),
        }
    }
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depending_on<'a>(components: impl IntoIterator<Item = &'a Component>) -> Self {
        let mut cached = Self::new();
        for component in components {
            cached.depend_on(component);
        }
        cached
    }

    pub fn depend_on(&mut self, component: &Component) {
        let stale = self.stale.clone();
        let id = component.subscribe(move |_| stale.set(true));
        self.subscriptions.push((component.clone(), id));
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some() && !self.stale.get()
    }

    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Number of times the value was computed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn get_or_compute<F: FnOnce() -> T>(&mut self, compute: F) -> &T {
        match self.get_or_try_compute(|| Ok::<T, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn get_or_try_compute<E, F: FnOnce() -> Result<T, E>>(
        &mut self,
        compute: F,
    ) -> Result<&T, E> {
        let stale = self.stale.replace(false);
        let value = match self.value.take() {
            Some(value) if !stale => value,
            _ => {
                let value = compute()?;
                self.recomputations += 1;
                value
            }
        };
        Ok(self.value.insert(value))
    }
}

impl<T> Drop for Cached<T> {
    fn drop(&mut self) {
        for (component, id) in self.subscriptions.drain(..) {
            component.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShieldedVector;
    use pretty_assertions::assert_eq;

    #[test]
    fn recomputes_only_on_own_component() -> anyhow::Result<()> {
        let mut vec = ShieldedVector::new(vec![1., 2.]);
        let first = vec.component(0)?.clone();
        let mut cached = Cached::depending_on([&first]);

        assert_eq!(*cached.get_or_compute(|| first.value() * 10.), 10.);
        assert_eq!(*cached.get_or_compute(|| first.value() * 10.), 10.);
        assert_eq!(cached.recomputations(), 1);

        vec.set_component(1, 5.)?;
        assert!(cached.is_valid());
        assert_eq!(*cached.get_or_compute(|| first.value() * 10.), 10.);
        assert_eq!(cached.recomputations(), 1);

        vec.set_component(0, 3.)?;
        assert!(!cached.is_valid());
        assert_eq!(*cached.get_or_compute(|| first.value() * 10.), 30.);
        assert_eq!(cached.recomputations(), 2);

        vec.revert();
        assert_eq!(*cached.get_or_compute(|| first.value() * 10.), 10.);
        assert_eq!(cached.recomputations(), 3);
        Ok(())
    }

    #[test]
    fn failed_compute_is_retried() {
        let mut cached: Cached<f64> = Cached::new();
        let res: Result<&f64, &str> = cached.get_or_try_compute(|| Err("boom"));
        assert!(res.is_err());
        assert_eq!(*cached.get_or_compute(|| 2.), 2.);
        assert_eq!(cached.recomputations(), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let vec = ShieldedVector::new(vec![1.]);
        let component = vec.component(0).unwrap().clone();
        {
            let _cached: Cached<f64> = Cached::depending_on([&component]);
            assert_eq!(component.subscriber_count(), 1);
        }
        assert_eq!(component.subscriber_count(), 0);
    }
}
