//! Change listeners and the shared listener list used by every property.
//!
//! # Invariants
//!
//! 1. Listeners are notified in registration order.
//! 2. The list is snapshotted before each notification, so a listener may add
//!    or remove listeners (itself included) while being notified. Changes take
//!    effect from the next notification.
//! 3. Removal is by identity (`Rc` allocation), never by value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::equality::values_equal;

/// Receives `(old, new)` pairs when a property value changes.
///
/// Any `Fn(&T, &T)` closure is a listener.
pub trait PropertyListener<T> {
    fn value_changed(&self, old: &T, new: &T);
}

impl<T, F> PropertyListener<T> for F
where
    F: Fn(&T, &T),
{
    fn value_changed(&self, old: &T, new: &T) {
        self(old, new);
    }
}

/// Ordered listener list with equality-suppressed notification.
pub struct PropertySupport<T> {
    listeners: RefCell<Vec<Rc<dyn PropertyListener<T>>>>,
}

impl<T> Default for PropertySupport<T> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<T> fmt::Debug for PropertySupport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySupport")
            .field("listener_count", &self.len())
            .finish()
    }
}

impl<T> PropertySupport<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. The same listener may be registered twice and is
    /// then notified twice.
    pub fn add(&self, listener: Rc<dyn PropertyListener<T>>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Remove the first registration of `listener`. Returns whether one was
    /// found.
    pub fn remove(&self, listener: &Rc<dyn PropertyListener<T>>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(idx) => {
                listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Notify every listener, whether or not the values differ.
    pub fn notify(&self, old: &T, new: &T) {
        let snapshot: Vec<_> = self.listeners.borrow().clone();
        for listener in snapshot {
            listener.value_changed(old, new);
        }
    }
}

impl<T: PartialEq + 'static> PropertySupport<T> {
    /// Notify listeners only if `old` and `new` differ under
    /// [`values_equal`]. Returns whether a notification happened.
    pub fn maybe_notify(&self, old: &T, new: &T) -> bool {
        if values_equal(old, new) {
            return false;
        }
        self.notify(old, new);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Rc<dyn PropertyListener<i32>> {
        let log = Rc::clone(log);
        Rc::new(move |old: &i32, new: &i32| log.borrow_mut().push(format!("{tag}:{old}->{new}")))
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let support = PropertySupport::new();
        support.add(recorder(&log, "a"));
        support.add(recorder(&log, "b"));
        support.notify(&1, &2);
        assert_eq!(*log.borrow(), vec!["a:1->2", "b:1->2"]);
    }

    #[test]
    fn maybe_notify_suppresses_equal_values() {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let support = PropertySupport::<f64>::new();
        support.add(Rc::new(move |_: &f64, _: &f64| h.set(h.get() + 1)));
        assert!(!support.maybe_notify(&f64::NAN, &f64::NAN));
        assert!(!support.maybe_notify(&1.0, &1.0));
        assert!(support.maybe_notify(&1.0, &2.0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn remove_is_by_identity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let support = PropertySupport::new();
        let a = recorder(&log, "a");
        let twin = recorder(&log, "a");
        support.add(Rc::clone(&a));
        assert!(!support.remove(&twin));
        assert!(support.remove(&a));
        assert!(support.is_empty());
    }

    #[test]
    fn removing_during_notification_is_safe() {
        let support = Rc::new(PropertySupport::<i32>::new());
        let hits = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<Rc<dyn PropertyListener<i32>>>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&support);
        let own = Rc::clone(&slot);
        let h = Rc::clone(&hits);
        let self_removing: Rc<dyn PropertyListener<i32>> = Rc::new(move |_: &i32, _: &i32| {
            h.set(h.get() + 1);
            if let Some(me) = own.borrow().as_ref() {
                s.remove(me);
            }
        });
        *slot.borrow_mut() = Some(Rc::clone(&self_removing));
        support.add(self_removing);

        let h2 = Rc::clone(&hits);
        support.add(Rc::new(move |_: &i32, _: &i32| h2.set(h2.get() + 10)));

        support.notify(&0, &1);
        assert_eq!(hits.get(), 11, "snapshot still reaches later listeners");
        assert_eq!(support.len(), 1);

        support.notify(&1, &2);
        assert_eq!(hits.get(), 21);
        slot.borrow_mut().take();
    }
}
