//! One-directional propagation from a master property to slave properties.
//!
//! A [`Bond`] watches a readable master and writes
//! `transformer.transform(master_value)` into its slave:
//!
//! ```
//! use std::rc::Rc;
//! use vigil_core::Identity;
//! use vigil_property::{Bond, ReadableProperty, SimpleProperty, WritableProperty};
//!
//! let master = SimpleProperty::shared(7);
//! let slave = SimpleProperty::shared(0);
//! let _bond = Bond::new(master.clone(), Rc::new(Identity), slave.clone());
//! assert_eq!(slave.value(), 7);
//!
//! master.set_value(8);
//! assert_eq!(slave.value(), 8);
//! ```
//!
//! # Invariants
//!
//! 1. Immediately after construction, and after every master change, the
//!    slave holds `transform(master.value())`.
//! 2. The bond writes to the slave on every master change, even when the
//!    transformed value is unchanged. Suppressing redundant writes is the
//!    slave's own equality check.
//! 3. Cycles (A feeds B, B feeds A) terminate through the per-property
//!    re-entrancy guard of [`SimpleProperty`](crate::SimpleProperty).
//! 4. Dropping a bond detaches it from the master. `dispose()` does the same
//!    and, with deep dispose, also disposes master, transformer and slave.
//!
//! # Failure Modes
//!
//! - Transformer panic: unwinds through the master's `set_value` call.
//! - Disposal error during deep dispose: returned immediately; components
//!   after the failing one are not disposed.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result, Transformer, dispose_if};

use crate::composite::CompositeWritableProperty;
use crate::property::{ReadableProperty, WritableProperty};
use crate::support::PropertyListener;

/// Listener registered on the master; pushes transformed values to the slave.
struct MasterListener<M, S> {
    transformer: Rc<dyn Transformer<M, S>>,
    slave: Rc<dyn WritableProperty<S>>,
}

impl<M: Clone, S> PropertyListener<M> for MasterListener<M, S> {
    fn value_changed(&self, _old: &M, new: &M) {
        self.slave.set_value(self.transformer.transform(new.clone()));
    }
}

/// Couples a master property through a transformer to a slave property.
pub struct Bond<M: 'static, S: 'static> {
    master: Rc<dyn ReadableProperty<M>>,
    transformer: Rc<dyn Transformer<M, S>>,
    slave: Rc<dyn WritableProperty<S>>,
    listener: Rc<dyn PropertyListener<M>>,
    attached: Cell<bool>,
    deep_dispose: Cell<bool>,
}

impl<M: 'static, S: 'static> fmt::Debug for Bond<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bond")
            .field("attached", &self.attached.get())
            .field("deep_dispose", &self.deep_dispose.get())
            .finish()
    }
}

impl<M: Clone + 'static, S: 'static> Bond<M, S> {
    /// Bind `slave` to `master` through `transformer` and push the initial
    /// value right away.
    pub fn new(
        master: Rc<dyn ReadableProperty<M>>,
        transformer: Rc<dyn Transformer<M, S>>,
        slave: Rc<dyn WritableProperty<S>>,
    ) -> Self {
        let listener: Rc<dyn PropertyListener<M>> = Rc::new(MasterListener {
            transformer: Rc::clone(&transformer),
            slave: Rc::clone(&slave),
        });
        master.add_value_change_listener(Rc::clone(&listener));
        slave.set_value(transformer.transform(master.value()));

        Self {
            master,
            transformer,
            slave,
            listener,
            attached: Cell::new(true),
            deep_dispose: Cell::new(false),
        }
    }
}

impl<M: Clone + 'static, S: Clone + 'static> Bond<M, S> {
    /// Bind several slaves at once. The transformed value is broadcast to
    /// every slave, in order, through a [`CompositeWritableProperty`].
    pub fn with_slaves(
        master: Rc<dyn ReadableProperty<M>>,
        transformer: Rc<dyn Transformer<M, S>>,
        slaves: impl IntoIterator<Item = Rc<dyn WritableProperty<S>>>,
    ) -> Self {
        let composite = CompositeWritableProperty::new();
        for slave in slaves {
            composite.add_property(slave);
        }
        Self::new(master, transformer, Rc::new(composite))
    }
}

impl<M: 'static, S: 'static> Bond<M, S> {
    /// Whether the bond is still registered on its master.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Whether `dispose()` also disposes master, transformer and slave.
    #[must_use]
    pub fn is_deep_dispose(&self) -> bool {
        self.deep_dispose.get()
    }

    pub fn set_deep_dispose(&self, deep: bool) {
        self.deep_dispose.set(deep);
    }

    #[must_use]
    pub fn master(&self) -> &Rc<dyn ReadableProperty<M>> {
        &self.master
    }

    #[must_use]
    pub fn slave(&self) -> &Rc<dyn WritableProperty<S>> {
        &self.slave
    }

    fn detach(&self) {
        if self.attached.replace(false) {
            self.master.remove_value_change_listener(&self.listener);
        }
    }
}

impl<M: 'static, S: 'static> Disposable for Bond<M, S> {
    fn dispose(&self) -> Result<()> {
        self.detach();
        let deep = self.deep_dispose.get();
        tracing::debug!(message = "bond.dispose", deep);
        if deep {
            dispose_if(self.master.as_disposable())?;
            dispose_if(self.transformer.as_disposable())?;
            dispose_if(self.slave.as_disposable())?;
        }
        Ok(())
    }
}

impl<M: 'static, S: 'static> Drop for Bond<M, S> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::SimpleProperty;
    use std::cell::RefCell;
    use vigil_core::{Identity, VigilError};

    #[test]
    fn initial_value_is_pushed() {
        let master = SimpleProperty::shared(7);
        let slave = SimpleProperty::shared(0);
        let _bond = Bond::new(master.clone(), Rc::new(Identity), slave.clone());
        assert_eq!(slave.value(), 7);
    }

    #[test]
    fn master_changes_are_transformed() {
        let master = SimpleProperty::shared(2);
        let slave = SimpleProperty::shared(String::new());
        let _bond = Bond::new(
            master.clone(),
            Rc::new(|n: i32| format!("{n} items")),
            slave.clone(),
        );
        assert_eq!(slave.value(), "2 items");
        master.set_value(3);
        assert_eq!(slave.value(), "3 items");
    }

    #[test]
    fn pushes_even_when_transformed_value_repeats() {
        struct CountingSlave {
            writes: Cell<u32>,
        }
        impl WritableProperty<bool> for CountingSlave {
            fn set_value(&self, _value: bool) {
                self.writes.set(self.writes.get() + 1);
            }
        }

        let master = SimpleProperty::shared(1);
        let slave = Rc::new(CountingSlave {
            writes: Cell::new(0),
        });
        let _bond = Bond::new(master.clone(), Rc::new(|n: i32| n > 0), slave.clone());
        master.set_value(2);
        master.set_value(3);
        assert_eq!(slave.writes.get(), 3, "initial push plus two changes");
    }

    #[test]
    fn cycle_converges() {
        let a = SimpleProperty::shared(0);
        let b = SimpleProperty::shared(0);
        let _ab = Bond::new(a.clone(), Rc::new(|n: i32| n + 1), b.clone());
        let _ba = Bond::new(b.clone(), Rc::new(|n: i32| n + 1), a.clone());

        a.set_value(10);
        assert_eq!(a.value(), 10);
        assert_eq!(b.value(), 11);
    }

    #[test]
    fn multiple_slaves_receive_same_value() {
        let master = SimpleProperty::shared(4);
        let s1 = SimpleProperty::shared(0);
        let s2 = SimpleProperty::shared(0);
        let slaves: Vec<Rc<dyn WritableProperty<i32>>> = vec![s1.clone(), s2.clone()];
        let _bond = Bond::with_slaves(master.clone(), Rc::new(|n: i32| n * 10), slaves);
        assert_eq!((s1.value(), s2.value()), (40, 40));

        master.set_value(5);
        assert_eq!((s1.value(), s2.value()), (50, 50));
    }

    #[test]
    fn dispose_detaches() {
        let master = SimpleProperty::shared(1);
        let slave = SimpleProperty::shared(0);
        let bond = Bond::new(master.clone(), Rc::new(Identity), slave.clone());
        bond.dispose().unwrap();
        assert!(!bond.is_attached());
        assert_eq!(master.listener_count(), 0);

        master.set_value(2);
        assert_eq!(slave.value(), 1);
    }

    #[test]
    fn drop_detaches() {
        let master = SimpleProperty::shared(1);
        let slave = SimpleProperty::shared(0);
        drop(Bond::new(master.clone(), Rc::new(Identity), slave.clone()));
        master.set_value(2);
        assert_eq!(slave.value(), 1);
    }

    #[test]
    fn deep_dispose_reaches_components() {
        let master = SimpleProperty::shared(1);
        let slave = SimpleProperty::shared(0);
        let observed = Rc::new(Cell::new(0));
        let o = Rc::clone(&observed);
        slave.add_value_change_listener(Rc::new(move |_: &i32, _: &i32| o.set(o.get() + 1)));

        let bond = Bond::new(master.clone(), Rc::new(Identity), slave.clone());
        bond.set_deep_dispose(true);
        bond.dispose().unwrap();
        assert_eq!(observed.get(), 1);
        assert_eq!(slave.listener_count(), 0, "slave listeners released");
    }

    #[test]
    fn deep_dispose_stops_at_first_failure() {
        struct FailingTransformer;
        impl Transformer<i32, i32> for FailingTransformer {
            fn transform(&self, input: i32) -> i32 {
                input
            }
            fn as_disposable(&self) -> Option<&dyn Disposable> {
                Some(self)
            }
        }
        impl Disposable for FailingTransformer {
            fn dispose(&self) -> Result<()> {
                Err(VigilError::disposal("transformer", "busy"))
            }
        }

        let master = SimpleProperty::shared(1);
        let slave = SimpleProperty::shared(0);
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        master.add_value_change_listener(Rc::new(move |_: &i32, _: &i32| *h.borrow_mut() += 1));
        let h = Rc::clone(&hits);
        slave.add_value_change_listener(Rc::new(move |_: &i32, _: &i32| *h.borrow_mut() += 1));

        let bond = Bond::new(master.clone(), Rc::new(FailingTransformer), slave.clone());
        bond.set_deep_dispose(true);
        assert!(bond.dispose().is_err());
        assert_eq!(master.listener_count(), 0, "master was disposed first");
        assert_eq!(slave.listener_count(), 1, "slave disposal never attempted");
    }
}
