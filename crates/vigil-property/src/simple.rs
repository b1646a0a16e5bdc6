//! Concrete value cells: [`SimpleProperty`] and [`ReadOnlyProperty`].
//!
//! # Invariants
//!
//! 1. `value()` returns the last stored value.
//! 2. Listeners see `(old, new)` only when the values differ under the
//!    null/NaN-aware equality, unless the write is forced.
//! 3. `version()` increments once per notified change.
//! 4. While a `set_value` on a property is on the stack, further `set_value`
//!    calls on that same property are ignored. This is what makes bond cycles
//!    (A feeds B, B feeds A) converge.
//!
//! # Failure Modes
//!
//! - Listener panic: the re-entrancy flag is reset by a drop guard, so the
//!   property stays writable after the panic unwinds.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result};

use crate::property::{ReadableProperty, WritableProperty};
use crate::support::{PropertyListener, PropertySupport};

/// Clears the "currently applying" flag when dropped.
struct ApplyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ApplyGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for ApplyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

// ---------------------------------------------------------------------------
// SimpleProperty<T>
// ---------------------------------------------------------------------------

/// A readable and writable observable value.
///
/// Share it with `Rc`; an `Rc<SimpleProperty<T>>` coerces to both
/// `Rc<dyn ReadableProperty<T>>` and `Rc<dyn WritableProperty<T>>`.
pub struct SimpleProperty<T> {
    value: RefCell<T>,
    support: PropertySupport<T>,
    applying: Cell<bool>,
    version: Cell<u64>,
}

impl<T: fmt::Debug> fmt::Debug for SimpleProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleProperty")
            .field("value", &*self.value.borrow())
            .field("listeners", &self.support.len())
            .field("version", &self.version.get())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for SimpleProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> SimpleProperty<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: RefCell::new(initial),
            support: PropertySupport::new(),
            applying: Cell::new(false),
            version: Cell::new(0),
        }
    }

    /// Convenience for `Rc::new(SimpleProperty::new(initial))`.
    #[must_use]
    pub fn shared(initial: T) -> Rc<Self> {
        Rc::new(Self::new(initial))
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` and notify listeners even if it equals the current value.
    pub fn set_value_forced(&self, value: T) {
        self.apply(value, true);
    }

    /// Number of notified changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.support.len()
    }

    fn apply(&self, value: T, force: bool) {
        let Some(_guard) = ApplyGuard::enter(&self.applying) else {
            tracing::trace!(message = "property.reentrant_set", forced = force);
            return;
        };

        let old = self.value.replace(value);
        let new = self.value.borrow().clone();
        let notified = if force {
            self.support.notify(&old, &new);
            true
        } else {
            self.support.maybe_notify(&old, &new)
        };
        if notified {
            self.version.set(self.version.get() + 1);
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReadableProperty<T> for SimpleProperty<T> {
    fn value(&self) -> T {
        self.value.borrow().clone()
    }

    fn add_value_change_listener(&self, listener: Rc<dyn PropertyListener<T>>) {
        self.support.add(listener);
    }

    fn remove_value_change_listener(&self, listener: &Rc<dyn PropertyListener<T>>) {
        self.support.remove(listener);
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<T: Clone + PartialEq + 'static> WritableProperty<T> for SimpleProperty<T> {
    fn set_value(&self, value: T) {
        self.apply(value, false);
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<T> Disposable for SimpleProperty<T> {
    /// Drops every listener registration.
    fn dispose(&self) -> Result<()> {
        self.support.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReadOnlyProperty<T>
// ---------------------------------------------------------------------------

/// Read-only view over another readable property.
///
/// Hands out read access (value and listeners) without exposing the write
/// side of the wrapped property.
pub struct ReadOnlyProperty<T> {
    inner: Rc<dyn ReadableProperty<T>>,
}

impl<T> Clone for ReadOnlyProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ReadOnlyProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyProperty").finish_non_exhaustive()
    }
}

impl<T> ReadOnlyProperty<T> {
    pub fn new(inner: Rc<dyn ReadableProperty<T>>) -> Self {
        Self { inner }
    }
}

impl<T> ReadableProperty<T> for ReadOnlyProperty<T> {
    fn value(&self) -> T {
        self.inner.value()
    }

    fn add_value_change_listener(&self, listener: Rc<dyn PropertyListener<T>>) {
        self.inner.add_value_change_listener(listener);
    }

    fn remove_value_change_listener(&self, listener: &Rc<dyn PropertyListener<T>>) {
        self.inner.remove_value_change_listener(listener);
    }
}
