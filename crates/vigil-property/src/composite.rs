//! Aggregate properties over several sub-properties.
//!
//! - [`CompositeReadableProperty`] exposes the ordered `Vec` of its
//!   sub-properties' values and recomputes it on every sub-change.
//! - [`CompositeWritableProperty`] broadcasts one written value to every
//!   sub-property.
//!
//! # Invariants
//!
//! 1. A readable composite's value always equals the sub-values in insertion
//!    order. It is rebuilt from scratch on every change, add and removal, and
//!    each rebuild notifies at most once.
//! 2. A rebuild notifies only when some element differs from the previous
//!    list under the null/NaN-aware equality, or the length changed.
//! 3. A writable composite applies its last value to a sub-property as soon as
//!    it is added. Removing a sub-property leaves its value untouched.
//! 4. Deep dispose is off by default for both composites.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{Disposable, Result, dispose_if};

use crate::equality::values_equal;
use crate::property::{ReadableProperty, WritableProperty};
use crate::support::{PropertyListener, PropertySupport};

// ---------------------------------------------------------------------------
// CompositeReadableProperty<T>
// ---------------------------------------------------------------------------

/// Listener registered on every sub-property of a readable composite.
struct SubPropertyListener<T: 'static> {
    owner: Weak<CompositeReadableProperty<T>>,
}

impl<T: Clone + PartialEq + 'static> PropertyListener<T> for SubPropertyListener<T> {
    fn value_changed(&self, _old: &T, _new: &T) {
        if let Some(owner) = self.owner.upgrade() {
            owner.update_value();
        }
    }
}

/// Readable property whose value is the ordered list of its sub-properties'
/// values.
///
/// Constructed behind an `Rc` because sub-properties notify it through a weak
/// back-reference.
pub struct CompositeReadableProperty<T: 'static> {
    properties: RefCell<Vec<Rc<dyn ReadableProperty<T>>>>,
    value: RefCell<Vec<T>>,
    support: PropertySupport<Vec<T>>,
    listener: Rc<dyn PropertyListener<T>>,
    deep_dispose: Cell<bool>,
}

impl<T: fmt::Debug + 'static> fmt::Debug for CompositeReadableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeReadableProperty")
            .field("value", &*self.value.borrow())
            .field("listeners", &self.support.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> CompositeReadableProperty<T> {
    /// Create an empty composite; its value is an empty `Vec`.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak| {
            let listener: Rc<dyn PropertyListener<T>> = Rc::new(SubPropertyListener {
                owner: Weak::clone(weak),
            });
            Self {
                properties: RefCell::new(Vec::new()),
                value: RefCell::new(Vec::new()),
                support: PropertySupport::new(),
                listener,
                deep_dispose: Cell::new(false),
            }
        })
    }

    /// Create a composite over `properties`, in iteration order.
    #[must_use]
    pub fn with_properties(
        properties: impl IntoIterator<Item = Rc<dyn ReadableProperty<T>>>,
    ) -> Rc<Self> {
        let composite = Self::new();
        for property in properties {
            composite.add_property(property);
        }
        composite
    }

    /// Append a sub-property and recompute.
    pub fn add_property(&self, property: Rc<dyn ReadableProperty<T>>) {
        property.add_value_change_listener(Rc::clone(&self.listener));
        self.properties.borrow_mut().push(property);
        self.update_value();
    }

    /// Remove the first registration of `property` and recompute. Returns
    /// whether it was found.
    pub fn remove_property(&self, property: &Rc<dyn ReadableProperty<T>>) -> bool {
        let removed = {
            let mut properties = self.properties.borrow_mut();
            properties
                .iter()
                .position(|p| Rc::ptr_eq(p, property))
                .map(|idx| properties.remove(idx))
        };
        match removed {
            Some(removed) => {
                removed.remove_value_change_listener(&self.listener);
                self.update_value();
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current sub-properties.
    #[must_use]
    pub fn properties(&self) -> Vec<Rc<dyn ReadableProperty<T>>> {
        self.properties.borrow().clone()
    }

    /// Number of sub-properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.borrow().is_empty()
    }

    pub fn set_deep_dispose(&self, deep: bool) {
        self.deep_dispose.set(deep);
    }

    /// Rebuild the value from every sub-property and notify once if it
    /// changed.
    fn update_value(&self) {
        let snapshot = self.properties();
        let new: Vec<T> = snapshot.iter().map(|p| p.value()).collect();
        let old = self.value.replace(new.clone());
        let unchanged =
            old.len() == new.len() && old.iter().zip(&new).all(|(a, b)| values_equal(a, b));
        if !unchanged {
            self.support.notify(&old, &new);
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReadableProperty<Vec<T>> for CompositeReadableProperty<T> {
    fn value(&self) -> Vec<T> {
        self.value.borrow().clone()
    }

    fn add_value_change_listener(&self, listener: Rc<dyn PropertyListener<Vec<T>>>) {
        self.support.add(listener);
    }

    fn remove_value_change_listener(&self, listener: &Rc<dyn PropertyListener<Vec<T>>>) {
        self.support.remove(listener);
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<T: 'static> Disposable for CompositeReadableProperty<T> {
    /// Detaches from every sub-property and drops own listeners. With deep
    /// dispose, disposes the sub-properties too.
    fn dispose(&self) -> Result<()> {
        let properties = std::mem::take(&mut *self.properties.borrow_mut());
        for property in &properties {
            property.remove_value_change_listener(&self.listener);
        }
        self.support.clear();
        if self.deep_dispose.get() {
            for property in &properties {
                dispose_if(property.as_disposable())?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CompositeWritableProperty<T>
// ---------------------------------------------------------------------------

/// Writable property that forwards every written value to all of its
/// sub-properties.
pub struct CompositeWritableProperty<T> {
    properties: RefCell<Vec<Rc<dyn WritableProperty<T>>>>,
    value: RefCell<Option<T>>,
    deep_dispose: Cell<bool>,
}

impl<T: fmt::Debug> fmt::Debug for CompositeWritableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeWritableProperty")
            .field("value", &*self.value.borrow())
            .field("properties", &self.properties.borrow().len())
            .finish()
    }
}

impl<T: Clone> Default for CompositeWritableProperty<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> CompositeWritableProperty<T> {
    /// Create a composite with no value yet; sub-properties added before the
    /// first write are left untouched.
    #[must_use]
    pub fn new() -> Self {
        Self {
            properties: RefCell::new(Vec::new()),
            value: RefCell::new(None),
            deep_dispose: Cell::new(false),
        }
    }

    /// Create a composite whose initial value is applied to every
    /// sub-property as it is added.
    #[must_use]
    pub fn with_value(initial: T) -> Self {
        let composite = Self::new();
        *composite.value.borrow_mut() = Some(initial);
        composite
    }

    /// Append a sub-property and apply the last value to it.
    pub fn add_property(&self, property: Rc<dyn WritableProperty<T>>) {
        self.properties.borrow_mut().push(Rc::clone(&property));
        let current = self.value.borrow().clone();
        if let Some(value) = current {
            property.set_value(value);
        }
    }

    /// Remove the first registration of `property`. Its value is not
    /// reverted.
    pub fn remove_property(&self, property: &Rc<dyn WritableProperty<T>>) -> bool {
        let mut properties = self.properties.borrow_mut();
        match properties.iter().position(|p| Rc::ptr_eq(p, property)) {
            Some(idx) => {
                properties.remove(idx);
                true
            }
            None => false,
        }
    }

    /// The last value written, if any.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.value.borrow().clone()
    }

    /// Snapshot of the current sub-properties.
    #[must_use]
    pub fn properties(&self) -> Vec<Rc<dyn WritableProperty<T>>> {
        self.properties.borrow().clone()
    }

    pub fn set_deep_dispose(&self, deep: bool) {
        self.deep_dispose.set(deep);
    }
}

impl<T: Clone + 'static> WritableProperty<T> for CompositeWritableProperty<T> {
    fn set_value(&self, value: T) {
        *self.value.borrow_mut() = Some(value.clone());
        for property in self.properties() {
            property.set_value(value.clone());
        }
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<T> Disposable for CompositeWritableProperty<T> {
    /// Forgets every sub-property. With deep dispose, disposes them first.
    fn dispose(&self) -> Result<()> {
        let properties = std::mem::take(&mut *self.properties.borrow_mut());
        if self.deep_dispose.get() {
            for property in &properties {
                dispose_if(property.as_disposable())?;
            }
        }
        Ok(())
    }
}
