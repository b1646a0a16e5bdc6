//! Readable and writable property contracts.

use std::rc::Rc;

use vigil_core::Disposable;

use crate::support::PropertyListener;

/// An observable value cell that can be read and watched.
pub trait ReadableProperty<T> {
    /// The current cached value. Never recomputes and has no side effects.
    fn value(&self) -> T;

    /// Register a listener, notified after every effective value change.
    fn add_value_change_listener(&self, listener: Rc<dyn PropertyListener<T>>);

    /// Unregister a listener previously passed to
    /// [`add_value_change_listener`](Self::add_value_change_listener).
    fn remove_value_change_listener(&self, listener: &Rc<dyn PropertyListener<T>>);

    /// Disposal capability, if this property holds anything to release.
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// A value cell that can be written.
pub trait WritableProperty<T> {
    /// Store `value`, notifying listeners if it differs from the current one.
    fn set_value(&self, value: T);

    /// Disposal capability, if this property holds anything to release.
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// A property that is both readable and writable with the same value type.
pub trait ReadableWritableProperty<T>: ReadableProperty<T> + WritableProperty<T> {}

impl<T, P> ReadableWritableProperty<T> for P where P: ReadableProperty<T> + WritableProperty<T> {}
