//! Adapters between observable properties and the pipeline.
//!
//! - [`PropertyChangeTrigger`]: fires whenever a readable property changes.
//! - [`PropertyDataProvider`]: provides a readable property's current value.
//! - [`PropertyResultHandler`]: writes results into a writable property.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result};
use vigil_property::{PropertyListener, ReadableProperty, WritableProperty};

use crate::data_provider::DataProvider;
use crate::fan::Fan;
use crate::result_handler::ResultHandler;
use crate::trigger::{ListenerErrorPolicy, Trigger, TriggerEvent, TriggerListener, TriggerSupport};

// ---------------------------------------------------------------------------
// PropertyChangeTrigger<T>
// ---------------------------------------------------------------------------

/// Forwards property changes to the trigger listeners.
struct ChangeForwarder {
    support: Rc<TriggerSupport>,
}

impl<T> PropertyListener<T> for ChangeForwarder {
    fn value_changed(&self, _old: &T, _new: &T) {
        // set_value cannot fail, so the error stops here.
        if let Err(err) = self
            .support
            .fire_trigger_event(&TriggerEvent::new("property_change"))
        {
            tracing::error!(
                message = "trigger.property_change_failed",
                kind = err.kind(),
                error = %err,
            );
        }
    }
}

/// Trigger that fires after every effective change of a readable property.
///
/// Listener errors cannot travel back through `set_value`; whatever the error
/// policy returns is logged with `tracing::error!`. Dropping the trigger
/// detaches it from the property.
pub struct PropertyChangeTrigger<T: 'static> {
    property: Rc<dyn ReadableProperty<T>>,
    support: Rc<TriggerSupport>,
    forwarder: Rc<dyn PropertyListener<T>>,
    attached: Cell<bool>,
}

impl<T: 'static> fmt::Debug for PropertyChangeTrigger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangeTrigger")
            .field("attached", &self.attached.get())
            .field("listeners", &self.support.len())
            .finish()
    }
}

impl<T: 'static> PropertyChangeTrigger<T> {
    pub fn new(property: Rc<dyn ReadableProperty<T>>) -> Self {
        let support = Rc::new(TriggerSupport::new());
        let forwarder: Rc<dyn PropertyListener<T>> = Rc::new(ChangeForwarder {
            support: Rc::clone(&support),
        });
        property.add_value_change_listener(Rc::clone(&forwarder));
        Self {
            property,
            support,
            forwarder,
            attached: Cell::new(true),
        }
    }

    pub fn set_policy(&self, policy: Rc<dyn ListenerErrorPolicy>) {
        self.support.set_policy(policy);
    }

    #[must_use]
    pub fn property(&self) -> &Rc<dyn ReadableProperty<T>> {
        &self.property
    }

    fn detach(&self) {
        if self.attached.replace(false) {
            self.property.remove_value_change_listener(&self.forwarder);
        }
    }
}

impl<T: 'static> Trigger for PropertyChangeTrigger<T> {
    fn add_trigger_listener(&self, listener: Rc<dyn TriggerListener>) {
        self.support.add(listener);
    }

    fn remove_trigger_listener(&self, listener: &Rc<dyn TriggerListener>) {
        self.support.remove(listener);
    }

    fn fire_trigger_event(&self, event: &TriggerEvent) -> Result<()> {
        self.support.fire_trigger_event(event)
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<T: 'static> Disposable for PropertyChangeTrigger<T> {
    /// Detaches from the property and drops every trigger listener.
    fn dispose(&self) -> Result<()> {
        self.detach();
        self.support.clear();
        Ok(())
    }
}

impl<T: 'static> Drop for PropertyChangeTrigger<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

// ---------------------------------------------------------------------------
// PropertyDataProvider<T>
// ---------------------------------------------------------------------------

/// Provides the current value of a readable property.
pub struct PropertyDataProvider<T> {
    property: Rc<dyn ReadableProperty<T>>,
}

impl<T> fmt::Debug for PropertyDataProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDataProvider").finish_non_exhaustive()
    }
}

impl<T> PropertyDataProvider<T> {
    pub fn new(property: Rc<dyn ReadableProperty<T>>) -> Self {
        Self { property }
    }
}

impl<T> DataProvider<T> for PropertyDataProvider<T> {
    fn data(&self) -> T {
        self.property.value()
    }
}

// ---------------------------------------------------------------------------
// PropertyResultHandler<T>
// ---------------------------------------------------------------------------

/// Writes every result into a writable property.
///
/// A `Fan::Each` is written as is. The values of a `Fan::All` are written in
/// order, so the property ends up holding the last one; collapse the list in
/// the result-handler-input chain first when a single verdict is wanted.
pub struct PropertyResultHandler<T> {
    property: Rc<dyn WritableProperty<T>>,
}

impl<T> fmt::Debug for PropertyResultHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyResultHandler").finish_non_exhaustive()
    }
}

impl<T> PropertyResultHandler<T> {
    pub fn new(property: Rc<dyn WritableProperty<T>>) -> Self {
        Self { property }
    }
}

impl<T: Clone> ResultHandler<Fan<T>> for PropertyResultHandler<T> {
    fn handle_result(&self, result: &Fan<T>) -> Result<()> {
        for value in result {
            self.property.set_value(value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use vigil_core::VigilError;
    use vigil_property::SimpleProperty;

    #[test]
    fn change_trigger_fires_on_effective_changes() {
        let prop = SimpleProperty::shared(1);
        let trigger = PropertyChangeTrigger::new(prop.clone());
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        trigger.add_trigger_listener(Rc::new(move |event: &TriggerEvent| -> Result<()> {
            assert_eq!(event.source(), "property_change");
            h.set(h.get() + 1);
            Ok(())
        }));

        prop.set_value(2);
        prop.set_value(2);
        prop.set_value(3);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn change_trigger_swallows_listener_errors() {
        let prop = SimpleProperty::shared(1);
        let trigger = PropertyChangeTrigger::new(prop.clone());
        trigger.add_trigger_listener(Rc::new(|_: &TriggerEvent| -> Result<()> {
            Err(VigilError::listener("nope"))
        }));
        prop.set_value(2);
        assert_eq!(prop.value(), 2);
    }

    #[test]
    fn explicit_fire_returns_listener_errors() {
        let prop = SimpleProperty::shared(1);
        let trigger = PropertyChangeTrigger::new(prop.clone());
        trigger.add_trigger_listener(Rc::new(|_: &TriggerEvent| -> Result<()> {
            Err(VigilError::listener("nope"))
        }));
        let err = trigger
            .fire_trigger_event(&TriggerEvent::manual())
            .unwrap_err();
        assert_eq!(err.kind(), "listener");
    }

    #[test]
    fn change_trigger_detaches_on_drop_and_dispose() {
        let prop = SimpleProperty::shared(1);
        let trigger = PropertyChangeTrigger::new(prop.clone());
        assert_eq!(prop.listener_count(), 1);
        trigger.dispose().unwrap();
        assert_eq!(prop.listener_count(), 0);

        drop(PropertyChangeTrigger::new(prop.clone()));
        assert_eq!(prop.listener_count(), 0);
    }

    #[test]
    fn data_provider_reads_current_value() {
        let prop = SimpleProperty::shared("a".to_owned());
        let provider = PropertyDataProvider::new(prop.clone());
        assert_eq!(provider.data(), "a");
        prop.set_value("b".into());
        assert_eq!(provider.data(), "b");
    }

    #[test]
    fn result_handler_writes_each_value() {
        let prop = SimpleProperty::shared(0);
        let writes = Rc::new(RefCell::new(Vec::new()));
        let w = Rc::clone(&writes);
        prop.add_value_change_listener(Rc::new(move |_: &i32, new: &i32| w.borrow_mut().push(*new)));

        let handler = PropertyResultHandler::new(prop.clone());
        handler.handle_result(&Fan::Each(4)).unwrap();
        handler.handle_result(&Fan::All(vec![5, 6])).unwrap();
        assert_eq!(prop.value(), 6);
        assert_eq!(*writes.borrow(), vec![4, 5, 6]);
    }
}
