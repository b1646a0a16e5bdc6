//! Result sinks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result};

use crate::data_provider::DataProvider;
use crate::trigger::{ListenerErrorPolicy, Trigger, TriggerEvent, TriggerListener, TriggerSupport};

/// Consumes validation results.
///
/// Any `Fn(&T) -> Result<()>` closure is a result handler. An error returned
/// here aborts the rest of the pipeline run and surfaces to whoever fired it.
pub trait ResultHandler<T> {
    fn handle_result(&self, result: &T) -> Result<()>;

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

impl<T, F> ResultHandler<T> for F
where
    F: Fn(&T) -> Result<()>,
{
    fn handle_result(&self, result: &T) -> Result<()> {
        self(result)
    }
}

/// Stores the latest result and re-emits it as a data provider and trigger.
///
/// Registering one collector as a result handler of validator A and as a
/// trigger and data provider of validator B chains the two: every result A
/// produces runs B over that result.
pub struct ResultCollector<T> {
    last: RefCell<T>,
    support: TriggerSupport,
}

impl<T: fmt::Debug> fmt::Debug for ResultCollector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCollector")
            .field("last", &*self.last.borrow())
            .field("listeners", &self.support.len())
            .finish()
    }
}

impl<T: Default> Default for ResultCollector<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> ResultCollector<T> {
    /// Collector reporting `initial` until the first result arrives.
    pub fn new(initial: T) -> Self {
        Self {
            last: RefCell::new(initial),
            support: TriggerSupport::new(),
        }
    }

    pub fn set_policy(&self, policy: Rc<dyn ListenerErrorPolicy>) {
        self.support.set_policy(policy);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.support.len()
    }
}

impl<T: Clone> ResultHandler<T> for ResultCollector<T> {
    fn handle_result(&self, result: &T) -> Result<()> {
        *self.last.borrow_mut() = result.clone();
        self.support.fire_trigger_event(&TriggerEvent::new("result_collector"))
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<T: Clone> DataProvider<T> for ResultCollector<T> {
    fn data(&self) -> T {
        self.last.borrow().clone()
    }
}

impl<T> Trigger for ResultCollector<T> {
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

impl<T> Disposable for ResultCollector<T> {
    fn dispose(&self) -> Result<()> {
        self.support.clear();
        Ok(())
    }
}
