//! Event sources that tell a validator to run.
//!
//! A [`Trigger`] holds trigger listeners and fires [`TriggerEvent`]s to them.
//! Concrete triggers embed a [`TriggerSupport`], which owns the listener list
//! and the [`ListenerErrorPolicy`] that decides what a failing listener does
//! to the rest of the delivery.
//!
//! # Invariants
//!
//! 1. Listeners are called in registration order over a snapshot of the list.
//! 2. With the default [`RethrowPolicy`], the first listener error ends the
//!    delivery and is returned to the caller of `fire_trigger_event`.
//! 3. The event carries no pipeline data; it only says "run now".

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result, VigilError};

/// Signal delivered to trigger listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerEvent {
    source: &'static str,
}

impl TriggerEvent {
    #[must_use]
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    /// Event used when a validator is run by hand.
    #[must_use]
    pub const fn manual() -> Self {
        Self::new("manual")
    }

    /// Short label of whatever fired the event, for logs.
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }
}

impl Default for TriggerEvent {
    fn default() -> Self {
        Self::manual()
    }
}

/// Receives trigger events.
///
/// Any `Fn(&TriggerEvent) -> Result<()>` closure is a listener.
pub trait TriggerListener {
    fn trigger_fired(&self, event: &TriggerEvent) -> Result<()>;
}

impl<F> TriggerListener for F
where
    F: Fn(&TriggerEvent) -> Result<()>,
{
    fn trigger_fired(&self, event: &TriggerEvent) -> Result<()> {
        self(event)
    }
}

/// Something that fires trigger events.
pub trait Trigger {
    fn add_trigger_listener(&self, listener: Rc<dyn TriggerListener>);

    /// Unregister the first registration of `listener`, compared by identity.
    fn remove_trigger_listener(&self, listener: &Rc<dyn TriggerListener>);

    /// Deliver `event` to the registered listeners, as if the underlying
    /// occurrence had just happened.
    fn fire_trigger_event(&self, event: &TriggerEvent) -> Result<()>;

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

// ---------------------------------------------------------------------------
// Error policies
// ---------------------------------------------------------------------------

/// Decides what happens when a trigger listener fails.
///
/// Returning `Err` stops delivery to the remaining listeners; returning
/// `Ok(())` moves on to the next one.
pub trait ListenerErrorPolicy {
    fn handle_error(&self, error: VigilError, event: &TriggerEvent) -> Result<()>;
}

/// Fail fast: hand the error back to whoever fired the trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct RethrowPolicy;

impl ListenerErrorPolicy for RethrowPolicy {
    fn handle_error(&self, error: VigilError, _event: &TriggerEvent) -> Result<()> {
        Err(error)
    }
}

/// Log the error and keep delivering.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndContinuePolicy;

impl ListenerErrorPolicy for LogAndContinuePolicy {
    fn handle_error(&self, error: VigilError, event: &TriggerEvent) -> Result<()> {
        tracing::warn!(
            message = "trigger.listener_error",
            source = event.source(),
            kind = error.kind(),
            error = %error,
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TriggerSupport
// ---------------------------------------------------------------------------

/// Listener list plus error policy, embedded by concrete triggers.
pub struct TriggerSupport {
    listeners: RefCell<Vec<Rc<dyn TriggerListener>>>,
    policy: RefCell<Rc<dyn ListenerErrorPolicy>>,
}

impl Default for TriggerSupport {
    fn default() -> Self {
        Self::with_policy(Rc::new(RethrowPolicy))
    }
}

impl fmt::Debug for TriggerSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerSupport")
            .field("listener_count", &self.len())
            .finish_non_exhaustive()
    }
}

impl TriggerSupport {
    /// Empty list with the [`RethrowPolicy`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: Rc<dyn ListenerErrorPolicy>) -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            policy: RefCell::new(policy),
        }
    }

    pub fn set_policy(&self, policy: Rc<dyn ListenerErrorPolicy>) {
        *self.policy.borrow_mut() = policy;
    }

    pub fn add(&self, listener: Rc<dyn TriggerListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn remove(&self, listener: &Rc<dyn TriggerListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(idx) => {
                listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Deliver `event` to every listener, routing failures through the policy.
    pub fn fire_trigger_event(&self, event: &TriggerEvent) -> Result<()> {
        let listeners: Vec<_> = self.listeners.borrow().clone();
        let policy = Rc::clone(&self.policy.borrow());
        for listener in listeners {
            if let Err(err) = listener.trigger_fired(event) {
                policy.handle_error(err, event)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ManualTrigger
// ---------------------------------------------------------------------------

/// Trigger fired explicitly through [`fire`](Self::fire).
#[derive(Debug, Default)]
pub struct ManualTrigger {
    support: TriggerSupport,
}

impl ManualTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: Rc<dyn ListenerErrorPolicy>) -> Self {
        Self {
            support: TriggerSupport::with_policy(policy),
        }
    }

    pub fn fire(&self) -> Result<()> {
        self.support.fire_trigger_event(&TriggerEvent::new("manual_trigger"))
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.support.len()
    }
}

impl Trigger for ManualTrigger {
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

impl Disposable for ManualTrigger {
    fn dispose(&self) -> Result<()> {
        self.support.clear();
        Ok(())
    }
}
