//! Validation rules.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result, Transformer, dispose_if};

/// Pure validation function from an input to a result.
///
/// Any `Fn(&I) -> O` closure is a rule. Rules are infallible; a rule that
/// panics aborts the pipeline run that called it.
pub trait Rule<I, O> {
    fn validate(&self, input: &I) -> O;

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

impl<I, O, F> Rule<I, O> for F
where
    F: Fn(&I) -> O,
{
    fn validate(&self, input: &I) -> O {
        self(input)
    }
}

/// Rule built from sub-rules whose results are folded by an aggregator.
///
/// Every sub-rule sees the same input, in registration order; the aggregator
/// receives their results as one `Vec`.
pub struct CompositeRule<I: 'static, O: 'static> {
    rules: RefCell<Vec<Rc<dyn Rule<I, O>>>>,
    aggregator: Rc<dyn Transformer<Vec<O>, O>>,
    deep_dispose: Cell<bool>,
}

impl<I: 'static, O: 'static> fmt::Debug for CompositeRule<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRule")
            .field("rules", &self.rules.borrow().len())
            .field("deep_dispose", &self.deep_dispose.get())
            .finish()
    }
}

impl<I: 'static, O: 'static> CompositeRule<I, O> {
    pub fn new(aggregator: Rc<dyn Transformer<Vec<O>, O>>) -> Self {
        Self {
            rules: RefCell::new(Vec::new()),
            aggregator,
            deep_dispose: Cell::new(false),
        }
    }

    pub fn with_rules(
        aggregator: Rc<dyn Transformer<Vec<O>, O>>,
        rules: impl IntoIterator<Item = Rc<dyn Rule<I, O>>>,
    ) -> Self {
        let composite = Self::new(aggregator);
        composite.rules.borrow_mut().extend(rules);
        composite
    }

    pub fn add_rule(&self, rule: Rc<dyn Rule<I, O>>) {
        self.rules.borrow_mut().push(rule);
    }

    pub fn remove_rule(&self, rule: &Rc<dyn Rule<I, O>>) -> bool {
        let mut rules = self.rules.borrow_mut();
        match rules.iter().position(|r| Rc::ptr_eq(r, rule)) {
            Some(idx) => {
                rules.remove(idx);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn rules(&self) -> Vec<Rc<dyn Rule<I, O>>> {
        self.rules.borrow().clone()
    }

    /// Whether `dispose()` also disposes the sub-rules.
    pub fn set_deep_dispose(&self, deep: bool) {
        self.deep_dispose.set(deep);
    }
}

impl<I: 'static, O: 'static> Rule<I, O> for CompositeRule<I, O> {
    fn validate(&self, input: &I) -> O {
        let rules = self.rules();
        let results = rules.iter().map(|rule| rule.validate(input)).collect();
        self.aggregator.transform(results)
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<I: 'static, O: 'static> Disposable for CompositeRule<I, O> {
    /// Forgets the sub-rules and disposes the aggregator. With deep dispose,
    /// each sub-rule is disposed first.
    fn dispose(&self) -> Result<()> {
        let rules = std::mem::take(&mut *self.rules.borrow_mut());
        if self.deep_dispose.get() {
            for rule in &rules {
                dispose_if(rule.as_disposable())?;
            }
        }
        dispose_if(self.aggregator.as_disposable())
    }
}
