//! The validator: runs data providers through rules into result handlers.
//!
//! A [`Validator<D, R>`] listens to its triggers. Every firing (or a manual
//! [`trigger`](Validator::trigger)) runs the whole pipeline synchronously:
//!
//! ```text
//! data providers ─▶ data-provider-output chain ─▶ stage A ─▶ rule-input chain
//!   ─▶ rules ─▶ rule-output chain ─▶ stage B ─▶ result-handler-input chain
//!   ─▶ result handlers
//! ```
//!
//! Stage A ([`DataProviderToRuleMapping`]):
//! - `EachToEach`: each provider value is wrapped in [`Fan::Each`] and runs
//!   stage B on its own.
//! - `AllToEach`: all provider values are gathered into one [`Fan::All`] and
//!   stage B runs once.
//!
//! Stage B ([`RuleToResultHandlerMapping`]), for the one rule input stage A
//! produced:
//! - `EachToEach`: each rule result is wrapped in `Fan::Each` and delivered
//!   to every handler on its own.
//! - `AllToEach`: all rule results are gathered into one `Fan::All` and
//!   delivered once.
//!
//! So one firing delivers between 1 and `providers × rules` results to each
//! handler.
//!
//! # Invariants
//!
//! 1. A run reads only the current lists; nothing carries over between runs.
//!    Every list is snapshotted when the run starts, so a handler that adds a
//!    rule only affects later runs.
//! 2. Order everywhere is registration order.
//! 3. Manual and trigger-driven runs go through the same
//!    [`process_trigger`](Validator::process_trigger).
//!
//! # Failure Modes
//!
//! - Result handler error: returned at once; the rest of the run is skipped.
//! - Rule or transformer panic: unwinds to whoever fired the trigger.
//! - Unsupported mapping (set from an unknown name): logged as
//!   `validator.mapping.unsupported`; that stage does nothing for the run.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{Disposable, Result, Transformer, dispose_if};

use crate::builder::ValidatorBuilder;
use crate::config::PipelineConfig;
use crate::data_provider::DataProvider;
use crate::fan::Fan;
use crate::mapping::{DataProviderToRuleMapping, RuleToResultHandlerMapping};
use crate::result_handler::ResultHandler;
use crate::rule::Rule;
use crate::trigger::{Trigger, TriggerEvent, TriggerListener};

type Chain<T> = Vec<Rc<dyn Transformer<T, T>>>;

/// Shared state reached by both the validator handle and its trigger
/// listener.
struct Lists<D: 'static, R: 'static> {
    triggers: RefCell<Vec<Rc<dyn Trigger>>>,
    data_providers: RefCell<Vec<Rc<dyn DataProvider<D>>>>,
    data_provider_output_transformers: RefCell<Chain<D>>,
    rule_input_transformers: RefCell<Chain<Fan<D>>>,
    rules: RefCell<Vec<Rc<dyn Rule<Fan<D>, R>>>>,
    rule_output_transformers: RefCell<Chain<R>>,
    result_handler_input_transformers: RefCell<Chain<Fan<R>>>,
    result_handlers: RefCell<Vec<Rc<dyn ResultHandler<Fan<R>>>>>,
    data_provider_to_rule: Cell<Option<DataProviderToRuleMapping>>,
    rule_to_result_handler: Cell<Option<RuleToResultHandlerMapping>>,
}

impl<D: 'static, R: 'static> Lists<D, R> {
    fn new(config: PipelineConfig) -> Self {
        Self {
            triggers: RefCell::new(Vec::new()),
            data_providers: RefCell::new(Vec::new()),
            data_provider_output_transformers: RefCell::new(Vec::new()),
            rule_input_transformers: RefCell::new(Vec::new()),
            rules: RefCell::new(Vec::new()),
            rule_output_transformers: RefCell::new(Vec::new()),
            result_handler_input_transformers: RefCell::new(Vec::new()),
            result_handlers: RefCell::new(Vec::new()),
            data_provider_to_rule: Cell::new(Some(config.data_provider_to_rule)),
            rule_to_result_handler: Cell::new(Some(config.rule_to_result_handler)),
        }
    }

    fn snapshot(&self) -> Run<D, R> {
        Run {
            data_providers: self.data_providers.borrow().clone(),
            data_provider_output_transformers: self
                .data_provider_output_transformers
                .borrow()
                .clone(),
            rule_input_transformers: self.rule_input_transformers.borrow().clone(),
            rules: self.rules.borrow().clone(),
            rule_output_transformers: self.rule_output_transformers.borrow().clone(),
            result_handler_input_transformers: self
                .result_handler_input_transformers
                .borrow()
                .clone(),
            result_handlers: self.result_handlers.borrow().clone(),
            data_provider_to_rule: self.data_provider_to_rule.get(),
            rule_to_result_handler: self.rule_to_result_handler.get(),
        }
    }

    fn process_trigger(&self, event: &TriggerEvent) -> Result<()> {
        let run = self.snapshot();
        let span = tracing::debug_span!(
            "validator.process",
            source = event.source(),
            data_providers = run.data_providers.len(),
            rules = run.rules.len(),
            result_handlers = run.result_handlers.len(),
            data_provider_to_rule = ?run.data_provider_to_rule,
            rule_to_result_handler = ?run.rule_to_result_handler,
        );
        let _enter = span.enter();
        run.execute()
    }
}

/// One pipeline run over a snapshot of the lists.
struct Run<D: 'static, R: 'static> {
    data_providers: Vec<Rc<dyn DataProvider<D>>>,
    data_provider_output_transformers: Chain<D>,
    rule_input_transformers: Chain<Fan<D>>,
    rules: Vec<Rc<dyn Rule<Fan<D>, R>>>,
    rule_output_transformers: Chain<R>,
    result_handler_input_transformers: Chain<Fan<R>>,
    result_handlers: Vec<Rc<dyn ResultHandler<Fan<R>>>>,
    data_provider_to_rule: Option<DataProviderToRuleMapping>,
    rule_to_result_handler: Option<RuleToResultHandlerMapping>,
}

fn apply_chain<T>(chain: &[Rc<dyn Transformer<T, T>>], value: T) -> T {
    chain.iter().fold(value, |acc, t| t.transform(acc))
}

impl<D: 'static, R: 'static> Run<D, R> {
    fn read(&self, provider: &Rc<dyn DataProvider<D>>) -> D {
        apply_chain(&self.data_provider_output_transformers, provider.data())
    }

    /// Stage A: data providers to rule input.
    fn execute(&self) -> Result<()> {
        let Some(mapping) = self.data_provider_to_rule else {
            tracing::error!(
                message = "validator.mapping.unsupported",
                stage = "data_provider_to_rule"
            );
            return Ok(());
        };
        match mapping {
            DataProviderToRuleMapping::EachToEach => {
                for provider in &self.data_providers {
                    let value = Fan::Each(self.read(provider));
                    let input = apply_chain(&self.rule_input_transformers, value);
                    self.process_rules(&input)?;
                }
                Ok(())
            }
            DataProviderToRuleMapping::AllToEach => {
                let values = self.data_providers.iter().map(|p| self.read(p)).collect();
                let input = apply_chain(&self.rule_input_transformers, Fan::All(values));
                self.process_rules(&input)
            }
        }
    }

    /// Stage B: rule results to result handlers.
    fn process_rules(&self, input: &Fan<D>) -> Result<()> {
        let Some(mapping) = self.rule_to_result_handler else {
            tracing::error!(
                message = "validator.mapping.unsupported",
                stage = "rule_to_result_handler"
            );
            return Ok(());
        };
        match mapping {
            RuleToResultHandlerMapping::EachToEach => {
                for rule in &self.rules {
                    let result = apply_chain(&self.rule_output_transformers, rule.validate(input));
                    self.deliver(Fan::Each(result))?;
                }
                Ok(())
            }
            RuleToResultHandlerMapping::AllToEach => {
                let results = self
                    .rules
                    .iter()
                    .map(|rule| apply_chain(&self.rule_output_transformers, rule.validate(input)))
                    .collect();
                self.deliver(Fan::All(results))
            }
        }
    }

    fn deliver(&self, result: Fan<R>) -> Result<()> {
        let result = apply_chain(&self.result_handler_input_transformers, result);
        for handler in &self.result_handlers {
            handler.handle_result(&result)?;
        }
        Ok(())
    }
}

/// Registered on every trigger of a validator.
struct ValidatorListener<D: 'static, R: 'static> {
    lists: Weak<Lists<D, R>>,
}

impl<D: 'static, R: 'static> TriggerListener for ValidatorListener<D, R> {
    fn trigger_fired(&self, event: &TriggerEvent) -> Result<()> {
        match self.lists.upgrade() {
            Some(lists) => lists.process_trigger(event),
            None => Ok(()),
        }
    }
}

fn remove_by_identity<T: ?Sized>(list: &RefCell<Vec<Rc<T>>>, item: &Rc<T>) -> bool {
    let mut list = list.borrow_mut();
    match list.iter().position(|entry| Rc::ptr_eq(entry, item)) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

fn dispose_all<T: ?Sized>(
    items: &[Rc<T>],
    capability: impl Fn(&T) -> Option<&dyn Disposable>,
) -> Result<()> {
    for item in items {
        dispose_if(capability(&**item))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validator<D, R>
// ---------------------------------------------------------------------------

/// Trigger-driven validation pipeline over data of type `D` producing results
/// of type `R`.
///
/// Dropping a validator detaches it from its triggers.
pub struct Validator<D: 'static, R: 'static> {
    lists: Rc<Lists<D, R>>,
    listener: Rc<dyn TriggerListener>,
    deep_dispose: Cell<bool>,
}

impl<D: 'static, R: 'static> fmt::Debug for Validator<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("triggers", &self.lists.triggers.borrow().len())
            .field("data_providers", &self.lists.data_providers.borrow().len())
            .field("rules", &self.lists.rules.borrow().len())
            .field("result_handlers", &self.lists.result_handlers.borrow().len())
            .field("data_provider_to_rule", &self.lists.data_provider_to_rule.get())
            .field("rule_to_result_handler", &self.lists.rule_to_result_handler.get())
            .field("deep_dispose", &self.deep_dispose.get())
            .finish()
    }
}

impl<D: 'static, R: 'static> Default for Validator<D, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static, R: 'static> Validator<D, R> {
    /// Empty validator with both stages set to `EachToEach`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        let lists = Rc::new(Lists::new(config));
        let listener: Rc<dyn TriggerListener> = Rc::new(ValidatorListener {
            lists: Rc::downgrade(&lists),
        });
        Self {
            lists,
            listener,
            deep_dispose: Cell::new(false),
        }
    }

    #[must_use]
    pub fn builder() -> ValidatorBuilder<D, R> {
        ValidatorBuilder::new()
    }

    /// Run the pipeline now, as if a trigger had fired.
    pub fn trigger(&self) -> Result<()> {
        self.process_trigger(&TriggerEvent::manual())
    }

    /// Run the pipeline for `event`. Triggers end up here too.
    pub fn process_trigger(&self, event: &TriggerEvent) -> Result<()> {
        self.lists.process_trigger(event)
    }
}

impl<D: 'static, R: 'static> Validator<D, R> {
    // -- triggers ----------------------------------------------------------

    /// Register a trigger; the validator runs whenever it fires.
    pub fn add_trigger(&self, trigger: Rc<dyn Trigger>) {
        trigger.add_trigger_listener(Rc::clone(&self.listener));
        self.lists.triggers.borrow_mut().push(trigger);
    }

    pub fn remove_trigger(&self, trigger: &Rc<dyn Trigger>) -> bool {
        let removed = remove_by_identity(&self.lists.triggers, trigger);
        if removed {
            trigger.remove_trigger_listener(&self.listener);
        }
        removed
    }

    #[must_use]
    pub fn triggers(&self) -> Vec<Rc<dyn Trigger>> {
        self.lists.triggers.borrow().clone()
    }

    // -- data providers ----------------------------------------------------

    pub fn add_data_provider(&self, provider: Rc<dyn DataProvider<D>>) {
        self.lists.data_providers.borrow_mut().push(provider);
    }

    pub fn remove_data_provider(&self, provider: &Rc<dyn DataProvider<D>>) -> bool {
        remove_by_identity(&self.lists.data_providers, provider)
    }

    #[must_use]
    pub fn data_providers(&self) -> Vec<Rc<dyn DataProvider<D>>> {
        self.lists.data_providers.borrow().clone()
    }

    pub fn add_data_provider_output_transformer(&self, transformer: Rc<dyn Transformer<D, D>>) {
        self.lists.data_provider_output_transformers.borrow_mut().push(transformer);
    }

    pub fn remove_data_provider_output_transformer(
        &self,
        transformer: &Rc<dyn Transformer<D, D>>,
    ) -> bool {
        remove_by_identity(&self.lists.data_provider_output_transformers, transformer)
    }

    // -- rules -------------------------------------------------------------

    pub fn add_rule_input_transformer(&self, transformer: Rc<dyn Transformer<Fan<D>, Fan<D>>>) {
        self.lists.rule_input_transformers.borrow_mut().push(transformer);
    }

    pub fn remove_rule_input_transformer(
        &self,
        transformer: &Rc<dyn Transformer<Fan<D>, Fan<D>>>,
    ) -> bool {
        remove_by_identity(&self.lists.rule_input_transformers, transformer)
    }

    pub fn add_rule(&self, rule: Rc<dyn Rule<Fan<D>, R>>) {
        self.lists.rules.borrow_mut().push(rule);
    }

    pub fn remove_rule(&self, rule: &Rc<dyn Rule<Fan<D>, R>>) -> bool {
        remove_by_identity(&self.lists.rules, rule)
    }

    #[must_use]
    pub fn rules(&self) -> Vec<Rc<dyn Rule<Fan<D>, R>>> {
        self.lists.rules.borrow().clone()
    }

    pub fn add_rule_output_transformer(&self, transformer: Rc<dyn Transformer<R, R>>) {
        self.lists.rule_output_transformers.borrow_mut().push(transformer);
    }

    pub fn remove_rule_output_transformer(&self, transformer: &Rc<dyn Transformer<R, R>>) -> bool {
        remove_by_identity(&self.lists.rule_output_transformers, transformer)
    }

    // -- result handlers ---------------------------------------------------

    pub fn add_result_handler_input_transformer(
        &self,
        transformer: Rc<dyn Transformer<Fan<R>, Fan<R>>>,
    ) {
        self.lists.result_handler_input_transformers.borrow_mut().push(transformer);
    }

    pub fn remove_result_handler_input_transformer(
        &self,
        transformer: &Rc<dyn Transformer<Fan<R>, Fan<R>>>,
    ) -> bool {
        remove_by_identity(&self.lists.result_handler_input_transformers, transformer)
    }

    pub fn add_result_handler(&self, handler: Rc<dyn ResultHandler<Fan<R>>>) {
        self.lists.result_handlers.borrow_mut().push(handler);
    }

    pub fn remove_result_handler(&self, handler: &Rc<dyn ResultHandler<Fan<R>>>) -> bool {
        remove_by_identity(&self.lists.result_handlers, handler)
    }

    #[must_use]
    pub fn result_handlers(&self) -> Vec<Rc<dyn ResultHandler<Fan<R>>>> {
        self.lists.result_handlers.borrow().clone()
    }

    // -- mappings ----------------------------------------------------------

    /// Current stage A mapping; `None` after an unknown name was set.
    #[must_use]
    pub fn data_provider_to_rule_mapping(&self) -> Option<DataProviderToRuleMapping> {
        self.lists.data_provider_to_rule.get()
    }

    pub fn set_data_provider_to_rule_mapping(&self, mapping: DataProviderToRuleMapping) {
        self.lists.data_provider_to_rule.set(Some(mapping));
    }

    /// Set the stage A mapping by name (`EACH_TO_EACH`, `ALL_TO_EACH`, or the
    /// `SPLIT`/`JOIN` aliases).
    ///
    /// An unknown name disables the stage until a valid mapping is set, and
    /// the error is returned.
    pub fn set_data_provider_to_rule_mapping_name(&self, name: &str) -> Result<()> {
        let parsed = name.parse::<DataProviderToRuleMapping>();
        self.lists.data_provider_to_rule.set(parsed.as_ref().ok().copied());
        parsed.map(drop)
    }

    /// Current stage B mapping; `None` after an unknown name was set.
    #[must_use]
    pub fn rule_to_result_handler_mapping(&self) -> Option<RuleToResultHandlerMapping> {
        self.lists.rule_to_result_handler.get()
    }

    pub fn set_rule_to_result_handler_mapping(&self, mapping: RuleToResultHandlerMapping) {
        self.lists.rule_to_result_handler.set(Some(mapping));
    }

    /// Stage B counterpart of
    /// [`set_data_provider_to_rule_mapping_name`](Self::set_data_provider_to_rule_mapping_name).
    pub fn set_rule_to_result_handler_mapping_name(&self, name: &str) -> Result<()> {
        let parsed = name.parse::<RuleToResultHandlerMapping>();
        self.lists.rule_to_result_handler.set(parsed.as_ref().ok().copied());
        parsed.map(drop)
    }

    /// Both mappings, or `None` while either stage is unsupported.
    #[must_use]
    pub fn config(&self) -> Option<PipelineConfig> {
        Some(PipelineConfig::new(
            self.data_provider_to_rule_mapping()?,
            self.rule_to_result_handler_mapping()?,
        ))
    }

    pub fn apply_config(&self, config: &PipelineConfig) {
        self.set_data_provider_to_rule_mapping(config.data_provider_to_rule);
        self.set_rule_to_result_handler_mapping(config.rule_to_result_handler);
    }

    // -- disposal ----------------------------------------------------------

    #[must_use]
    pub fn is_deep_dispose(&self) -> bool {
        self.deep_dispose.get()
    }

    /// Whether `dispose()` also disposes triggers, data providers, rules and
    /// result handlers.
    pub fn set_deep_dispose(&self, deep: bool) {
        self.deep_dispose.set(deep);
    }

    fn detach_triggers(&self) -> Vec<Rc<dyn Trigger>> {
        let triggers = std::mem::take(&mut *self.lists.triggers.borrow_mut());
        for trigger in &triggers {
            trigger.remove_trigger_listener(&self.listener);
        }
        triggers
    }
}

impl<D: 'static, R: 'static> Disposable for Validator<D, R> {
    /// Detaches from every trigger, empties every list and disposes the
    /// transformers that support it. With deep dispose, triggers, data
    /// providers, rules and result handlers are disposed as well.
    fn dispose(&self) -> Result<()> {
        let deep = self.deep_dispose.get();
        tracing::debug!(message = "validator.dispose", deep);

        let triggers = self.detach_triggers();
        let lists = &self.lists;
        let data_providers = std::mem::take(&mut *lists.data_providers.borrow_mut());
        let rules = std::mem::take(&mut *lists.rules.borrow_mut());
        let result_handlers = std::mem::take(&mut *lists.result_handlers.borrow_mut());
        let dpo = std::mem::take(&mut *lists.data_provider_output_transformers.borrow_mut());
        let ri = std::mem::take(&mut *lists.rule_input_transformers.borrow_mut());
        let ro = std::mem::take(&mut *lists.rule_output_transformers.borrow_mut());
        let rhi = std::mem::take(&mut *lists.result_handler_input_transformers.borrow_mut());

        dispose_all(&dpo, |t| t.as_disposable())?;
        dispose_all(&ri, |t| t.as_disposable())?;
        dispose_all(&ro, |t| t.as_disposable())?;
        dispose_all(&rhi, |t| t.as_disposable())?;

        if deep {
            dispose_all(&triggers, |t| t.as_disposable())?;
            dispose_all(&data_providers, |p| p.as_disposable())?;
            dispose_all(&rules, |r| r.as_disposable())?;
            dispose_all(&result_handlers, |h| h.as_disposable())?;
        }
        Ok(())
    }
}

impl<D: 'static, R: 'static> Drop for Validator<D, R> {
    fn drop(&mut self) {
        self.detach_triggers();
    }
}
