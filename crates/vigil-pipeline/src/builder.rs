//! Fluent construction of a [`Validator`].
//!
//! ```
//! use std::rc::Rc;
//! use vigil_pipeline::{Fan, ManualTrigger, RuleToResultHandlerMapping, Validator};
//!
//! let trigger = Rc::new(ManualTrigger::new());
//! let validator = Validator::<i32, bool>::builder()
//!     .trigger(trigger.clone())
//!     .data_provider(Rc::new(|| 4))
//!     .rule(Rc::new(|input: &Fan<i32>| input.iter().all(|n| n % 2 == 0)))
//!     .rule_to_result_handler(RuleToResultHandlerMapping::AllToEach)
//!     .build();
//! assert_eq!(validator.rules().len(), 1);
//! ```

use std::fmt;
use std::rc::Rc;

use vigil_core::Transformer;

use crate::config::PipelineConfig;
use crate::data_provider::DataProvider;
use crate::fan::Fan;
use crate::mapping::{DataProviderToRuleMapping, RuleToResultHandlerMapping};
use crate::result_handler::ResultHandler;
use crate::rule::Rule;
use crate::trigger::Trigger;
use crate::validator::Validator;

/// Consuming builder; every list keeps the order in which items were added.
#[must_use]
pub struct ValidatorBuilder<D: 'static, R: 'static> {
    triggers: Vec<Rc<dyn Trigger>>,
    data_providers: Vec<Rc<dyn DataProvider<D>>>,
    data_provider_output_transformers: Vec<Rc<dyn Transformer<D, D>>>,
    rule_input_transformers: Vec<Rc<dyn Transformer<Fan<D>, Fan<D>>>>,
    rules: Vec<Rc<dyn Rule<Fan<D>, R>>>,
    rule_output_transformers: Vec<Rc<dyn Transformer<R, R>>>,
    result_handler_input_transformers: Vec<Rc<dyn Transformer<Fan<R>, Fan<R>>>>,
    result_handlers: Vec<Rc<dyn ResultHandler<Fan<R>>>>,
    config: PipelineConfig,
    deep_dispose: bool,
}

impl<D: 'static, R: 'static> fmt::Debug for ValidatorBuilder<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBuilder")
            .field("triggers", &self.triggers.len())
            .field("data_providers", &self.data_providers.len())
            .field("rules", &self.rules.len())
            .field("result_handlers", &self.result_handlers.len())
            .field("config", &self.config)
            .field("deep_dispose", &self.deep_dispose)
            .finish()
    }
}

impl<D: 'static, R: 'static> Default for ValidatorBuilder<D, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static, R: 'static> ValidatorBuilder<D, R> {
    pub fn new() -> Self {
        Self {
            triggers: Vec::new(),
            data_providers: Vec::new(),
            data_provider_output_transformers: Vec::new(),
            rule_input_transformers: Vec::new(),
            rules: Vec::new(),
            rule_output_transformers: Vec::new(),
            result_handler_input_transformers: Vec::new(),
            result_handlers: Vec::new(),
            config: PipelineConfig::default(),
            deep_dispose: false,
        }
    }

    pub fn trigger(mut self, trigger: Rc<dyn Trigger>) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn data_provider(mut self, provider: Rc<dyn DataProvider<D>>) -> Self {
        self.data_providers.push(provider);
        self
    }

    pub fn data_provider_output_transformer(mut self, transformer: Rc<dyn Transformer<D, D>>) -> Self {
        self.data_provider_output_transformers.push(transformer);
        self
    }

    pub fn rule_input_transformer(mut self, transformer: Rc<dyn Transformer<Fan<D>, Fan<D>>>) -> Self {
        self.rule_input_transformers.push(transformer);
        self
    }

    pub fn rule(mut self, rule: Rc<dyn Rule<Fan<D>, R>>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_output_transformer(mut self, transformer: Rc<dyn Transformer<R, R>>) -> Self {
        self.rule_output_transformers.push(transformer);
        self
    }

    pub fn result_handler_input_transformer(
        mut self,
        transformer: Rc<dyn Transformer<Fan<R>, Fan<R>>>,
    ) -> Self {
        self.result_handler_input_transformers.push(transformer);
        self
    }

    pub fn result_handler(mut self, handler: Rc<dyn ResultHandler<Fan<R>>>) -> Self {
        self.result_handlers.push(handler);
        self
    }

    pub fn data_provider_to_rule(mut self, mapping: DataProviderToRuleMapping) -> Self {
        self.config.data_provider_to_rule = mapping;
        self
    }

    pub fn rule_to_result_handler(mut self, mapping: RuleToResultHandlerMapping) -> Self {
        self.config.rule_to_result_handler = mapping;
        self
    }

    /// Replace both mappings at once.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn deep_dispose(mut self, deep: bool) -> Self {
        self.deep_dispose = deep;
        self
    }

    /// Create the validator and register it on every trigger.
    pub fn build(self) -> Validator<D, R> {
        let validator = Validator::with_config(self.config);
        validator.set_deep_dispose(self.deep_dispose);
        for trigger in self.triggers {
            validator.add_trigger(trigger);
        }
        for provider in self.data_providers {
            validator.add_data_provider(provider);
        }
        for transformer in self.data_provider_output_transformers {
            validator.add_data_provider_output_transformer(transformer);
        }
        for transformer in self.rule_input_transformers {
            validator.add_rule_input_transformer(transformer);
        }
        for rule in self.rules {
            validator.add_rule(rule);
        }
        for transformer in self.rule_output_transformers {
            validator.add_rule_output_transformer(transformer);
        }
        for transformer in self.result_handler_input_transformers {
            validator.add_result_handler_input_transformer(transformer);
        }
        for handler in self.result_handlers {
            validator.add_result_handler(handler);
        }
        validator
    }
}
