#![forbid(unsafe_code)]

//! Trigger-driven validation pipeline.
//!
//! Triggers say when to validate, data providers say what, rules decide, and
//! result handlers consume the verdicts. A [`Validator`] wires them together
//! with four transformer chains and two [mapping strategies](mapping) that
//! choose between per-value and combined processing at each fan point.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vigil_core::Result;
//! use vigil_pipeline::{AndBooleanAggregator, Fan, RuleToResultHandlerMapping, Validator};
//!
//! let verdicts = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&verdicts);
//!
//! let validator = Validator::<String, bool>::builder()
//!     .data_provider(Rc::new(|| "hunter2".to_owned()))
//!     .rule(Rc::new(|pw: &Fan<String>| pw.iter().all(|p| p.len() >= 6)))
//!     .rule(Rc::new(|pw: &Fan<String>| pw.iter().all(|p| p.chars().any(|c| c.is_ascii_digit()))))
//!     .rule_to_result_handler(RuleToResultHandlerMapping::AllToEach)
//!     .result_handler_input_transformer(Rc::new(AndBooleanAggregator::new()))
//!     .result_handler(Rc::new(move |ok: &Fan<bool>| -> Result<()> {
//!         sink.borrow_mut().push(ok.clone());
//!         Ok(())
//!     }))
//!     .build();
//!
//! validator.trigger().unwrap();
//! assert_eq!(*verdicts.borrow(), vec![Fan::Each(true)]);
//! ```

pub mod aggregate;
pub mod bridge;
pub mod builder;
pub mod config;
pub mod data_provider;
pub mod fan;
pub mod mapping;
pub mod result_handler;
pub mod rule;
pub mod trigger;
pub mod validator;

pub use aggregate::{AndBooleanAggregator, OrBooleanAggregator};
pub use bridge::{PropertyChangeTrigger, PropertyDataProvider, PropertyResultHandler};
pub use builder::ValidatorBuilder;
pub use config::PipelineConfig;
pub use data_provider::{DataProvider, TransformedDataProvider};
pub use fan::Fan;
pub use mapping::{DataProviderToRuleMapping, RuleToResultHandlerMapping};
pub use result_handler::{ResultCollector, ResultHandler};
pub use rule::{CompositeRule, Rule};
pub use trigger::{
    ListenerErrorPolicy, LogAndContinuePolicy, ManualTrigger, RethrowPolicy, Trigger,
    TriggerEvent, TriggerListener, TriggerSupport,
};
pub use validator::Validator;
