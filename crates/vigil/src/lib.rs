#![forbid(unsafe_code)]

//! Vigil public facade crate.
//!
//! Re-exports the building blocks under one roof. Most users only need the
//! [`prelude`].

pub use vigil_core as core;
pub use vigil_pipeline as pipeline;
pub use vigil_property as property;

pub use vigil_core::{Result, VigilError};

pub mod prelude {
    pub use vigil_core::{
        Disposable, Identity, MapEach, NegateBooleanTransformer, Result, ToStringTransformer,
        Transformer, TransformerExt, VigilError,
    };
    pub use vigil_pipeline::{
        AndBooleanAggregator, CompositeRule, DataProvider, DataProviderToRuleMapping, Fan,
        LogAndContinuePolicy, ManualTrigger, OrBooleanAggregator, PipelineConfig,
        PropertyChangeTrigger, PropertyDataProvider, PropertyResultHandler, ResultCollector,
        ResultHandler, RethrowPolicy, Rule, RuleToResultHandlerMapping, TransformedDataProvider,
        Trigger, TriggerEvent, TriggerListener, Validator, ValidatorBuilder,
    };
    pub use vigil_property::{
        Bond, CompositeReadableProperty, CompositeWritableProperty, PropertyListener,
        ReadOnlyProperty, ReadableProperty, ReadableWritableProperty, SimpleProperty,
        WritableProperty,
    };
}
