//! Mapping policy for a validator.
//!
//! A [`PipelineConfig`] only holds the two mapping strategies. Pipeline
//! composition (providers, rules, handlers) is never part of it.
//!
//! With the `policy-config` feature the policy can be loaded from TOML or
//! JSON text:
//!
//! ```toml
//! data_provider_to_rule = "ALL_TO_EACH"
//! rule_to_result_handler = "JOIN"
//! ```

use crate::mapping::{DataProviderToRuleMapping, RuleToResultHandlerMapping};

#[cfg(feature = "policy-config")]
use vigil_core::{Result, VigilError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    pub data_provider_to_rule: DataProviderToRuleMapping,
    pub rule_to_result_handler: RuleToResultHandlerMapping,
}

impl PipelineConfig {
    #[must_use]
    pub const fn new(
        data_provider_to_rule: DataProviderToRuleMapping,
        rule_to_result_handler: RuleToResultHandlerMapping,
    ) -> Self {
        Self {
            data_provider_to_rule,
            rule_to_result_handler,
        }
    }

    #[must_use]
    pub const fn with_data_provider_to_rule(mut self, mapping: DataProviderToRuleMapping) -> Self {
        self.data_provider_to_rule = mapping;
        self
    }

    #[must_use]
    pub const fn with_rule_to_result_handler(mut self, mapping: RuleToResultHandlerMapping) -> Self {
        self.rule_to_result_handler = mapping;
        self
    }

    /// Parse a config from TOML. Missing keys keep their defaults.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| VigilError::Config {
            message: err.to_string(),
        })
    }

    /// Parse a config from JSON. Missing keys keep their defaults.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| VigilError::Config {
            message: err.to_string(),
        })
    }
}
