//! Boolean aggregators for combined results.
//!
//! Both aggregators fold a `Vec<bool>` into one verdict, and collapse a
//! [`Fan::All`] into a [`Fan::Each`] so they can sit in the
//! result-handler-input chain after an `ALL_TO_EACH` stage. A `Fan::Each`
//! passes through unchanged.

use vigil_core::Transformer;

use crate::fan::Fan;

/// True when every value is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AndBooleanAggregator {
    empty_result: bool,
}

impl Default for AndBooleanAggregator {
    fn default() -> Self {
        Self { empty_result: true }
    }
}

impl AndBooleanAggregator {
    /// Aggregator that reports `true` for an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_empty_result(empty_result: bool) -> Self {
        Self { empty_result }
    }

    fn aggregate(&self, values: &[bool]) -> bool {
        if values.is_empty() {
            return self.empty_result;
        }
        values.iter().all(|&v| v)
    }
}

impl Transformer<Vec<bool>, bool> for AndBooleanAggregator {
    fn transform(&self, input: Vec<bool>) -> bool {
        self.aggregate(&input)
    }
}

impl Transformer<Fan<bool>, Fan<bool>> for AndBooleanAggregator {
    fn transform(&self, input: Fan<bool>) -> Fan<bool> {
        match input {
            Fan::Each(value) => Fan::Each(value),
            Fan::All(values) => Fan::Each(self.aggregate(&values)),
        }
    }
}

/// True when at least one value is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrBooleanAggregator {
    empty_result: bool,
}

impl OrBooleanAggregator {
    /// Aggregator that reports `false` for an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_empty_result(empty_result: bool) -> Self {
        Self { empty_result }
    }

    fn aggregate(&self, values: &[bool]) -> bool {
        if values.is_empty() {
            return self.empty_result;
        }
        values.iter().any(|&v| v)
    }
}

impl Transformer<Vec<bool>, bool> for OrBooleanAggregator {
    fn transform(&self, input: Vec<bool>) -> bool {
        self.aggregate(&input)
    }
}

impl Transformer<Fan<bool>, Fan<bool>> for OrBooleanAggregator {
    fn transform(&self, input: Fan<bool>) -> Fan<bool> {
        match input {
            Fan::Each(value) => Fan::Each(value),
            Fan::All(values) => Fan::Each(self.aggregate(&values)),
        }
    }
}
