#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vigil_core::Result;
use vigil_pipeline::{
    DataProviderToRuleMapping, Fan, PipelineConfig, RuleToResultHandlerMapping, Validator,
};

#[derive(Arbitrary, Debug)]
struct FuzzPipeline {
    providers: Vec<i16>,
    rule_limits: Vec<i16>,
    join_providers: bool,
    join_rules: bool,
    runs: u8,
}

fuzz_target!(|input: FuzzPipeline| {
    if input.providers.len() > 32 || input.rule_limits.len() > 32 {
        return;
    }
    let config = PipelineConfig::new(
        if input.join_providers {
            DataProviderToRuleMapping::AllToEach
        } else {
            DataProviderToRuleMapping::EachToEach
        },
        if input.join_rules {
            RuleToResultHandlerMapping::AllToEach
        } else {
            RuleToResultHandlerMapping::EachToEach
        },
    );

    let deliveries = Rc::new(Cell::new(0usize));
    let sink = Rc::clone(&deliveries);
    let validator = Validator::<i16, bool>::with_config(config);
    for &value in &input.providers {
        validator.add_data_provider(Rc::new(move || value));
    }
    for &limit in &input.rule_limits {
        validator.add_rule(Rc::new(move |v: &Fan<i16>| v.iter().all(|n| *n >= limit)));
    }
    validator.add_result_handler(Rc::new(move |_: &Fan<bool>| -> Result<()> {
        sink.set(sink.get() + 1);
        Ok(())
    }));

    let stage_a = if input.join_providers { 1 } else { input.providers.len() };
    let stage_b = if input.join_rules { 1 } else { input.rule_limits.len() };
    for run in 1..=usize::from(input.runs % 4) {
        validator.trigger().expect("handlers never fail");
        assert_eq!(deliveries.get(), run * stage_a * stage_b);
    }
});
