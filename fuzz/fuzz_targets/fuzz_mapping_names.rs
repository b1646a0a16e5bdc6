#![no_main]

use libfuzzer_sys::fuzz_target;
use vigil_pipeline::{DataProviderToRuleMapping, RuleToResultHandlerMapping};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(mapping) = name.parse::<DataProviderToRuleMapping>() {
        assert_eq!(mapping.as_str().parse::<DataProviderToRuleMapping>().ok(), Some(mapping));
    }
    if let Ok(mapping) = name.parse::<RuleToResultHandlerMapping>() {
        assert_eq!(mapping.as_str().parse::<RuleToResultHandlerMapping>().ok(), Some(mapping));
    }
});
