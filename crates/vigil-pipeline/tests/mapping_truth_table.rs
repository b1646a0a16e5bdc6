//! The four-way mapping truth table, plus run-level behaviour that depends on
//! it: delivery counts, ordering, combined values and the unsupported-mapping
//! log.
//!
//! Fixture: two data providers ("a", "b") and two rules that echo their input
//! tagged with the rule name.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use vigil_core::Result;
use vigil_pipeline::{
    DataProviderToRuleMapping, Fan, PipelineConfig, RuleToResultHandlerMapping, Validator,
};

// ── Fixture ─────────────────────────────────────────────────────────────

type Deliveries = Rc<RefCell<Vec<Fan<String>>>>;

fn describe(input: &Fan<&'static str>) -> String {
    match input {
        Fan::Each(value) => (*value).to_owned(),
        Fan::All(values) => format!("[{}]", values.join(",")),
    }
}

fn fixture(config: PipelineConfig) -> (Validator<&'static str, String>, Deliveries) {
    let deliveries = Deliveries::default();
    let sink = Rc::clone(&deliveries);
    let validator = Validator::<&'static str, String>::builder()
        .config(config)
        .data_provider(Rc::new(|| "a"))
        .data_provider(Rc::new(|| "b"))
        .rule(Rc::new(|input: &Fan<&'static str>| format!("r1:{}", describe(input))))
        .rule(Rc::new(|input: &Fan<&'static str>| format!("r2:{}", describe(input))))
        .result_handler(Rc::new(move |result: &Fan<String>| -> Result<()> {
            sink.borrow_mut().push(result.clone());
            Ok(())
        }))
        .build();
    (validator, deliveries)
}

fn run(dp: DataProviderToRuleMapping, rh: RuleToResultHandlerMapping) -> Vec<Fan<String>> {
    let (validator, deliveries) = fixture(PipelineConfig::new(dp, rh));
    validator.trigger().unwrap();
    deliveries.take()
}

fn each(value: &str) -> Fan<String> {
    Fan::Each(value.to_owned())
}

fn all(values: &[&str]) -> Fan<String> {
    Fan::All(values.iter().map(|v| (*v).to_owned()).collect())
}

// ═════════════════════════════════════════════════════════════════════════
// Truth table
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn each_to_each_then_each_to_each_delivers_four_times() {
    let got = run(
        DataProviderToRuleMapping::EachToEach,
        RuleToResultHandlerMapping::EachToEach,
    );
    assert_eq!(got, vec![each("r1:a"), each("r2:a"), each("r1:b"), each("r2:b")]);
}

#[test]
fn all_to_each_then_each_to_each_delivers_twice_from_the_combined_list() {
    let got = run(
        DataProviderToRuleMapping::AllToEach,
        RuleToResultHandlerMapping::EachToEach,
    );
    assert_eq!(got, vec![each("r1:[a,b]"), each("r2:[a,b]")]);
}

#[test]
fn each_to_each_then_all_to_each_delivers_once_per_provider() {
    let got = run(
        DataProviderToRuleMapping::EachToEach,
        RuleToResultHandlerMapping::AllToEach,
    );
    assert_eq!(got, vec![all(&["r1:a", "r2:a"]), all(&["r1:b", "r2:b"])]);
}

#[test]
fn all_to_each_then_all_to_each_delivers_exactly_once() {
    let got = run(
        DataProviderToRuleMapping::AllToEach,
        RuleToResultHandlerMapping::AllToEach,
    );
    assert_eq!(got, vec![all(&["r1:[a,b]", "r2:[a,b]"])]);
}

#[test]
fn mappings_can_change_between_runs() {
    let (validator, deliveries) = fixture(PipelineConfig::default());
    validator.trigger().unwrap();
    assert_eq!(deliveries.take().len(), 4);

    validator.set_data_provider_to_rule_mapping(DataProviderToRuleMapping::AllToEach);
    validator.set_rule_to_result_handler_mapping(RuleToResultHandlerMapping::AllToEach);
    validator.trigger().unwrap();
    assert_eq!(deliveries.take().len(), 1);
}

#[test]
fn every_handler_receives_every_delivery() {
    let (validator, first) = fixture(PipelineConfig::default());
    let second = Deliveries::default();
    let sink = Rc::clone(&second);
    validator.add_result_handler(Rc::new(move |result: &Fan<String>| -> Result<()> {
        sink.borrow_mut().push(result.clone());
        Ok(())
    }));
    validator.trigger().unwrap();
    assert_eq!(*first.borrow(), *second.borrow());
    assert_eq!(second.borrow().len(), 4);
}

#[test]
fn join_with_no_providers_still_runs_rules_once() {
    let deliveries = Deliveries::default();
    let sink = Rc::clone(&deliveries);
    let validator = Validator::<&'static str, String>::builder()
        .data_provider_to_rule(DataProviderToRuleMapping::AllToEach)
        .rule(Rc::new(|input: &Fan<&'static str>| describe(input)))
        .result_handler(Rc::new(move |result: &Fan<String>| -> Result<()> {
            sink.borrow_mut().push(result.clone());
            Ok(())
        }))
        .build();
    validator.trigger().unwrap();
    assert_eq!(*deliveries.borrow(), vec![each("[]")]);
}

// ═════════════════════════════════════════════════════════════════════════
// Unsupported mapping is logged and skipped
// ═════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Captured {
    unsupported_stages: Vec<String>,
    saw_process_span: bool,
}

struct CaptureLayer {
    state: Arc<Mutex<Captured>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() == "validator.process" {
            self.state.lock().expect("capture lock").saw_process_span = true;
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct Fields {
            message: Option<String>,
            stage: Option<String>,
        }
        impl tracing::field::Visit for Fields {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                match field.name() {
                    "message" => self.message = Some(value.to_owned()),
                    "stage" => self.stage = Some(value.to_owned()),
                    _ => {}
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let text = format!("{value:?}").trim_matches('"').to_owned();
                match field.name() {
                    "message" => self.message = Some(text),
                    "stage" => self.stage = Some(text),
                    _ => {}
                }
            }
        }

        let mut fields = Fields::default();
        event.record(&mut fields);
        if fields.message.as_deref() == Some("validator.mapping.unsupported") {
            self.state
                .lock()
                .expect("capture lock")
                .unsupported_stages
                .push(fields.stage.unwrap_or_default());
        }
    }
}

#[test]
fn unsupported_mapping_is_logged_and_stage_skipped() {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let (validator, deliveries) = fixture(PipelineConfig::default());
    assert!(validator.set_data_provider_to_rule_mapping_name("SIDEWAYS").is_err());
    validator.trigger().unwrap();
    assert!(deliveries.borrow().is_empty());

    validator.set_data_provider_to_rule_mapping_name("split").unwrap();
    assert!(validator.set_rule_to_result_handler_mapping_name("").is_err());
    validator.trigger().unwrap();
    assert!(deliveries.borrow().is_empty());

    let captured = state.lock().expect("capture lock");
    assert!(captured.saw_process_span, "expected validator.process span");
    assert_eq!(
        captured.unsupported_stages,
        vec!["data_provider_to_rule", "rule_to_result_handler", "rule_to_result_handler"],
        "stage B is skipped once per provider"
    );
}
