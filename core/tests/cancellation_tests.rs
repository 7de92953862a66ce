// tests/cancellation_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::atomic::Ordering;
use stepwise::{
  cancel, cancel_lazy, cancel_with, ContextData, Folded, Pipeline, PipelineOutcome, Reason, Step, StepFlow, StepLabel,
};

fn calculator_pipeline(ctx: &ContextData<Calculator>) -> Pipeline<Calculator, i64, TestError> {
  let steps = vec![
    Step::named("step1").unwrap(),
    Step::named("step2").unwrap(),
    Step::named("step3").unwrap(),
  ];
  Pipeline::new(ctx.clone(), steps).unwrap()
}

#[tokio::test]
#[serial]
async fn test_cancelling_step_stops_the_run() {
  setup_tracing();
  let ctx = ContextData::new(Calculator::default());
  let pipeline = calculator_pipeline(&ctx);

  let outcome = pipeline.perform(10).unwrap().ready().unwrap();

  let cancellation = outcome.into_cancellation().expect("run should be cancelled");
  // The result is the last good value: step1's output, before step2 ran.
  assert_eq!(*cancellation.result(), 10);
  assert_eq!(cancellation.step_name(), "step2");
  assert_eq!(cancellation.step().index(), 1);
  assert_eq!(cancellation.reason().as_deref(), Some("Cannot be greater than 5"));

  assert_eq!(ctx.read().calls, vec!["step1", "step2"]);
  assert!(ctx.read().result.is_none());

  let performed: Vec<&str> = pipeline.successful_steps().iter().map(|s| s.name()).collect();
  let skipped: Vec<&str> = pipeline.cancelled_steps().iter().map(|s| s.name()).collect();
  assert_eq!(performed, vec!["step1"]);
  assert_eq!(skipped, vec!["step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_cancel_at_first_step_returns_input() {
  setup_tracing();
  let steps: Vec<Step<Calculator, i64, TestError>> = vec![
    Step::func(|_ctx, _v: i64| Ok(cancel())),
    Step::named("step3").unwrap(),
  ];
  let pipeline = Pipeline::new(ContextData::new(Calculator::default()), steps).unwrap();

  let outcome = pipeline.perform(42).unwrap().ready().unwrap();

  let cancellation = outcome.cancellation().unwrap();
  assert_eq!(*cancellation.result(), 42);
  assert_eq!(cancellation.step().index(), 0);
  assert_eq!(cancellation.step_name(), "anonymous#0");
  assert_eq!(cancellation.reason(), None);
  assert_eq!(pipeline.cancelled_steps().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_deferred_reason_is_evaluated_on_each_read() {
  setup_tracing();
  reset_counters();
  let steps: Vec<Step<Calculator, i64, TestError>> = vec![Step::func(|_ctx, _v: i64| {
    Ok(cancel_lazy(|| {
      let n = REASON_EVAL_COUNTER.fetch_add(1, Ordering::SeqCst) + 1;
      format!("evaluated {n} times")
    }))
  })
  .with_label("lazy")];
  let pipeline = Pipeline::new(ContextData::new(Calculator::default()), steps).unwrap();

  let outcome = pipeline.perform(1).unwrap().ready().unwrap();
  let cancellation = outcome.into_cancellation().unwrap();

  assert_eq!(REASON_EVAL_COUNTER.load(Ordering::SeqCst), 0);
  assert_eq!(cancellation.reason().as_deref(), Some("evaluated 1 times"));
  assert_eq!(cancellation.reason().as_deref(), Some("evaluated 2 times"));
  assert_eq!(cancellation.step_name(), "lazy");
}

#[tokio::test]
#[serial]
async fn test_cancel_handler_recovers_run() {
  setup_tracing();
  reset_counters();
  let ctx = ContextData::new(Calculator::default());
  let pipeline = calculator_pipeline(&ctx).on_cancel_named("handleCancel").unwrap();
  assert!(pipeline.has_cancel_handler());

  let outcome = pipeline.perform(10).unwrap().ready().unwrap();

  assert!(matches!(outcome, PipelineOutcome::Recovered(-1)));
  assert!(outcome.was_cancelled());
  assert_eq!(CANCEL_HANDLER_COUNTER.load(Ordering::SeqCst), 1);
  assert_eq!(
    ctx.read().result.as_deref(),
    Some("cancelled on step2 - last value: 10. Reason: Cannot be greater than 5")
  );
  // The raw result is still available.
  let raw = pipeline.result().unwrap();
  assert_eq!(raw.cancellation().map(|c| *c.result()), Some(10));
}

#[tokio::test]
#[serial]
async fn test_cancel_handler_not_called_on_completion() {
  setup_tracing();
  reset_counters();
  let ctx = ContextData::new(Calculator::default());
  let pipeline = calculator_pipeline(&ctx).on_cancel_named("handleCancel").unwrap();

  let outcome = pipeline.perform(3).unwrap().ready().unwrap();

  assert!(matches!(outcome, PipelineOutcome::Completed(36)));
  assert_eq!(CANCEL_HANDLER_COUNTER.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[serial]
async fn test_on_cancel_closure_replaces_previous_handler() {
  setup_tracing();
  let ctx = ContextData::new(Calculator::default());
  let pipeline = calculator_pipeline(&ctx)
    .on_cancel(|_ctx, _c| Ok(0))
    .on_cancel(|_ctx, c| Ok(*c.result() * 100));

  let outcome = pipeline.perform(6).unwrap().ready().unwrap();
  assert_eq!(outcome.into_value(), Some(600));
}

#[tokio::test]
#[serial]
async fn test_cancellation_after_pending_step_is_detected() {
  setup_tracing();
  let steps: Vec<Step<Calculator, i64, TestError>> = vec![
    Step::func(|_ctx, v: i64| Ok(StepFlow::pending(async move { Ok(v + 1) }))),
    Step::func(|_ctx, v: i64| {
      Ok(StepFlow::deferred(async move {
        tokio::task::yield_now().await;
        if v > 5 {
          Ok(cancel_with(format!("{v} is too large")))
        } else {
          Ok(StepFlow::value(v))
        }
      }))
    })
    .with_label("bounded"),
    Step::named("step3").unwrap(),
  ];
  let ctx = ContextData::new(Calculator::default());
  let pipeline = Pipeline::new(ctx.clone(), steps).unwrap();

  let outcome = pipeline.perform(9).unwrap().await.unwrap();

  let cancellation = outcome.into_cancellation().unwrap();
  assert_eq!(*cancellation.result(), 10);
  assert_eq!(cancellation.step_name(), "bounded");
  assert_eq!(cancellation.reason().as_deref(), Some("10 is too large"));
  assert!(ctx.read().calls.is_empty());
  assert_eq!(pipeline.successful_steps().len(), 1);

  let outcome = pipeline.perform(2).unwrap().await.unwrap();
  assert_eq!(outcome.into_value(), Some(9));
}

#[tokio::test]
#[serial]
async fn test_pending_run_cancellation_goes_to_handler() {
  setup_tracing();
  reset_counters();
  let ctx = ContextData::new(Greeter::default());
  let steps: Vec<Step<Greeter, String, TestError>> = vec![
    Step::named("foo").unwrap(),
    Step::func(|_ctx, v: String| Ok(if v.len() > 6 { cancel_with("too long") } else { StepFlow::value(v) })),
    Step::named("baz").unwrap(),
  ];
  let pipeline = Pipeline::new(ctx.clone(), steps)
    .unwrap()
    .on_cancel(|_ctx, c| Ok(format!("{}!", c.into_result())));

  let outcome = pipeline.perform("Bar".to_string()).unwrap().await.unwrap();
  assert_eq!(outcome.into_value().as_deref(), Some("FooBarBaz"));

  let outcome = pipeline.perform("Barbecue".to_string()).unwrap().await.unwrap();
  assert_eq!(outcome.into_value().as_deref(), Some("FooBarbecue!"));
  assert_eq!(ctx.read().seen, vec!["FooBar"]);
}

#[tokio::test]
#[serial]
async fn test_raw_result_records_cancellation() {
  setup_tracing();
  let ctx = ContextData::new(Calculator::default());
  let pipeline = calculator_pipeline(&ctx);

  pipeline.perform(2).unwrap();
  assert!(matches!(pipeline.result(), Some(Folded::Complete(16))));

  pipeline.perform(8).unwrap();
  let raw = pipeline.result().unwrap();
  assert!(raw.is_cancelled());
  assert_eq!(raw.cancellation().unwrap().step().to_string(), "step2 (#1)");
}

#[tokio::test]
#[serial]
async fn test_reason_and_label_values() {
  setup_tracing();
  assert_eq!(Reason::default().evaluate(), None);
  assert_eq!(Reason::from("literal").evaluate().as_deref(), Some("literal"));
  assert_eq!(format!("{:?}", Reason::from("x")), "Literal(\"x\")");

  let label = StepLabel::anonymous(3);
  assert_eq!(label.name(), "anonymous#3");
  assert_eq!(label.to_string(), "anonymous#3 (#3)");
  assert_eq!(StepLabel::new(0, "load").to_string(), "load (#0)");

  let token: StepFlow<i64, TestError> = cancel_with("stop");
  assert!(token.is_cancel());
  assert!(!token.is_pending());
}
