// stepwise/examples/pipeline_cancel.rs

use stepwise::{
  cancel_fn, cancel_with, step_fn, CancelFn, Cancellation, ContextData, Lifecycle, Pipeline, PipelineOutcome, Step,
  StepFlow, StepFn, StepMethods, StepResult, StepwiseError,
};
use tracing::{error, info};

// 1. Define Context Data
#[derive(Clone, Debug, Default)]
struct CancelContext {
  log: Vec<String>,
  last_report: Option<String>,
}

impl Lifecycle for CancelContext {}

impl CancelContext {
  fn double(ctx: ContextData<Self>, v: i64) -> StepResult<i64, StepwiseError> {
    ctx.write().log.push(format!("double({v})"));
    Ok(StepFlow::value(v * 2))
  }

  fn check_limit(ctx: ContextData<Self>, v: i64) -> StepResult<i64, StepwiseError> {
    ctx.write().log.push(format!("check_limit({v})"));
    if v > 10 {
      // Signal the pipeline to stop; `v` never reaches the next step.
      return Ok(cancel_with(format!("{v} exceeds the limit of 10")));
    }
    Ok(StepFlow::value(v))
  }

  fn square(ctx: ContextData<Self>, v: i64) -> StepResult<i64, StepwiseError> {
    ctx.write().log.push(format!("square({v})"));
    Ok(StepFlow::value(v * v))
  }

  fn report_cancel(ctx: ContextData<Self>, cancellation: Cancellation<i64>) -> Result<i64, StepwiseError> {
    let report = format!(
      "cancelled on {} with last value {}: {}",
      cancellation.step(),
      cancellation.result(),
      cancellation.reason().unwrap_or_default()
    );
    ctx.write().last_report = Some(report);
    Ok(0)
  }
}

impl StepMethods<i64, StepwiseError> for CancelContext {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, i64, StepwiseError>> {
    match name {
      "double" => Some(step_fn(Self::double)),
      "check_limit" => Some(step_fn(Self::check_limit)),
      "square" => Some(step_fn(Self::square)),
      _ => None,
    }
  }

  fn resolve_cancel_handler(&self, name: &str) -> Option<CancelFn<Self, i64, StepwiseError>> {
    match name {
      "report_cancel" => Some(cancel_fn(Self::report_cancel)),
      _ => None,
    }
  }
}

fn steps() -> Result<Vec<Step<CancelContext, i64, StepwiseError>>, StepwiseError> {
  Ok(vec![Step::named("double")?, Step::named("check_limit")?, Step::named("square")?])
}

fn main() -> Result<(), StepwiseError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Pipeline Cancel Example ---");

  // Without a handler the caller gets the Cancellation itself.
  let context = ContextData::new(CancelContext::default());
  let pipeline = Pipeline::new(context.clone(), steps()?)?;

  match pipeline.perform(3)?.ready() {
    Some(PipelineOutcome::Completed(value)) => info!("3 -> {}", value),
    other => error!("Expected completion, got {:?}", other),
  }

  match pipeline.perform(8)?.ready() {
    Some(PipelineOutcome::Cancelled(cancellation)) => {
      info!(
        "Pipeline cancelled as expected at {} (last value {}, reason: {:?})",
        cancellation.step(),
        cancellation.result(),
        cancellation.reason()
      );
    }
    other => error!("Pipeline was expected to cancel, got {:?}", other),
  }
  let performed: Vec<&str> = pipeline.successful_steps().iter().map(|s| s.name()).collect();
  let skipped: Vec<&str> = pipeline.cancelled_steps().iter().map(|s| s.name()).collect();
  info!("Performed: {:?}, skipped: {:?}", performed, skipped);

  // With a handler registered, its value replaces the cancellation.
  let handled_context = ContextData::new(CancelContext::default());
  let handled = Pipeline::new(handled_context.clone(), steps()?)?.on_cancel_named("report_cancel")?;
  let outcome = handled.perform(8)?.ready();
  info!("Handled outcome: {:?}", outcome);
  if let Some(report) = &handled_context.read().last_report {
    info!("Handler report: {}", report);
  }

  info!("Execution Log:");
  for entry in &context.read().log {
    info!("- {}", entry);
  }

  Ok(())
}
