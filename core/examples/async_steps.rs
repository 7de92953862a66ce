// stepwise/examples/async_steps.rs

use std::time::Duration;
use stepwise::{step_fn, ContextData, Lifecycle, Pipeline, Step, StepFlow, StepFn, StepMethods, StepResult};
use tracing::info;

// 1. A custom application error type
#[derive(Debug, thiserror::Error)]
enum FetchError {
  #[error("Lookup failed: {0}")]
  Lookup(String),

  #[error("Stepwise framework error: {0}")]
  Stepwise(#[from] stepwise::StepwiseError),
}

// 2. A context that can be shut down while a run is in flight
#[derive(Debug, Default)]
struct FetchContext {
  shut_down: bool,
  lookups: usize,
}

impl Lifecycle for FetchContext {
  fn is_destroyed(&self) -> bool {
    self.shut_down
  }
}

impl FetchContext {
  fn normalize(_ctx: ContextData<Self>, v: String) -> StepResult<String, FetchError> {
    Ok(StepFlow::value(v.trim().to_lowercase()))
  }

  // Answers with a pending value; later steps wait for it.
  fn lookup(ctx: ContextData<Self>, v: String) -> StepResult<String, FetchError> {
    Ok(StepFlow::pending(async move {
      tokio::time::sleep(Duration::from_millis(20)).await;
      if v.is_empty() {
        return Err(FetchError::Lookup("empty key".to_string()));
      }
      ctx.write().lookups += 1;
      Ok(format!("record:{v}"))
    }))
  }

  fn decorate(_ctx: ContextData<Self>, v: String) -> StepResult<String, FetchError> {
    Ok(StepFlow::value(format!("<{v}>")))
  }
}

impl StepMethods<String, FetchError> for FetchContext {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, String, FetchError>> {
    match name {
      "normalize" => Some(step_fn(Self::normalize)),
      "lookup" => Some(step_fn(Self::lookup)),
      "decorate" => Some(step_fn(Self::decorate)),
      _ => None,
    }
  }
}

#[tokio::main]
async fn main() -> Result<(), FetchError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Async Steps Example ---");

  let context = ContextData::new(FetchContext::default());
  let steps: Vec<Step<FetchContext, String, FetchError>> = vec![
    Step::named("normalize")?,
    Step::named("lookup")?,
    Step::named("decorate")?,
  ];
  let pipeline = Pipeline::new(context.clone(), steps)?;

  // Scenario 1: the run goes pending at `lookup` and settles later.
  let performance = pipeline.perform("  Alice ".to_string())?;
  info!("Run pending: {}", performance.is_pending());
  let outcome = performance.await?;
  info!("Outcome: {:?}", outcome);

  // Scenario 2: the context shuts down while `lookup` is pending.
  let performance = pipeline.perform("Bob".to_string())?;
  context.write().shut_down = true;
  let outcome = performance.await?;
  if let Some(cancellation) = outcome.cancellation() {
    info!(
      "Cancelled at {} with {:?}: {:?}",
      cancellation.step(),
      cancellation.result(),
      cancellation.reason()
    );
  }
  context.write().shut_down = false;

  // Scenario 3: the pending step fails; the error reaches the caller as-is.
  match pipeline.perform("   ".to_string())?.await {
    Ok(outcome) => info!("Unexpected outcome: {:?}", outcome),
    Err(e) => info!("Run failed: {}", e),
  }

  info!("Lookups performed: {}", context.read().lookups);
  Ok(())
}
