// stepwise/examples/error_handling.rs

use stepwise::{step_fn, ContextData, Lifecycle, Pipeline, Step, StepFlow, StepFn, StepMethods, StepResult, StepwiseError};
use tracing::{error, info};

// 1. Define a custom application error type
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("A custom application error occurred: {0}")]
  CustomError(String),

  #[error("Stepwise framework error: {0}")]
  StepwiseFramework(#[from] StepwiseError), // Allows StepwiseError to be converted into ExampleAppError
}

// 2. Define Context Data
#[derive(Clone, Debug, Default)]
struct ErrorContext {
  processed_steps: Vec<String>,
}

impl Lifecycle for ErrorContext {}

impl ErrorContext {
  fn step_one(ctx: ContextData<Self>, v: u32) -> StepResult<u32, ExampleAppError> {
    info!("Executing step_one");
    ctx.write().processed_steps.push("step_one".to_string());
    Ok(StepFlow::value(v + 1))
  }

  fn step_two_fails(ctx: ContextData<Self>, _v: u32) -> StepResult<u32, ExampleAppError> {
    info!("Executing step_two_fails - this will error");
    ctx.write().processed_steps.push("step_two_fails".to_string());
    Err(ExampleAppError::CustomError("Something went wrong in step_two!".to_string()))
  }

  fn step_three(ctx: ContextData<Self>, v: u32) -> StepResult<u32, ExampleAppError> {
    error!("step_three executed (SHOULD NOT HAPPEN)");
    ctx.write().processed_steps.push("step_three".to_string());
    Ok(StepFlow::value(v))
  }
}

impl StepMethods<u32, ExampleAppError> for ErrorContext {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, u32, ExampleAppError>> {
    match name {
      "step_one" => Some(step_fn(Self::step_one)),
      "step_two_fails" => Some(step_fn(Self::step_two_fails)),
      "step_three" => Some(step_fn(Self::step_three)),
      _ => None,
    }
  }
}

fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  // Scenario 1: A step returns a custom error
  info!("\nScenario 1: Step returns a custom error");
  if let Err(e) = run_pipeline_with_step_error() {
    error!("Unexpected setup failure: {}", e);
  }

  // Scenario 2: Framework errors raised while building the pipeline
  info!("\nScenario 2: Stepwise framework errors (construction time)");
  run_pipeline_with_framework_errors();
}

fn run_pipeline_with_step_error() -> Result<(), ExampleAppError> {
  let context = ContextData::new(ErrorContext::default());
  let steps: Vec<Step<ErrorContext, u32, ExampleAppError>> = vec![
    Step::named("step_one")?,
    Step::named("step_two_fails")?,
    Step::named("step_three")?, // Should not run
  ];
  let pipeline = Pipeline::new(context.clone(), steps)?;

  match pipeline.perform(1) {
    Ok(performance) => error!("Pipeline succeeded unexpectedly: {:?}", performance),
    Err(e) => {
      info!("Pipeline failed as expected: {}", e);
      assert!(matches!(e, ExampleAppError::CustomError(_)));
    }
  }

  // A failed run never settles, so nothing counts as performed.
  info!("Pipeline performed: {}", pipeline.is_performed());
  info!("Processed steps: {:?}", context.read().processed_steps);
  assert_eq!(context.read().processed_steps, vec!["step_one", "step_two_fails"]);
  Ok(())
}

fn run_pipeline_with_framework_errors() {
  // No context at all.
  let missing = Pipeline::<ErrorContext, u32, ExampleAppError>::new(None::<ContextData<ErrorContext>>, Vec::new());
  if let Err(e) = missing {
    info!("MissingContext: {}", e);
  }

  // A name the context does not offer.
  let unresolved = Step::named("step_four")
    .and_then(|step| Pipeline::<ErrorContext, u32, ExampleAppError>::new(ContextData::new(ErrorContext::default()), vec![step]));
  if let Err(e) = unresolved {
    info!("UnresolvedStep: {}", e);
  }

  // A blank name is not a step descriptor.
  if let Err(e) = Step::<ErrorContext, u32, ExampleAppError>::named("") {
    info!("InvalidStepKind: {}", e);
  }

  // The framework error converts into the application error.
  let app_error: ExampleAppError = StepwiseError::MissingContext.into();
  info!("As application error: {}", app_error);
}
