// stepwise/examples/basic_pipeline.rs

use stepwise::{
  step_fn, ContextData, Lifecycle, Pipeline, PipelineOutcome, Step, StepFlow, StepFn, StepMethods, StepResult,
  StepwiseError,
};
use tracing::info;

// 1. Define the context the steps are bound to
#[derive(Clone, Debug, Default)]
struct BasicContext {
  message_log: Vec<String>,
}

// Never torn down, so the default lifecycle flags do.
impl Lifecycle for BasicContext {}

// 2. Define the steps as methods on the context.
//    For simplicity, this example uses StepwiseError directly as the step error type.
//    In real applications, you'd typically define a custom error:
//    #[derive(Debug, thiserror::Error)]
//    enum MyError { #[error("Stepwise: {0}")] Stepwise(#[from] StepwiseError), /* ... */ }
impl BasicContext {
  fn add_one(ctx: ContextData<Self>, v: i32) -> StepResult<i32, StepwiseError> {
    let msg = format!("Alpha executed: {} -> {}", v, v + 1);
    info!("{}", msg);
    ctx.write().message_log.push(msg);
    Ok(StepFlow::value(v + 1))
  }

  fn double(ctx: ContextData<Self>, v: i32) -> StepResult<i32, StepwiseError> {
    let msg = format!("Beta executed: {} -> {}", v, v * 2);
    info!("{}", msg);
    ctx.write().message_log.push(msg);
    Ok(StepFlow::value(v * 2))
  }
}

// 3. Let the context resolve its steps by name
impl StepMethods<i32, StepwiseError> for BasicContext {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, i32, StepwiseError>> {
    match name {
      "add_one" => Some(step_fn(Self::add_one)),
      "double" => Some(step_fn(Self::double)),
      _ => None,
    }
  }
}

fn main() -> Result<(), StepwiseError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 4. Describe the steps: two by name, one closure
  let steps: Vec<Step<BasicContext, i32, StepwiseError>> = vec![
    Step::named("add_one")?,
    Step::named("double")?,
    Step::func(|ctx: ContextData<BasicContext>, v: i32| {
      let msg = format!("Gamma executed: {} -> {}", v, v - 1);
      info!("{}", msg);
      ctx.write().message_log.push(msg);
      Ok(StepFlow::value(v - 1))
    })
    .with_label("subtract_one"),
  ];

  // 5. Bind them to a context
  let context = ContextData::new(BasicContext::default());
  let pipeline = Pipeline::new(context.clone(), steps)?;

  // 6. Run the pipeline; every step is synchronous, so the outcome is ready
  info!("Starting pipeline execution...");
  let outcome = pipeline.perform(5)?.ready();

  // 7. Inspect the results
  match outcome {
    Some(PipelineOutcome::Completed(value)) => {
      info!("Pipeline completed successfully with {}", value);
      // Expected: (5+1)*2 - 1 = 11
      assert_eq!(value, 11);
    }
    other => info!("Unexpected outcome: {:?}", other),
  }

  let final_context_state = context.read();
  info!("Execution log:");
  for log_entry in &final_context_state.message_log {
    info!("- {}", log_entry);
  }
  assert_eq!(final_context_state.message_log.len(), 3);
  assert_eq!(pipeline.successful_steps().len(), 3);

  Ok(())
}
