// stepwise/src/pipeline/definition.rs

//! Contains the `Pipeline<TData, V, Err>` struct, its construction (binding
//! every step to the context once) and its read-only views.

use crate::compose::pipe::{pipe, Pipe};
use crate::compose::reduce::Folded;
use crate::compose::report::RunReport;
use crate::core::cancellation::Cancellation;
use crate::core::context::{cancel_fn, CancelFn, StepMethods};
use crate::core::context_data::ContextData;
use crate::core::lifecycle::{Lifecycle, LifecycleProbe, LivenessProbe};
use crate::core::step::{BoundStep, Step};
use crate::error::{StepwiseError, StepwiseResult};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{event, Level};

/// Bookkeeping of the most recently settled run.
pub(crate) struct LastRun<V> {
  pub(crate) is_performed: bool,
  pub(crate) result: Option<Folded<V>>,
  pub(crate) report: Option<RunReport>,
}

impl<V> LastRun<V> {
  fn new() -> Self {
    Self {
      is_performed: false,
      result: None,
      report: None,
    }
  }

  pub(crate) fn begin(&mut self) {
    self.is_performed = false;
  }

  pub(crate) fn finish(&mut self, result: Option<Folded<V>>, report: RunReport) {
    self.result = result;
    self.report = Some(report);
    self.is_performed = true;
  }
}

/// An ordered list of steps bound to one context.
///
/// `TData` is the context's data type, `V` the value threaded from step to
/// step, `Err` the error type step bodies fail with.
///
/// A pipeline is built once and can be performed any number of times. Each
/// run records which steps it performed in its own [`RunReport`]; the views
/// (`successful_steps`, `cancelled_steps`, `result`) reflect the run that
/// settled last.
pub struct Pipeline<TData, V, Err>
where
  TData: Send + Sync + 'static,
{
  pub(crate) context: ContextData<TData>,
  pub(crate) pipe: Pipe<BoundStep<TData, V, Err>>,
  pub(crate) cancel_handler: Option<CancelFn<TData, V, Err>>,
  pub(crate) last_run: Arc<Mutex<LastRun<V>>>,
}

impl<TData, V, Err> Pipeline<TData, V, Err>
where
  TData: StepMethods<V, Err>,
  V: Clone + Send + 'static,
  Err: Send + 'static,
{
  /// Builds a pipeline whose steps are gated on the context's [`Lifecycle`]
  /// flags.
  ///
  /// Fails with `MissingContext` when `context` is `None`, with
  /// `UnresolvedStep` when a named step has no callable on the context.
  pub fn new(
    context: impl Into<Option<ContextData<TData>>>,
    steps: Vec<Step<TData, V, Err>>,
  ) -> StepwiseResult<Self>
  where
    TData: Lifecycle,
  {
    Self::with_probe(context, steps, LifecycleProbe)
  }

  /// Builds a pipeline with an injected liveness probe.
  pub fn with_probe(
    context: impl Into<Option<ContextData<TData>>>,
    steps: Vec<Step<TData, V, Err>>,
    probe: impl LivenessProbe<TData> + 'static,
  ) -> StepwiseResult<Self> {
    let context: Option<ContextData<TData>> = context.into();
    let context = context.ok_or(StepwiseError::MissingContext)?;
    let probe: Arc<dyn LivenessProbe<TData>> = Arc::new(probe);
    let pipe = Self::create_pipeline(&context, &probe, steps)?;
    event!(
      Level::DEBUG,
      context_type = %std::any::type_name::<TData>(),
      num_steps = pipe.len(),
      "Pipeline built."
    );

    Ok(Self {
      context,
      pipe,
      cancel_handler: None,
      last_run: Arc::new(Mutex::new(LastRun::new())),
    })
  }

  /// Binds every step to `context` and composes them. Runs once, at
  /// construction.
  fn create_pipeline(
    context: &ContextData<TData>,
    probe: &Arc<dyn LivenessProbe<TData>>,
    steps: Vec<Step<TData, V, Err>>,
  ) -> StepwiseResult<Pipe<BoundStep<TData, V, Err>>> {
    let bound = steps
      .into_iter()
      .enumerate()
      .map(|(index, step)| step.bind_to(context, Arc::clone(probe), index))
      .collect::<StepwiseResult<Vec<_>>>()?;
    Ok(pipe(bound))
  }

  /// Registers the cancel handler, replacing any previous one.
  pub fn on_cancel(
    mut self,
    handler: impl Fn(ContextData<TData>, Cancellation<V>) -> Result<V, Err> + Send + Sync + 'static,
  ) -> Self {
    if self.cancel_handler.is_some() {
      event!(Level::DEBUG, "Replacing previously registered cancel handler.");
    }
    self.cancel_handler = Some(cancel_fn(handler));
    self
  }

  /// Registers a cancel handler the context resolves by name.
  pub fn on_cancel_named(mut self, handler_name: &str) -> StepwiseResult<Self> {
    let resolved = self.context.read().resolve_cancel_handler(handler_name);
    match resolved {
      Some(handler) => {
        self.cancel_handler = Some(handler);
        Ok(self)
      }
      None => Err(StepwiseError::InvalidHandler {
        handler_name: handler_name.to_string(),
        context: format!("<{}>", std::any::type_name::<TData>()),
      }),
    }
  }
}

impl<TData, V, Err> Pipeline<TData, V, Err>
where
  TData: Send + Sync + 'static,
{
  pub fn context(&self) -> &ContextData<TData> {
    &self.context
  }

  pub fn steps(&self) -> &[BoundStep<TData, V, Err>] {
    self.pipe.stages()
  }

  pub fn len(&self) -> usize {
    self.pipe.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pipe.is_empty()
  }

  pub fn has_cancel_handler(&self) -> bool {
    self.cancel_handler.is_some()
  }

  /// True once a run has settled, false again while the next run is in flight.
  pub fn is_performed(&self) -> bool {
    self.last_run.lock().is_performed
  }

  /// Raw result of the last settled run, before any cancel handler. `None`
  /// before the first run and for pipelines without steps.
  pub fn result(&self) -> Option<Folded<V>>
  where
    V: Clone,
  {
    self.last_run.lock().result.clone()
  }

  pub fn last_report(&self) -> Option<RunReport> {
    self.last_run.lock().report.clone()
  }

  pub fn is_step_performed(&self, index: usize) -> bool {
    let last_run = self.last_run.lock();
    last_run.is_performed && last_run.report.as_ref().is_some_and(|r| r.is_performed(index))
  }

  /// Steps the last run performed. Empty until a run has settled.
  pub fn successful_steps(&self) -> Vec<&BoundStep<TData, V, Err>> {
    self.partition_steps(true)
  }

  /// Steps the last run did not perform. Empty until a run has settled.
  pub fn cancelled_steps(&self) -> Vec<&BoundStep<TData, V, Err>> {
    self.partition_steps(false)
  }

  fn partition_steps(&self, performed: bool) -> Vec<&BoundStep<TData, V, Err>> {
    let last_run = self.last_run.lock();
    let steps = match (&last_run.report, last_run.is_performed) {
      (Some(report), true) => self
        .steps()
        .iter()
        .filter(|s| report.is_performed(s.index()) == performed)
        .collect(),
      _ => Vec::new(),
    };
    steps
  }
}

impl<TData, V, Err> std::fmt::Debug for Pipeline<TData, V, Err>
where
  TData: Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("context_type", &std::any::type_name::<TData>())
      .field("steps", &self.steps())
      .field("cancel_handler_present", &self.cancel_handler.is_some())
      .field("is_performed", &self.is_performed())
      .finish()
  }
}
