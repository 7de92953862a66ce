// stepwise/src/pipeline/execution.rs

//! Contains `Pipeline::perform()`, which runs the composed steps, records the
//! run and hands a cancelled run to the cancel handler.

use crate::compose::pipe::{Piped, Run};
use crate::compose::reduce::Folded;
use crate::compose::report::RunReport;
use crate::core::context::{CancelFn, StepMethods};
use crate::core::context_data::ContextData;
use crate::core::control::{Performance, PipelineOutcome};
use crate::pipeline::definition::{LastRun, Pipeline};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{event, instrument, Instrument, Level, Span};

impl<TData, V, Err> Pipeline<TData, V, Err>
where
  TData: StepMethods<V, Err>,
  V: Clone + Send + 'static,
  Err: Send + 'static,
{
  /// Runs every step in order, starting from `input`.
  ///
  /// A run where every step answers synchronously completes before this
  /// returns (`Performance::Ready`). Once a step answers with a pending value
  /// the rest of the run is returned as `Performance::Pending`.
  ///
  /// A step error is returned as-is: synchronously here, or from the pending
  /// future. Such a run leaves the pipeline not performed.
  #[instrument(
    name = "Pipeline::perform",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.len(),
    )
  )]
  pub fn perform(&self, input: V) -> Result<Performance<V, Err>, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");
    self.last_run.lock().begin();

    let piped = match self.pipe.run(input) {
      Ok(piped) => piped,
      Err(e) => {
        event!(Level::ERROR, "Step failed, run aborted.");
        return Err(e);
      }
    };

    match piped {
      Piped::Empty => {
        self.last_run.lock().finish(None, RunReport::new(0));
        event!(Level::DEBUG, "Pipeline has no steps.");
        Ok(Performance::Ready(PipelineOutcome::Empty))
      }
      Piped::Ready(run) => {
        let outcome = finish_run(&self.last_run, &self.context, self.cancel_handler.as_ref(), run)?;
        Ok(Performance::Ready(outcome))
      }
      Piped::Pending(fut) => {
        event!(Level::DEBUG, "Run continues after a pending step.");
        let last_run = Arc::clone(&self.last_run);
        let context = self.context.clone();
        let handler = self.cancel_handler.clone();
        let pending = async move {
          let run = match fut.await {
            Ok(run) => run,
            Err(e) => {
              event!(Level::ERROR, "Step failed after a pending step, run aborted.");
              return Err(e);
            }
          };
          finish_run(&last_run, &context, handler.as_ref(), run)
        };
        Ok(Performance::Pending(Box::pin(pending.instrument(Span::current()))))
      }
    }
  }
}

/// Stores the settled run and turns it into the caller-facing outcome.
fn finish_run<TData, V, Err>(
  last_run: &Mutex<LastRun<V>>,
  context: &ContextData<TData>,
  handler: Option<&CancelFn<TData, V, Err>>,
  run: Run<V>,
) -> Result<PipelineOutcome<V>, Err>
where
  TData: Send + Sync + 'static,
  V: Clone,
{
  let Run { outcome, report } = run;
  event!(
    Level::DEBUG,
    performed = report.performed_count(),
    skipped = report.skipped_count(),
    "Run settled."
  );
  last_run.lock().finish(Some(outcome.clone()), report);

  match outcome {
    Folded::Complete(value) => {
      event!(Level::DEBUG, "Pipeline run completed.");
      Ok(PipelineOutcome::Completed(value))
    }
    Folded::Cancelled(cancellation) => match handler {
      Some(handler) => {
        event!(Level::DEBUG, step = %cancellation.step(), "Dispatching cancellation to cancel handler.");
        handler(context.clone(), cancellation).map(PipelineOutcome::Recovered)
      }
      None => Ok(PipelineOutcome::Cancelled(cancellation)),
    },
  }
}
