// stepwise/src/core/flow.rs

//! What a step hands back to the engine: a value, a value that is still being
//! computed, or a request to cancel the rest of the run.

use crate::core::cancellation::Cancel;
use std::future::Future;
use std::pin::Pin;

/// A boxed future resolving to the settled (or further pending) flow of a step.
pub type BoxedFlow<V, Err> = Pin<Box<dyn Future<Output = Result<StepFlow<V, Err>, Err>> + Send>>;

/// Return type of every step body.
///
/// `Err` is the step's own failure; it is never turned into a cancellation.
pub type StepResult<V, Err> = Result<StepFlow<V, Err>, Err>;

/// Result of invoking a single step.
pub enum StepFlow<V, Err> {
  /// The step finished synchronously with this value.
  Value(V),
  /// The step's value is still being computed. Every later step is scheduled
  /// after this future settles.
  Pending(BoxedFlow<V, Err>),
  /// The step asks the engine to stop the run.
  Cancel(Cancel),
}

impl<V, Err> StepFlow<V, Err> {
  pub fn value(value: V) -> Self {
    StepFlow::Value(value)
  }

  pub fn is_pending(&self) -> bool {
    matches!(self, StepFlow::Pending(_))
  }

  pub fn is_cancel(&self) -> bool {
    matches!(self, StepFlow::Cancel(_))
  }
}

impl<V, Err> StepFlow<V, Err>
where
  V: Send + 'static,
  Err: Send + 'static,
{
  /// Wraps a future producing a plain value.
  pub fn pending<F>(fut: F) -> Self
  where
    F: Future<Output = Result<V, Err>> + Send + 'static,
  {
    StepFlow::Pending(Box::pin(async move { fut.await.map(StepFlow::Value) }))
  }

  /// Wraps a future that decides its flow once it completes, so a pending step
  /// can still cancel (or hand back yet another pending value).
  pub fn deferred<F>(fut: F) -> Self
  where
    F: Future<Output = StepResult<V, Err>> + Send + 'static,
  {
    StepFlow::Pending(Box::pin(fut))
  }
}

impl<V: std::fmt::Debug, Err> std::fmt::Debug for StepFlow<V, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StepFlow::Value(v) => f.debug_tuple("Value").field(v).finish(),
      StepFlow::Pending(_) => f.write_str("Pending(..)"),
      StepFlow::Cancel(c) => f.debug_tuple("Cancel").field(c).finish(),
    }
  }
}

/// A flow that is no longer pending.
#[derive(Debug)]
pub enum Settled<V> {
  Value(V),
  Cancel(Cancel),
}

impl<V, Err> StepFlow<V, Err> {
  /// Splits off the pending case.
  pub fn into_settled(self) -> Result<Settled<V>, BoxedFlow<V, Err>> {
    match self {
      StepFlow::Value(v) => Ok(Settled::Value(v)),
      StepFlow::Cancel(c) => Ok(Settled::Cancel(c)),
      StepFlow::Pending(fut) => Err(fut),
    }
  }
}

/// Awaits a flow until it is no longer pending. Pending values that resolve to
/// further pending values are flattened.
pub async fn settle<V, Err>(mut flow: StepFlow<V, Err>) -> Result<Settled<V>, Err> {
  loop {
    match flow.into_settled() {
      Ok(settled) => return Ok(settled),
      Err(fut) => flow = fut.await?,
    }
  }
}
