// stepwise/src/core/control.rs

//! Outcome of a pipeline run, and the synchronous-or-pending wrapper `perform`
//! returns it in.

use crate::core::cancellation::Cancellation;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// How a pipeline run ended.
#[derive(Debug, Clone)]
pub enum PipelineOutcome<V> {
  /// Every step ran; this is the last step's value.
  Completed(V),
  /// A step cancelled, or the context went away, and no cancel handler is
  /// registered.
  Cancelled(Cancellation<V>),
  /// The run was cancelled and the registered cancel handler produced this
  /// value in its place.
  Recovered(V),
  /// The pipeline has no steps.
  Empty,
}

impl<V> PipelineOutcome<V> {
  pub fn is_completed(&self) -> bool {
    matches!(self, PipelineOutcome::Completed(_))
  }

  /// True for runs that were cut short, whether or not a handler recovered.
  pub fn was_cancelled(&self) -> bool {
    matches!(self, PipelineOutcome::Cancelled(_) | PipelineOutcome::Recovered(_))
  }

  pub fn value(&self) -> Option<&V> {
    match self {
      PipelineOutcome::Completed(v) | PipelineOutcome::Recovered(v) => Some(v),
      PipelineOutcome::Cancelled(_) | PipelineOutcome::Empty => None,
    }
  }

  pub fn into_value(self) -> Option<V> {
    match self {
      PipelineOutcome::Completed(v) | PipelineOutcome::Recovered(v) => Some(v),
      PipelineOutcome::Cancelled(_) | PipelineOutcome::Empty => None,
    }
  }

  pub fn cancellation(&self) -> Option<&Cancellation<V>> {
    match self {
      PipelineOutcome::Cancelled(c) => Some(c),
      _ => None,
    }
  }

  pub fn into_cancellation(self) -> Option<Cancellation<V>> {
    match self {
      PipelineOutcome::Cancelled(c) => Some(c),
      _ => None,
    }
  }
}

pub type PendingOutcome<V, Err> = Pin<Box<dyn Future<Output = Result<PipelineOutcome<V>, Err>> + Send>>;

/// Return value of `Pipeline::perform`.
///
/// Fully synchronous runs are `Ready` and need no executor. A run in which any
/// step went pending is `Pending`. Both can be `.await`ed.
pub enum Performance<V, Err> {
  Ready(PipelineOutcome<V>),
  Pending(PendingOutcome<V, Err>),
}

impl<V, Err> Performance<V, Err> {
  pub fn is_pending(&self) -> bool {
    matches!(self, Performance::Pending(_))
  }

  /// The outcome of a synchronous run; `None` if the run is pending.
  pub fn ready(self) -> Option<PipelineOutcome<V>> {
    match self {
      Performance::Ready(outcome) => Some(outcome),
      Performance::Pending(_) => None,
    }
  }
}

impl<V, Err> IntoFuture for Performance<V, Err>
where
  V: Send + 'static,
  Err: Send + 'static,
{
  type Output = Result<PipelineOutcome<V>, Err>;
  type IntoFuture = PendingOutcome<V, Err>;

  fn into_future(self) -> Self::IntoFuture {
    match self {
      Performance::Ready(outcome) => Box::pin(async move { Ok(outcome) }),
      Performance::Pending(fut) => fut,
    }
  }
}

impl<V: std::fmt::Debug, Err> std::fmt::Debug for Performance<V, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Performance::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
      Performance::Pending(_) => f.write_str("Pending(..)"),
    }
  }
}
