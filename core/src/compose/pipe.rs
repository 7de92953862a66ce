// stepwise/src/compose/pipe.rs

//! Function composition over stages.
//!
//! The first stage receives the run's input, every later stage the previous
//! stage's result. As long as every stage answers synchronously the whole run
//! completes inside [`Pipe::run`]. The first pending answer turns the rest of
//! the run into a single future: later stages are only invoked once the
//! pending value settles, in order.

use crate::compose::reduce::{reduce, resume, Folded, Gated, Reduction};
use crate::compose::report::RunReport;
use crate::core::flow::StepResult;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

/// Anything the pipe can thread a value through.
pub trait Stage<V, Err>: Gated + Send + Sync {
  fn perform(&self, input: V) -> StepResult<V, Err>;
}

/// A context-free stage: a plain closure over the threaded value.
pub type Callable<V, Err> = Box<dyn Fn(V) -> StepResult<V, Err> + Send + Sync>;

pub fn callable<V, Err>(f: impl Fn(V) -> StepResult<V, Err> + Send + Sync + 'static) -> Callable<V, Err> {
  Box::new(f)
}

impl<V, Err> Gated for Callable<V, Err> {}

impl<V, Err> Stage<V, Err> for Callable<V, Err> {
  fn perform(&self, input: V) -> StepResult<V, Err> {
    self(input)
  }
}

/// Outcome of one run through a pipe, with the steps it performed.
#[derive(Debug, Clone)]
pub struct Run<V> {
  pub outcome: Folded<V>,
  pub report: RunReport,
}

pub type PendingRun<V, Err> = Pin<Box<dyn Future<Output = Result<Run<V>, Err>> + Send>>;

/// What [`Pipe::run`] hands back.
pub enum Piped<V, Err> {
  /// The pipe has no stages.
  Empty,
  /// Every stage answered synchronously.
  Ready(Run<V>),
  /// A stage went pending; the future settles to the final run.
  Pending(PendingRun<V, Err>),
}

impl<V, Err> Piped<V, Err> {
  pub fn is_pending(&self) -> bool {
    matches!(self, Piped::Pending(_))
  }

  /// The finished run, if the pipe completed synchronously.
  pub fn ready(self) -> Option<Run<V>> {
    match self {
      Piped::Ready(run) => Some(run),
      Piped::Empty | Piped::Pending(_) => None,
    }
  }
}

impl<V, Err> IntoFuture for Piped<V, Err>
where
  V: Send + 'static,
  Err: Send + 'static,
{
  type Output = Result<Option<Run<V>>, Err>;
  type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

  fn into_future(self) -> Self::IntoFuture {
    match self {
      Piped::Empty => Box::pin(async { Ok(None) }),
      Piped::Ready(run) => Box::pin(async move { Ok(Some(run)) }),
      Piped::Pending(fut) => Box::pin(async move { fut.await.map(Some) }),
    }
  }
}

impl<V: std::fmt::Debug, Err> std::fmt::Debug for Piped<V, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Piped::Empty => f.write_str("Empty"),
      Piped::Ready(run) => f.debug_tuple("Ready").field(run).finish(),
      Piped::Pending(_) => f.write_str("Pending(..)"),
    }
  }
}

/// A composed sequence of stages, runnable any number of times.
pub struct Pipe<S> {
  stages: Arc<[S]>,
}

fn perform_stage<S, V, Err>(acc: &V, stage: &S, _index: usize, _stages: &[S]) -> StepResult<V, Err>
where
  S: Stage<V, Err>,
  V: Clone,
{
  stage.perform(acc.clone())
}

impl<S> Pipe<S> {
  pub fn new(stages: Vec<S>) -> Self {
    Self { stages: stages.into() }
  }

  pub fn stages(&self) -> &[S] {
    &self.stages
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  /// Threads `input` through every stage.
  ///
  /// Errors raised synchronously by a stage are returned here; errors raised
  /// after a pending stage surface from the pending future.
  pub fn run<V, Err>(&self, input: V) -> Result<Piped<V, Err>, Err>
  where
    S: Stage<V, Err> + 'static,
    V: Clone + Send + 'static,
    Err: Send + 'static,
  {
    if self.stages.is_empty() {
      return Ok(Piped::Empty);
    }

    let mut report = RunReport::new(self.stages.len());
    match reduce(&self.stages[..], perform_stage::<S, V, Err>, input, &mut report)? {
      Reduction::Settled(outcome) => Ok(Piped::Ready(Run { outcome, report })),
      Reduction::Suspended(suspension) => {
        let stages = Arc::clone(&self.stages);
        Ok(Piped::Pending(Box::pin(async move {
          let outcome = resume(&stages[..], suspension, perform_stage::<S, V, Err>, &mut report).await?;
          Ok(Run { outcome, report })
        })))
      }
    }
  }
}

impl<S> Clone for Pipe<S> {
  fn clone(&self) -> Self {
    Self {
      stages: Arc::clone(&self.stages),
    }
  }
}

/// Composes `stages` into a [`Pipe`].
pub fn pipe<S>(stages: Vec<S>) -> Pipe<S> {
  Pipe::new(stages)
}
