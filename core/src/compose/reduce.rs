// stepwise/src/compose/reduce.rs

//! Short-circuiting left fold.
//!
//! Walks items in order, applying a combining function to the accumulator and
//! the current item. After each application it checks, in this order:
//!  1. whether the item's context is still alive,
//!  2. whether the application returned a cancellation token.
//! Either condition stops the walk and wraps the *pre-step* accumulator into a
//! [`Cancellation`]. Otherwise the item is marked performed in the run report
//! and its value becomes the new accumulator.
//!
//! A pending value suspends the fold. [`resume`] awaits it, applies the same
//! checks to the settled value and carries on with the next item.

use crate::compose::report::RunReport;
use crate::core::cancellation::{Cancellation, Reason, StepLabel};
use crate::core::flow::{settle, BoxedFlow, Settled, StepFlow};
use crate::core::lifecycle::Liveness;
use tracing::{event, span, Level};

/// What the fold needs to know about an item besides what `combine` does with
/// it. Plain values get the defaults: always alive, anonymous.
pub trait Gated {
  fn liveness(&self) -> Liveness {
    Liveness::Alive
  }

  fn label(&self, index: usize) -> StepLabel {
    StepLabel::anonymous(index)
  }
}

/// Final state of a fold.
#[derive(Debug, Clone)]
pub enum Folded<A> {
  Complete(A),
  Cancelled(Cancellation<A>),
}

impl<A> Folded<A> {
  pub fn is_cancelled(&self) -> bool {
    matches!(self, Folded::Cancelled(_))
  }

  pub fn complete(self) -> Option<A> {
    match self {
      Folded::Complete(value) => Some(value),
      Folded::Cancelled(_) => None,
    }
  }

  pub fn cancellation(&self) -> Option<&Cancellation<A>> {
    match self {
      Folded::Cancelled(c) => Some(c),
      Folded::Complete(_) => None,
    }
  }
}

/// A fold that hit a pending value at `index`.
pub struct Suspension<A, Err> {
  index: usize,
  acc: A,
  pending: BoxedFlow<A, Err>,
}

impl<A, Err> Suspension<A, Err> {
  /// Index of the item whose value is pending.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Accumulator before the pending item ran.
  pub fn acc(&self) -> &A {
    &self.acc
  }
}

impl<A: std::fmt::Debug, Err> std::fmt::Debug for Suspension<A, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Suspension")
      .field("index", &self.index)
      .field("acc", &self.acc)
      .finish_non_exhaustive()
  }
}

#[derive(Debug)]
pub enum Reduction<A, Err> {
  Settled(Folded<A>),
  Suspended(Suspension<A, Err>),
}

enum Advance<A> {
  Next(A),
  Stop(Cancellation<A>),
}

/// Applies the stop checks to a settled step value.
fn advance<I: Gated, A>(item: &I, index: usize, pre_acc: A, settled: Settled<A>, report: &mut RunReport) -> Advance<A> {
  // A gone context wins even when the step itself asked to cancel.
  if let Liveness::Gone { context } = item.liveness() {
    let step = item.label(index);
    event!(Level::INFO, %step, %context, "Run cancelled: context destroyed.");
    return Advance::Stop(Cancellation::new(
      pre_acc,
      step,
      Reason::Literal(format!("{context} destroyed")),
    ));
  }

  match settled {
    Settled::Cancel(token) => {
      let step = item.label(index);
      let reason = token.into_reason();
      event!(Level::INFO, %step, reason = ?reason, "Run cancelled by step.");
      Advance::Stop(Cancellation::new(pre_acc, step, reason))
    }
    Settled::Value(value) => {
      report.mark_performed(index);
      event!(Level::DEBUG, "Step processing finished successfully.");
      Advance::Next(value)
    }
  }
}

fn reduce_from<I, A, Err, F>(
  items: &[I],
  start: usize,
  mut acc: A,
  combine: &mut F,
  report: &mut RunReport,
) -> Result<Reduction<A, Err>, Err>
where
  I: Gated,
  F: FnMut(&A, &I, usize, &[I]) -> Result<StepFlow<A, Err>, Err>,
{
  for (index, item) in items.iter().enumerate().skip(start) {
    let label = item.label(index);
    let step_span = span!(
      Level::DEBUG,
      "pipeline_step_execution",
      step_name = %label.name(),
      step_index = index
    );
    let _step_span_guard = step_span.enter();
    event!(Level::DEBUG, "Processing step.");

    let val = match combine(&acc, item, index, items) {
      Ok(val) => val,
      Err(e) => {
        event!(Level::ERROR, "Step failed.");
        return Err(e);
      }
    };
    let settled = match val.into_settled() {
      Ok(settled) => settled,
      Err(pending) => {
        event!(Level::TRACE, "Step result pending, suspending fold.");
        return Ok(Reduction::Suspended(Suspension { index, acc, pending }));
      }
    };

    match advance(item, index, acc, settled, report) {
      Advance::Next(next) => acc = next,
      Advance::Stop(cancellation) => return Ok(Reduction::Settled(Folded::Cancelled(cancellation))),
    }
  }
  Ok(Reduction::Settled(Folded::Complete(acc)))
}

/// Folds `items` starting from `init`.
///
/// `combine` receives the current accumulator, the item, its index and the
/// whole slice, and returns the item's raw flow. Errors from `combine`
/// propagate unchanged and never become a cancellation.
pub fn reduce<I, A, Err, F>(items: &[I], mut combine: F, init: A, report: &mut RunReport) -> Result<Reduction<A, Err>, Err>
where
  I: Gated,
  F: FnMut(&A, &I, usize, &[I]) -> Result<StepFlow<A, Err>, Err>,
{
  reduce_from(items, 0, init, &mut combine, report)
}

/// Drives a suspended fold to completion.
///
/// `items` and `combine` must be the ones the suspension came from.
///
/// # Panics
///
/// Panics if `items` is shorter than the suspension's index.
pub async fn resume<I, A, Err, F>(
  items: &[I],
  suspension: Suspension<A, Err>,
  mut combine: F,
  report: &mut RunReport,
) -> Result<Folded<A>, Err>
where
  I: Gated,
  F: FnMut(&A, &I, usize, &[I]) -> Result<StepFlow<A, Err>, Err>,
{
  let mut suspension = suspension;
  loop {
    let Suspension { index, acc, pending } = suspension;
    let settled = match settle(StepFlow::Pending(pending)).await {
      Ok(settled) => settled,
      Err(e) => {
        event!(Level::ERROR, step_index = index, "Pending step failed.");
        return Err(e);
      }
    };
    event!(Level::TRACE, step_index = index, "Pending step settled.");

    let next = match advance(&items[index], index, acc, settled, report) {
      Advance::Next(next) => next,
      Advance::Stop(cancellation) => return Ok(Folded::Cancelled(cancellation)),
    };

    match reduce_from(items, index + 1, next, &mut combine, report)? {
      Reduction::Settled(folded) => return Ok(folded),
      Reduction::Suspended(next_suspension) => suspension = next_suspension,
    }
  }
}
