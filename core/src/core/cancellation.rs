// stepwise/src/core/cancellation.rs

//! The cancellation token steps return, and the `Cancellation` value a run ends
//! with when it is cut short.

use crate::core::flow::StepFlow;
use std::fmt;
use std::sync::Arc;

/// Why a run was cancelled.
#[derive(Clone, Default)]
pub enum Reason {
  #[default]
  Unspecified,
  Literal(String),
  /// Evaluated each time the reason is read.
  Deferred(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Reason {
  pub fn evaluate(&self) -> Option<String> {
    match self {
      Reason::Unspecified => None,
      Reason::Literal(text) => Some(text.clone()),
      Reason::Deferred(thunk) => Some(thunk()),
    }
  }
}

impl fmt::Debug for Reason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Reason::Unspecified => f.write_str("Unspecified"),
      Reason::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
      Reason::Deferred(_) => f.write_str("Deferred(..)"),
    }
  }
}

impl From<&str> for Reason {
  fn from(text: &str) -> Self {
    Reason::Literal(text.to_string())
  }
}

impl From<String> for Reason {
  fn from(text: String) -> Self {
    Reason::Literal(text)
  }
}

/// Token a step returns (inside [`StepFlow::Cancel`]) to stop the run.
#[derive(Debug, Clone, Default)]
pub struct Cancel {
  reason: Reason,
}

impl Cancel {
  pub fn new(reason: impl Into<Reason>) -> Self {
    Self { reason: reason.into() }
  }

  pub fn reason(&self) -> &Reason {
    &self.reason
  }

  pub(crate) fn into_reason(self) -> Reason {
    self.reason
  }
}

/// Requests cancellation without a reason.
pub fn cancel<V, Err>() -> StepFlow<V, Err> {
  StepFlow::Cancel(Cancel::default())
}

/// Requests cancellation with a literal reason.
pub fn cancel_with<V, Err>(reason: impl Into<String>) -> StepFlow<V, Err> {
  StepFlow::Cancel(Cancel::new(Reason::Literal(reason.into())))
}

/// Requests cancellation with a reason computed when it is read.
pub fn cancel_lazy<V, Err>(reason: impl Fn() -> String + Send + Sync + 'static) -> StepFlow<V, Err> {
  StepFlow::Cancel(Cancel::new(Reason::Deferred(Arc::new(reason))))
}

/// Identifies a step by its position and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepLabel {
  index: usize,
  name: String,
}

impl StepLabel {
  pub fn new(index: usize, name: impl Into<String>) -> Self {
    Self {
      index,
      name: name.into(),
    }
  }

  /// Label for a step that carries no name of its own.
  pub fn anonymous(index: usize) -> Self {
    Self::new(index, format!("anonymous#{index}"))
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl fmt::Display for StepLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} (#{})", self.name, self.index)
  }
}

/// Terminal value of a run that was stopped early.
///
/// Only the reduce engine builds these, and always with the label of the step
/// that triggered the stop.
#[derive(Clone)]
pub struct Cancellation<V> {
  result: V,
  step: StepLabel,
  reason: Reason,
}

impl<V> Cancellation<V> {
  pub(crate) fn new(result: V, step: StepLabel, reason: Reason) -> Self {
    Self { result, step, reason }
  }

  /// Accumulator as of the last step that completed before the stop.
  pub fn result(&self) -> &V {
    &self.result
  }

  pub fn into_result(self) -> V {
    self.result
  }

  pub fn step(&self) -> &StepLabel {
    &self.step
  }

  /// Name of the step that triggered the stop.
  pub fn step_name(&self) -> &str {
    self.step.name()
  }

  /// Reads the reason, evaluating a deferred one.
  pub fn reason(&self) -> Option<String> {
    self.reason.evaluate()
  }
}

impl<V: fmt::Debug> fmt::Debug for Cancellation<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cancellation")
      .field("result", &self.result)
      .field("step", &self.step)
      .field("reason", &self.reason)
      .finish()
  }
}
