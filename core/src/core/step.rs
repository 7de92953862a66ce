// stepwise/src/core/step.rs

//! Step descriptors and their bound, runnable form.

use crate::compose::pipe::Stage;
use crate::compose::reduce::Gated;
use crate::core::cancellation::StepLabel;
use crate::core::context::{step_fn, StepFn, StepMethods};
use crate::core::context_data::ContextData;
use crate::core::flow::StepResult;
use crate::core::lifecycle::{Liveness, LivenessProbe};
use crate::error::{StepwiseError, StepwiseResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, Level};

/// What a step runs: a callable given directly, or the name of a callable the
/// context resolves when the step is bound.
pub enum StepKind<TData: Send + Sync + 'static, V, Err> {
  Direct(StepFn<TData, V, Err>),
  Named(String),
}

impl<TData: Send + Sync + 'static, V, Err> Clone for StepKind<TData, V, Err> {
  fn clone(&self) -> Self {
    match self {
      StepKind::Direct(f) => StepKind::Direct(Arc::clone(f)),
      StepKind::Named(name) => StepKind::Named(name.clone()),
    }
  }
}

impl<TData: Send + Sync + 'static, V, Err> From<&str> for StepKind<TData, V, Err> {
  fn from(name: &str) -> Self {
    StepKind::Named(name.to_string())
  }
}

impl<TData: Send + Sync + 'static, V, Err> From<String> for StepKind<TData, V, Err> {
  fn from(name: String) -> Self {
    StepKind::Named(name)
  }
}

impl<TData: Send + Sync + 'static, V, Err> From<StepFn<TData, V, Err>> for StepKind<TData, V, Err> {
  fn from(f: StepFn<TData, V, Err>) -> Self {
    StepKind::Direct(f)
  }
}

/// Authoring-time description of a step. Unbound: it has no context and cannot
/// be performed. [`Step::bind_to`] consumes it and returns a [`BoundStep`].
pub struct Step<TData: Send + Sync + 'static, V, Err> {
  kind: StepKind<TData, V, Err>,
  label: Option<String>,
  options: BTreeMap<String, String>,
}

impl<TData, V, Err> Step<TData, V, Err>
where
  TData: Send + Sync + 'static,
{
  /// A step running the given closure.
  pub fn func(f: impl Fn(ContextData<TData>, V) -> StepResult<V, Err> + Send + Sync + 'static) -> Self {
    Self {
      kind: StepKind::Direct(step_fn(f)),
      label: None,
      options: BTreeMap::new(),
    }
  }

  /// A step resolved by name on the context at bind time.
  pub fn named(name: impl Into<String>) -> StepwiseResult<Self> {
    Self::from_kind(StepKind::Named(name.into()))
  }

  pub fn from_kind(kind: StepKind<TData, V, Err>) -> StepwiseResult<Self> {
    if let StepKind::Named(name) = &kind {
      if name.trim().is_empty() {
        return Err(StepwiseError::InvalidStepKind {
          descriptor: format!("{name:?}"),
        });
      }
    }
    Ok(Self {
      kind,
      label: None,
      options: BTreeMap::new(),
    })
  }

  /// Display name for a direct step. Named steps always report their name.
  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.options.insert(key.into(), value.into());
    self
  }

  pub fn kind(&self) -> &StepKind<TData, V, Err> {
    &self.kind
  }

  pub fn name(&self) -> Option<&str> {
    match &self.kind {
      StepKind::Named(name) => Some(name),
      StepKind::Direct(_) => self.label.as_deref(),
    }
  }

  pub fn options(&self) -> &BTreeMap<String, String> {
    &self.options
  }

  /// Resolves the callable and fixes its receiver to `context`.
  ///
  /// Fails with [`StepwiseError::UnresolvedStep`] when a named step has no
  /// matching callable on the context.
  pub fn bind_to(
    self,
    context: &ContextData<TData>,
    probe: Arc<dyn LivenessProbe<TData>>,
    index: usize,
  ) -> StepwiseResult<BoundStep<TData, V, Err>>
  where
    TData: StepMethods<V, Err>,
  {
    let (callable, label) = match self.kind {
      StepKind::Direct(f) => {
        let label = match self.label {
          Some(label) => StepLabel::new(index, label),
          None => StepLabel::anonymous(index),
        };
        (f, label)
      }
      StepKind::Named(name) => {
        // Lookup happens under a read lock that is released before binding.
        let resolved = context.read().resolve_step(&name);
        match resolved {
          Some(f) => (f, StepLabel::new(index, name)),
          None => {
            event!(Level::ERROR, step_name = %name, "Named step does not resolve on context.");
            return Err(StepwiseError::UnresolvedStep {
              step_name: name,
              context: probe.describe(context),
            });
          }
        }
      }
    };

    event!(Level::DEBUG, step = %label, "Step bound to context.");
    Ok(BoundStep {
      label,
      callable,
      context: context.clone(),
      probe,
      options: self.options,
    })
  }
}

/// Builds a step descriptor from a name or a [`StepFn`].
pub fn step<TData, V, Err>(kind: impl Into<StepKind<TData, V, Err>>) -> StepwiseResult<Step<TData, V, Err>>
where
  TData: Send + Sync + 'static,
{
  Step::from_kind(kind.into())
}

impl<TData: Send + Sync + 'static, V, Err> std::fmt::Debug for Step<TData, V, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let kind = match &self.kind {
      StepKind::Direct(_) => "direct".to_string(),
      StepKind::Named(name) => format!("named({name})"),
    };
    f.debug_struct("Step")
      .field("kind", &kind)
      .field("label", &self.label)
      .field("options", &self.options)
      .finish()
  }
}

/// A step whose callable is resolved and fixed to a context.
pub struct BoundStep<TData: Send + Sync + 'static, V, Err> {
  label: StepLabel,
  callable: StepFn<TData, V, Err>,
  context: ContextData<TData>,
  probe: Arc<dyn LivenessProbe<TData>>,
  options: BTreeMap<String, String>,
}

impl<TData: Send + Sync + 'static, V, Err> BoundStep<TData, V, Err> {
  /// Invokes the bound callable with `input`, returning its raw flow.
  pub fn perform(&self, input: V) -> StepResult<V, Err> {
    (self.callable)(self.context.clone(), input)
  }

  pub fn label(&self) -> &StepLabel {
    &self.label
  }

  pub fn name(&self) -> &str {
    self.label.name()
  }

  pub fn index(&self) -> usize {
    self.label.index()
  }

  pub fn context(&self) -> &ContextData<TData> {
    &self.context
  }

  pub fn options(&self) -> &BTreeMap<String, String> {
    &self.options
  }
}

impl<TData: Send + Sync + 'static, V, Err> Gated for BoundStep<TData, V, Err> {
  fn liveness(&self) -> Liveness {
    self.probe.liveness(&self.context)
  }

  fn label(&self, _index: usize) -> StepLabel {
    self.label.clone()
  }
}

impl<TData, V, Err> Stage<V, Err> for BoundStep<TData, V, Err>
where
  TData: Send + Sync + 'static,
  V: Send,
  Err: Send,
{
  fn perform(&self, input: V) -> StepResult<V, Err> {
    BoundStep::perform(self, input)
  }
}

impl<TData: Send + Sync + 'static, V, Err> std::fmt::Debug for BoundStep<TData, V, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoundStep")
      .field("label", &self.label)
      .field("options", &self.options)
      .finish()
  }
}
