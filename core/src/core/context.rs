// stepwise/src/core/context.rs

//! Callable types bound to a context, and the lookup a context exposes so
//! steps (and cancel handlers) can be referenced by name.

use crate::core::cancellation::Cancellation;
use crate::core::context_data::ContextData;
use crate::core::flow::StepResult;
use std::sync::Arc;

/// A step body. The first argument is the context the step is bound to (its
/// receiver), the second the value threaded in from the previous step.
///
/// Step bodies lock the context as they need it and must release every guard
/// before returning or awaiting.
pub type StepFn<TData, V, Err> = Arc<dyn Fn(ContextData<TData>, V) -> StepResult<V, Err> + Send + Sync>;

/// A cancel handler. Receives the cancellation a run ended with and returns
/// the value `perform` delivers in its place.
pub type CancelFn<TData, V, Err> =
  Arc<dyn Fn(ContextData<TData>, Cancellation<V>) -> Result<V, Err> + Send + Sync>;

/// Boxes a closure or method path as a [`StepFn`].
pub fn step_fn<TData, V, Err>(
  f: impl Fn(ContextData<TData>, V) -> StepResult<V, Err> + Send + Sync + 'static,
) -> StepFn<TData, V, Err>
where
  TData: Send + Sync + 'static,
{
  Arc::new(f)
}

/// Boxes a closure or method path as a [`CancelFn`].
pub fn cancel_fn<TData, V, Err>(
  f: impl Fn(ContextData<TData>, Cancellation<V>) -> Result<V, Err> + Send + Sync + 'static,
) -> CancelFn<TData, V, Err>
where
  TData: Send + Sync + 'static,
{
  Arc::new(f)
}

/// Name-based lookup of the callables a context type offers.
///
/// Named steps resolve through `resolve_step` once, when the pipeline is
/// built. A context that is only used with direct steps can rely on the
/// defaults:
///
/// ```ignore
/// impl StepMethods<i64, MyError> for MyCtx {}
/// ```
pub trait StepMethods<V, Err>: Send + Sync + Sized + 'static {
  fn resolve_step(&self, _name: &str) -> Option<StepFn<Self, V, Err>> {
    None
  }

  fn resolve_cancel_handler(&self, _name: &str) -> Option<CancelFn<Self, V, Err>> {
    None
  }
}
