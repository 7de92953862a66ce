// stepwise/src/pipeline/mod.rs

//! Defines the `Pipeline<TData, V, Err>` struct: construction and binding in
//! `definition`, running in `execution`.

pub mod definition;
pub mod execution;

pub use definition::Pipeline;

use crate::core::context::StepMethods;
use crate::core::context_data::ContextData;
use crate::core::lifecycle::Lifecycle;
use crate::core::step::Step;
use crate::error::StepwiseResult;

/// Creates a pipeline for `context` and `steps`. Same as [`Pipeline::new`].
pub fn pipeline<TData, V, Err>(
  context: impl Into<Option<ContextData<TData>>>,
  steps: Vec<Step<TData, V, Err>>,
) -> StepwiseResult<Pipeline<TData, V, Err>>
where
  TData: StepMethods<V, Err> + Lifecycle,
  V: Clone + Send + 'static,
  Err: Send + 'static,
{
  Pipeline::new(context, steps)
}
