// stepwise/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Framework-level errors.
///
/// The first four variants are raised synchronously at the point of misuse
/// (pipeline construction, step construction, handler registration) and never
/// from inside `perform`. A cancelled run is not an error; see
/// [`Cancellation`](crate::Cancellation).
#[derive(Debug, Error)]
pub enum StepwiseError {
  #[error("A pipeline needs a context object")]
  MissingContext,

  #[error("Step descriptor '{descriptor}' is neither a callable nor a step name")]
  InvalidStepKind { descriptor: String },

  #[error("Step '{step_name}' does not resolve to a callable on {context}")]
  UnresolvedStep { step_name: String, context: String },

  #[error("Cancel handler '{handler_name}' does not resolve to a callable on {context}")]
  InvalidHandler { handler_name: String, context: String },

  #[error("Error in user-provided step or handler. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

// Lets StepwiseError serve as a pipeline's step error type, the same way
// application code funnels arbitrary failures through `anyhow`.
impl From<AnyhowError> for StepwiseError {
  fn from(err: AnyhowError) -> Self {
    StepwiseError::HandlerError { source: err }
  }
}

pub type StepwiseResult<T, E = StepwiseError> = std::result::Result<T, E>;
