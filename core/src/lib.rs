// src/lib.rs

//! Stepwise: a sequential step-execution engine for Rust.
//!
//! A pipeline binds an ordered list of steps to a shared context and threads
//! a value through them:
//!  - Steps are closures or names resolved on the context when the pipeline is built.
//!  - Each step receives the previous step's result; the first receives the run's input.
//!  - A step may answer with a pending value; every later step waits for it to settle.
//!  - A step may return a cancellation token, which stops the run and yields a
//!    `Cancellation` carrying the last good result, the step and a reason.
//!  - A context that is destroyed mid-run stops the run the same way.
//!  - An optional cancel handler turns a cancellation into a value.

pub mod compose;
pub mod core;
pub mod error;
pub mod pipeline;

// --- Re-exports for the Public API ---

// Step authoring
pub use crate::core::cancellation::{cancel, cancel_lazy, cancel_with, Cancel, Cancellation, Reason, StepLabel};
pub use crate::core::context::{cancel_fn, step_fn, CancelFn, StepFn, StepMethods};
pub use crate::core::context_data::ContextData;
pub use crate::core::flow::{BoxedFlow, Settled, StepFlow, StepResult};
pub use crate::core::step::{step, BoundStep, Step, StepKind};

// Context liveness
pub use crate::core::lifecycle::{AlwaysAlive, Lifecycle, LifecycleProbe, Liveness, LivenessProbe};

// Running pipelines
pub use crate::core::control::{Performance, PipelineOutcome};
pub use crate::pipeline::{pipeline, Pipeline};

// The engine, for use without a pipeline
pub use crate::compose::{callable, pipe, reduce, resume, Callable, Folded, Gated, Pipe, Piped, Reduction, Run, RunReport, Stage};

pub use crate::error::{StepwiseError, StepwiseResult};

/*
    Core Workflow:
    1. Define a context struct `MyCtx`; implement `Lifecycle` (often empty) and
       `StepMethods<V, MyError>` (resolving the step names it offers).
    2. Describe the steps: `Step::named("validate")?`, `Step::func(|ctx, v| ...)`.
    3. Build the pipeline: `Pipeline::new(ContextData::new(ctx), steps)?`,
       optionally `.on_cancel(...)`.
    4. Run it: `pipeline.perform(input)?` gives a `Performance`; match on
       `Ready`, or `.await` it when steps may be pending.
    5. Inspect `successful_steps()` / `cancelled_steps()` after the run settles.
*/
