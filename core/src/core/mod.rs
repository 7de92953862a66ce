pub mod cancellation;
pub mod context;
pub mod context_data;
pub mod control;
pub mod flow;
pub mod lifecycle;
pub mod step;

// Re-export key types for easier access from other modules (and lib.rs)
pub use cancellation::{cancel, cancel_lazy, cancel_with, Cancel, Cancellation, Reason, StepLabel};
pub use context::{cancel_fn, step_fn, CancelFn, StepFn, StepMethods};
pub use context_data::ContextData;
pub use control::{Performance, PipelineOutcome};
pub use flow::{settle, BoxedFlow, Settled, StepFlow, StepResult};
pub use lifecycle::{AlwaysAlive, Lifecycle, LifecycleProbe, Liveness, LivenessProbe};
pub use step::{step, BoundStep, Step, StepKind};
