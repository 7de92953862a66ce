// stepwise/src/core/lifecycle.rs

//! Context liveness: the capability the reduce engine queries after every step
//! to decide whether the owning context is still usable.

use crate::core::context_data::ContextData;

/// Liveness of a step's context as observed right after the step ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
  Alive,
  /// The context is destroyed, being destroyed, or otherwise gone.
  Gone { context: String },
}

impl Liveness {
  pub fn is_alive(&self) -> bool {
    matches!(self, Liveness::Alive)
  }
}

/// Lifecycle flags of a context type, as kept by the host object system.
///
/// Every method has a default, so a context that is never torn down only
/// needs an empty `impl Lifecycle for MyCtx {}`.
pub trait Lifecycle {
  fn is_destroyed(&self) -> bool {
    false
  }

  fn is_destroying(&self) -> bool {
    false
  }

  /// How the context is named in a "destroyed" cancellation reason.
  fn describe(&self) -> String {
    let full = std::any::type_name::<Self>();
    let short = full.rsplit("::").next().unwrap_or(full);
    format!("<{short}>")
  }
}

/// Injected predicate answering "is this context still alive?".
pub trait LivenessProbe<TData: Send + Sync + 'static>: Send + Sync {
  fn is_alive(&self, ctx: &ContextData<TData>) -> bool;

  fn describe(&self, _ctx: &ContextData<TData>) -> String {
    format!("<{}>", std::any::type_name::<TData>())
  }

  fn liveness(&self, ctx: &ContextData<TData>) -> Liveness {
    if self.is_alive(ctx) {
      Liveness::Alive
    } else {
      Liveness::Gone {
        context: self.describe(ctx),
      }
    }
  }
}

/// Probe backed by the context's own [`Lifecycle`] flags. A context that is
/// destroying counts as gone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleProbe;

impl<TData> LivenessProbe<TData> for LifecycleProbe
where
  TData: Lifecycle + Send + Sync + 'static,
{
  fn is_alive(&self, ctx: &ContextData<TData>) -> bool {
    let guard = ctx.read();
    !(guard.is_destroyed() || guard.is_destroying())
  }

  fn describe(&self, ctx: &ContextData<TData>) -> String {
    ctx.read().describe()
  }
}

/// Probe for contexts with no lifecycle at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAlive;

impl<TData: Send + Sync + 'static> LivenessProbe<TData> for AlwaysAlive {
  fn is_alive(&self, _ctx: &ContextData<TData>) -> bool {
    true
  }
}

impl<TData, F> LivenessProbe<TData> for F
where
  TData: Send + Sync + 'static,
  F: Fn(&ContextData<TData>) -> bool + Send + Sync,
{
  fn is_alive(&self, ctx: &ContextData<TData>) -> bool {
    self(ctx)
  }
}
