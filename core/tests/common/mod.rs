// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use stepwise::{
  cancel, cancel_fn, cancel_with, step_fn, CancelFn, Cancellation, ContextData, Lifecycle, StepFlow, StepFn,
  StepMethods, StepResult, StepwiseError,
};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Stepwise framework error: {0}")]
  Stepwise(String), // Stored as String for Eq comparison

  #[error("Test step failed: {0}")]
  Step(String),
}

impl From<StepwiseError> for TestError {
  fn from(err: StepwiseError) -> Self {
    TestError::Stepwise(format!("{:?}", err))
  }
}

// --- Calculator: the three-step arithmetic pipeline ---
#[derive(Debug, Default)]
pub struct Calculator {
  pub result: Option<String>,
  pub calls: Vec<String>,
  pub destroyed: bool,
  pub destroying: bool,
}

impl Lifecycle for Calculator {
  fn is_destroyed(&self) -> bool {
    self.destroyed
  }

  fn is_destroying(&self) -> bool {
    self.destroying
  }

  fn describe(&self) -> String {
    "<calculator>".to_string()
  }
}

impl Calculator {
  pub fn step1(ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    ctx.write().calls.push("step1".to_string());
    Ok(StepFlow::value(v))
  }

  pub fn step2(ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    ctx.write().calls.push("step2".to_string());
    let value = v + v;
    if value > 10 {
      return Ok(cancel_with("Cannot be greater than 5"));
    }
    Ok(StepFlow::value(value))
  }

  pub fn step3(ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    let mut guard = ctx.write();
    guard.calls.push("step3".to_string());
    guard.result = Some((v * v).to_string());
    Ok(StepFlow::value(v * v))
  }

  pub fn explode(ctx: ContextData<Self>, _v: i64) -> StepResult<i64, TestError> {
    ctx.write().calls.push("explode".to_string());
    Err(TestError::Step("explode always fails".to_string()))
  }

  pub fn handle_cancel(ctx: ContextData<Self>, cancellation: Cancellation<i64>) -> Result<i64, TestError> {
    CANCEL_HANDLER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let message = format!(
      "cancelled on {} - last value: {}. Reason: {}",
      cancellation.step_name(),
      cancellation.result(),
      cancellation.reason().unwrap_or_default()
    );
    ctx.write().result = Some(message);
    Ok(-1)
  }
}

impl StepMethods<i64, TestError> for Calculator {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, i64, TestError>> {
    match name {
      "step1" => Some(step_fn(Self::step1)),
      "step2" => Some(step_fn(Self::step2)),
      "step3" => Some(step_fn(Self::step3)),
      "explode" => Some(step_fn(Self::explode)),
      _ => None,
    }
  }

  fn resolve_cancel_handler(&self, name: &str) -> Option<CancelFn<Self, i64, TestError>> {
    match name {
      "handleCancel" => Some(cancel_fn(Self::handle_cancel)),
      _ => None,
    }
  }
}

// --- Tracker: four steps, each cancelling on "its" input, step3 pending ---
#[derive(Debug, Default)]
pub struct Tracker;

impl Lifecycle for Tracker {}

impl Tracker {
  pub fn step1(_ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    Ok(if v == 1 { cancel() } else { StepFlow::value(v) })
  }

  pub fn step2(_ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    Ok(if v == 2 { cancel() } else { StepFlow::value(v) })
  }

  pub fn step3(_ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    if v == 3 {
      return Ok(cancel());
    }
    Ok(StepFlow::pending(async move {
      tokio::time::sleep(Duration::from_millis(1)).await;
      Ok(v)
    }))
  }

  pub fn step4(_ctx: ContextData<Self>, v: i64) -> StepResult<i64, TestError> {
    Ok(StepFlow::value(v))
  }
}

impl StepMethods<i64, TestError> for Tracker {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, i64, TestError>> {
    match name {
      "step1" => Some(step_fn(Self::step1)),
      "step2" => Some(step_fn(Self::step2)),
      "step3" => Some(step_fn(Self::step3)),
      "step4" => Some(step_fn(Self::step4)),
      _ => None,
    }
  }
}

// --- Greeter: string steps, one of them pending ---
#[derive(Debug, Default)]
pub struct Greeter {
  pub seen: Vec<String>,
}

impl Lifecycle for Greeter {}

impl Greeter {
  pub fn foo(_ctx: ContextData<Self>, v: String) -> StepResult<String, TestError> {
    Ok(StepFlow::pending(async move {
      tokio::time::sleep(Duration::from_millis(1)).await;
      Ok(format!("Foo{v}"))
    }))
  }

  pub fn baz(ctx: ContextData<Self>, v: String) -> StepResult<String, TestError> {
    ctx.write().seen.push(v.clone());
    Ok(StepFlow::value(format!("{v}Baz")))
  }

  pub fn qux(ctx: ContextData<Self>, v: String) -> StepResult<String, TestError> {
    ctx.write().seen.push(v.clone());
    Ok(StepFlow::value(format!("{v}Qux")))
  }
}

impl StepMethods<String, TestError> for Greeter {
  fn resolve_step(&self, name: &str) -> Option<StepFn<Self, String, TestError>> {
    match name {
      "foo" => Some(step_fn(Self::foo)),
      "baz" => Some(step_fn(Self::baz)),
      "qux" => Some(step_fn(Self::qux)),
      _ => None,
    }
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static CANCEL_HANDLER_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static REASON_EVAL_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  CANCEL_HANDLER_COUNTER.store(0, Ordering::SeqCst);
  REASON_EVAL_COUNTER.store(0, Ordering::SeqCst);
}
