// stepwise/src/compose/mod.rs

//! The execution engine: a short-circuiting fold and the pipe built on it.

pub mod pipe;
pub mod reduce;
pub mod report;

pub use pipe::{callable, pipe, Callable, Piped, Pipe, Run, Stage};
pub use reduce::{reduce, resume, Folded, Gated, Reduction, Suspension};
pub use report::RunReport;
