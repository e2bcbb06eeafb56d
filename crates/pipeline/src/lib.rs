//! Orchestration layer: multi-step operations that combine the pure
//! algorithms in `ambi-core` with the repositories in `ambi-db`.
//!
//! Everything here is written to be safe under at-least-once execution,
//! since the worker may retry any of these after a crash.

pub mod collections;
pub mod determination;
pub mod error;
pub mod grouping;
pub mod maintenance;
pub mod sync;

pub use error::PipelineError;
