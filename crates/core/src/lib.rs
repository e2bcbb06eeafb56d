//! Pure domain logic for the AMBI platform.
//!
//! This crate has zero internal dependencies and no database access so it can
//! be used by the repository layer, the pipeline, and any worker or CLI
//! tooling.

pub mod error;
pub mod filenames;
pub mod grouping;
pub mod sampling;
pub mod taxonomy;
pub mod types;
