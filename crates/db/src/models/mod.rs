//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod capture;
pub mod classification;
pub mod collection;
pub mod deployment;
pub mod detection;
pub mod event;
pub mod identification;
pub mod occurrence;
pub mod project;
pub mod storage;
pub mod task;
pub mod taxon;
pub mod user;
