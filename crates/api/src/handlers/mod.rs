//! Request handlers, one module per resource.

pub mod capture;
pub mod classification;
pub mod collection;
pub mod deployment;
pub mod detection;
pub mod event;
pub mod health;
pub mod identification;
pub mod occurrence;
pub mod project;
pub mod storage;
pub mod task;
pub mod taxon;
pub mod user;
