//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept `&PgPool` as the first argument. Methods that participate in the
//! determination state machine accept `impl PgExecutor` instead so the
//! pipeline can run them inside a transaction.

pub mod capture_repo;
pub mod classification_repo;
pub mod collection_repo;
pub mod deployment_repo;
pub mod detection_repo;
pub mod event_repo;
pub mod identification_repo;
pub mod occurrence_repo;
pub mod project_repo;
pub mod storage_repo;
pub mod task_repo;
pub mod taxon_repo;
pub mod user_repo;

pub use capture_repo::CaptureRepo;
pub use classification_repo::{AlgorithmRepo, ClassificationRepo};
pub use collection_repo::CollectionRepo;
pub use deployment_repo::DeploymentRepo;
pub use detection_repo::DetectionRepo;
pub use event_repo::EventRepo;
pub use identification_repo::IdentificationRepo;
pub use occurrence_repo::{BestPrediction, OccurrenceRepo};
pub use project_repo::ProjectRepo;
pub use storage_repo::StorageRepo;
pub use task_repo::TaskRepo;
pub use taxon_repo::{TaxonRepo, TaxonTreeError};
pub use user_repo::UserRepo;
