//! Shared fixtures for pipeline integration tests.
//!
//! Builders go through the repository layer so tests exercise the same
//! write paths production uses.

#![allow(dead_code)]

use ambi_core::types::{DbId, Timestamp};
use chrono::{TimeZone, Utc};
use sqlx::PgPool;

use ambi_db::models::capture::{Capture, CreateCapture};
use ambi_db::models::classification::CreateClassification;
use ambi_db::models::deployment::{CreateDeployment, Deployment};
use ambi_db::models::detection::{CreateDetection, Detection};
use ambi_db::models::occurrence::{CreateOccurrence, Occurrence};
use ambi_db::models::project::{CreateProject, Project};
use ambi_db::models::taxon::{CreateTaxon, Taxon};
use ambi_db::models::user::{CreateUser, User};
use ambi_db::repositories::{
    CaptureRepo, ClassificationRepo, DeploymentRepo, DetectionRepo, OccurrenceRepo, ProjectRepo,
    TaxonRepo, UserRepo,
};

/// A UTC timestamp on a fixed test date.
pub fn ts(day: u32, hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2023, 6, day, hour, minute, 0).unwrap()
}

pub async fn seed_project(pool: &PgPool, name: &str) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_deployment(pool: &PgPool, project_id: DbId, name: &str) -> Deployment {
    DeploymentRepo::create(
        pool,
        &CreateDeployment {
            name: name.to_string(),
            description: None,
            project_id,
            data_source_id: None,
            data_source_subdir: None,
            data_source_regex: None,
            latitude: None,
            longitude: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_capture(
    pool: &PgPool,
    deployment_id: DbId,
    path: &str,
    timestamp: Option<Timestamp>,
) -> Capture {
    CaptureRepo::create(
        pool,
        &CreateCapture {
            deployment_id,
            path: path.to_string(),
            timestamp,
            size: Some(1024),
            checksum: None,
            checksum_algorithm: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_user(pool: &PgPool, name: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{name}@example.org"),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_taxon(pool: &PgPool, name: &str) -> Taxon {
    TaxonRepo::create(
        pool,
        &CreateTaxon {
            name: name.to_string(),
            rank: "SPECIES".to_string(),
            parent_id: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_occurrence(pool: &PgPool, project_id: DbId) -> Occurrence {
    OccurrenceRepo::create(
        pool,
        &CreateOccurrence {
            event_id: None,
            deployment_id: None,
            project_id: Some(project_id),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_detection(pool: &PgPool, capture_id: DbId, occurrence_id: DbId) -> Detection {
    DetectionRepo::create(
        pool,
        &CreateDetection {
            capture_id,
            occurrence_id: Some(occurrence_id),
            timestamp: None,
            bbox_x: 0.1,
            bbox_y: 0.1,
            bbox_width: 0.2,
            bbox_height: 0.2,
            crop_path: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_classification(
    pool: &PgPool,
    detection_id: DbId,
    taxon_id: DbId,
    algorithm_id: Option<DbId>,
    score: f64,
) {
    ClassificationRepo::create(
        pool,
        &CreateClassification {
            detection_id,
            taxon_id: Some(taxon_id),
            algorithm_id,
            score: Some(score),
            timestamp: None,
        },
    )
    .await
    .unwrap();
}
