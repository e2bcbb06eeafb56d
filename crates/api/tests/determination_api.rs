//! HTTP-level integration tests for the occurrence determination surface:
//! occurrences, identifications, detections, and classifications.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json};
use serde_json::json;
use sqlx::PgPool;

async fn seed_user(app: &axum::Router, name: &str) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/users",
        json!({ "name": name, "email": format!("{name}@example.org") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn seed_taxon(app: &axum::Router, name: &str) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/taxa",
        json!({ "name": name, "rank": "SPECIES" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn seed_occurrence(app: &axum::Router) -> i64 {
    let response = post_json(app.clone(), "/api/v1/occurrences", json!({})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn determination_of(app: &axum::Router, occurrence_id: i64) -> serde_json::Value {
    let response = get(app.clone(), &format!("/api/v1/occurrences/{occurrence_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Test: submitting an identification sets the determination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn identification_sets_determination(pool: PgPool) {
    let app = build_test_app(pool);
    let user_id = seed_user(&app, "aya").await;
    let taxon_id = seed_taxon(&app, "Catocala relicta").await;
    let occurrence_id = seed_occurrence(&app).await;

    let response = post_json(
        app.clone(),
        "/api/v1/identifications",
        json!({ "occurrence_id": occurrence_id, "user_id": user_id, "taxon_id": taxon_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let identification = body_json(response).await;
    assert_eq!(identification["withdrawn"], false);

    let occurrence = determination_of(&app, occurrence_id).await;
    assert_eq!(occurrence["determination_id"].as_i64(), Some(taxon_id));
    // Human identifications carry no prediction score.
    assert!(occurrence["determination_score"].is_null());
}

// ---------------------------------------------------------------------------
// Test: a newer identification from the same user withdraws the older one
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn newer_identification_withdraws_previous(pool: PgPool) {
    let app = build_test_app(pool);
    let user_id = seed_user(&app, "aya").await;
    let first_taxon = seed_taxon(&app, "Catocala relicta").await;
    let second_taxon = seed_taxon(&app, "Catocala ilia").await;
    let occurrence_id = seed_occurrence(&app).await;

    for taxon_id in [first_taxon, second_taxon] {
        let response = post_json(
            app.clone(),
            "/api/v1/identifications",
            json!({ "occurrence_id": occurrence_id, "user_id": user_id, "taxon_id": taxon_id }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(
        app.clone(),
        &format!("/api/v1/occurrences/{occurrence_id}/identifications"),
    )
    .await;
    let identifications = body_json(response).await;
    let active: Vec<_> = identifications
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["withdrawn"] == false)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["taxon_id"].as_i64(), Some(second_taxon));

    let occurrence = determination_of(&app, occurrence_id).await;
    assert_eq!(occurrence["determination_id"].as_i64(), Some(second_taxon));
}

// ---------------------------------------------------------------------------
// Test: deleting the active identification restores the previous one
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_identification_restores_previous(pool: PgPool) {
    let app = build_test_app(pool);
    let user_id = seed_user(&app, "aya").await;
    let first_taxon = seed_taxon(&app, "Catocala relicta").await;
    let second_taxon = seed_taxon(&app, "Catocala ilia").await;
    let occurrence_id = seed_occurrence(&app).await;

    post_json(
        app.clone(),
        "/api/v1/identifications",
        json!({ "occurrence_id": occurrence_id, "user_id": user_id, "taxon_id": first_taxon }),
    )
    .await;
    let response = post_json(
        app.clone(),
        "/api/v1/identifications",
        json!({ "occurrence_id": occurrence_id, "user_id": user_id, "taxon_id": second_taxon }),
    )
    .await;
    let second_id = body_json(response).await["id"].as_i64().unwrap();

    let response = delete(app.clone(), &format!("/api/v1/identifications/{second_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let occurrence = determination_of(&app, occurrence_id).await;
    assert_eq!(occurrence["determination_id"].as_i64(), Some(first_taxon));
}

// ---------------------------------------------------------------------------
// Test: classifications drive the determination when no identification exists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn classification_sets_determination_without_identifications(pool: PgPool) {
    let app = build_test_app(pool);
    let weak_taxon = seed_taxon(&app, "Catocala relicta").await;
    let strong_taxon = seed_taxon(&app, "Catocala ilia").await;
    let occurrence_id = seed_occurrence(&app).await;

    // A capture to hang the detection off.
    let project = post_json(app.clone(), "/api/v1/projects", json!({ "name": "P" })).await;
    let project_id = body_json(project).await["id"].as_i64().unwrap();
    let deployment = post_json(
        app.clone(),
        "/api/v1/deployments",
        json!({ "name": "Trap 1", "project_id": project_id }),
    )
    .await;
    let deployment_id = body_json(deployment).await["id"].as_i64().unwrap();
    let capture = post_json(
        app.clone(),
        "/api/v1/captures",
        json!({ "deployment_id": deployment_id, "path": "snapshots/20230614220000.jpg" }),
    )
    .await;
    let capture_id = body_json(capture).await["id"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        "/api/v1/detections",
        json!({
            "capture_id": capture_id,
            "occurrence_id": occurrence_id,
            "bbox_x": 0.1, "bbox_y": 0.1, "bbox_width": 0.2, "bbox_height": 0.2,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let detection_id = body_json(response).await["id"].as_i64().unwrap();

    let algorithm = post_json(
        app.clone(),
        "/api/v1/algorithms",
        json!({ "name": "moth-classifier", "version": "2023.1" }),
    )
    .await;
    let algorithm_id = body_json(algorithm).await["id"].as_i64().unwrap();

    for (taxon_id, score) in [(weak_taxon, 0.41), (strong_taxon, 0.87)] {
        let response = post_json(
            app.clone(),
            "/api/v1/classifications",
            json!({
                "detection_id": detection_id,
                "taxon_id": taxon_id,
                "algorithm_id": algorithm_id,
                "score": score,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let occurrence = determination_of(&app, occurrence_id).await;
    assert_eq!(occurrence["determination_id"].as_i64(), Some(strong_taxon));
    assert_eq!(occurrence["determination_score"].as_f64(), Some(0.87));

    // The detection's classification list comes back best-first.
    let response = get(
        app.clone(),
        &format!("/api/v1/detections/{detection_id}/classifications"),
    )
    .await;
    let classifications = body_json(response).await;
    assert_eq!(
        classifications[0]["taxon_id"].as_i64(),
        Some(strong_taxon)
    );
}

// ---------------------------------------------------------------------------
// Test: registering the same algorithm twice returns the same row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn algorithm_registration_is_idempotent(pool: PgPool) {
    let app = build_test_app(pool);

    let body = json!({ "name": "moth-classifier", "version": "2023.1" });
    let first = body_json(post_json(app.clone(), "/api/v1/algorithms", body.clone()).await).await;
    let second = body_json(post_json(app.clone(), "/api/v1/algorithms", body).await).await;
    assert_eq!(first["id"], second["id"]);

    let response = get(app, "/api/v1/algorithms").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}
