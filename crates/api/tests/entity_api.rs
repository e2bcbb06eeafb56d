//! HTTP-level integration tests for the basic entity CRUD surfaces.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: project CRUD round trip
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn project_crud_round_trip(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/projects",
        json!({ "name": "Vermont Atlas", "description": "Moth survey" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Vermont Atlas");
    assert_eq!(created["description"], "Moth survey");

    let response = get(app.clone(), &format!("/api/v1/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json(
        app.clone(),
        &format!("/api/v1/projects/{id}"),
        json!({ "name": "Vermont Moth Atlas" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Vermont Moth Atlas");
    // Unmentioned fields are untouched.
    assert_eq!(updated["description"], "Moth survey");

    let response = get(app.clone(), "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = delete(app.clone(), &format!("/api/v1/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: 404 responses carry the structured error body
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn missing_entity_returns_structured_error(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/v1/projects/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json["error"].as_str().unwrap().contains("9999"));
}

// ---------------------------------------------------------------------------
// Test: duplicate unique key maps to 409 CONFLICT
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_user_email_returns_conflict(pool: PgPool) {
    let app = build_test_app(pool);

    let body = json!({ "name": "Aya", "email": "aya@example.org" });
    let response = post_json(app.clone(), "/api/v1/users", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app, "/api/v1/users", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Test: storage source update with a new public base URL enqueues a rewrite
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn storage_source_url_change_schedules_rewrite(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/api/v1/storage-sources",
        json!({ "name": "trapdata", "bucket": "traps", "public_base_url": "https://old.example.org" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let source = body_json(response).await;
    let id = source["id"].as_i64().unwrap();

    // A name-only update must not schedule anything.
    let response = put_json(
        app.clone(),
        &format!("/api/v1/storage-sources/{id}"),
        json!({ "name": "trapdata-main" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let queued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_queue")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(queued, 0);

    let response = put_json(
        app,
        &format!("/api/v1/storage-sources/{id}"),
        json!({ "public_base_url": "https://cdn.example.org" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (task_name, entity_id): (String, i64) =
        sqlx::query_as("SELECT task_name, entity_id FROM task_queue")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(task_name, "update_public_urls");
    assert_eq!(entity_id, id);
}
