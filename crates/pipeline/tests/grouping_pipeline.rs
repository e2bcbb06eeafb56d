//! Integration tests for the event grouping pipeline.

mod common;

use common::{seed_capture, seed_deployment, seed_project, ts};
use sqlx::PgPool;

use ambi_db::repositories::{CaptureRepo, EventRepo, OccurrenceRepo};
use ambi_pipeline::grouping::regroup_deployment_captures;

// ---------------------------------------------------------------------------
// Test: captures separated by a large gap form two events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_gap_splits_into_two_events(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    seed_capture(&pool, deployment.id, "b.jpg", Some(ts(14, 22, 30))).await;
    // Next night, far beyond the two-hour gap.
    seed_capture(&pool, deployment.id, "c.jpg", Some(ts(15, 22, 0))).await;

    let outcome = regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    assert_eq!(outcome.events, 2);
    assert_eq!(outcome.captures_assigned, 3);

    let events = EventRepo::list_by_deployment(&pool, deployment.id)
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].group_by, "2023-06-14");
    assert_eq!(events[0].start_at, ts(14, 22, 0));
    assert_eq!(events[0].end_at, Some(ts(14, 22, 30)));
    assert_eq!(events[1].group_by, "2023-06-15");
}

// ---------------------------------------------------------------------------
// Test: rerunning the pass reuses event rows (idempotence)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_regrouping_is_idempotent(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    seed_capture(&pool, deployment.id, "b.jpg", Some(ts(15, 22, 0))).await;

    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    let first_pass = EventRepo::list_by_deployment(&pool, deployment.id)
        .await
        .unwrap();

    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    let second_pass = EventRepo::list_by_deployment(&pool, deployment.id)
        .await
        .unwrap();

    let first_ids: Vec<_> = first_pass.iter().map(|e| e.id).collect();
    let second_ids: Vec<_> = second_pass.iter().map(|e| e.id).collect();
    assert_eq!(first_ids, second_ids, "event rows should be reused");
}

// ---------------------------------------------------------------------------
// Test: new captures extend an existing event's boundaries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_new_captures_extend_boundaries(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();

    seed_capture(&pool, deployment.id, "b.jpg", Some(ts(14, 23, 30))).await;
    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();

    let events = EventRepo::list_by_deployment(&pool, deployment.id)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_at, ts(14, 22, 0));
    assert_eq!(events[0].end_at, Some(ts(14, 23, 30)));
}

// ---------------------------------------------------------------------------
// Test: captures sharing a timestamp land in the same event
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_timestamps_share_an_event(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    let first = seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    let second = seed_capture(&pool, deployment.id, "b.jpg", Some(ts(14, 22, 0))).await;

    let outcome = regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    assert_eq!(outcome.events, 1);
    assert_eq!(outcome.captures_assigned, 2);

    let first = CaptureRepo::find_by_id(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    let second = CaptureRepo::find_by_id(&pool, second.id)
        .await
        .unwrap()
        .unwrap();
    assert!(first.event_id.is_some());
    assert_eq!(first.event_id, second.event_id);
}

// ---------------------------------------------------------------------------
// Test: captures without timestamps stay ungrouped
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_null_timestamps_stay_ungrouped(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    let untimed = seed_capture(&pool, deployment.id, "untitled.jpg", None).await;

    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();

    let refreshed = CaptureRepo::find_by_id(&pool, untimed.id)
        .await
        .unwrap()
        .unwrap();
    assert!(refreshed.event_id.is_none());
}

// ---------------------------------------------------------------------------
// Test: empty events are pruned unless they hold occurrences
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_empty_events_are_pruned(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    let capture = seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();

    // Remove the only capture; the event is now empty.
    CaptureRepo::delete(&pool, capture.id).await.unwrap();
    let outcome = regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    assert_eq!(outcome.events_deleted, 1);
    assert!(EventRepo::list_by_deployment(&pool, deployment.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_event_with_occurrences_survives_pruning(pool: PgPool) {
    let project = seed_project(&pool, "Vermont Atlas").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    let capture = seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    let event = EventRepo::list_by_deployment(&pool, deployment.id)
        .await
        .unwrap()
        .remove(0);

    // An occurrence pins the event even after its captures disappear.
    sqlx::query("INSERT INTO occurrences (event_id, deployment_id, project_id) VALUES ($1, $2, $3)")
        .bind(event.id)
        .bind(deployment.id)
        .bind(project.id)
        .execute(&pool)
        .await
        .unwrap();
    CaptureRepo::delete(&pool, capture.id).await.unwrap();

    let outcome = regroup_deployment_captures(&pool, deployment.id, None)
        .await
        .unwrap();
    assert_eq!(outcome.events_deleted, 0);
    assert!(EventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        OccurrenceRepo::list_by_event(&pool, event.id)
            .await
            .unwrap()
            .len(),
        1
    );
}
