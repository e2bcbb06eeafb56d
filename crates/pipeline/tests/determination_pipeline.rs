//! Integration tests for the determination state machine.

mod common;

use common::{
    seed_capture, seed_classification, seed_deployment, seed_detection, seed_occurrence,
    seed_project, seed_taxon, seed_user, ts,
};
use sqlx::PgPool;

use ambi_db::models::identification::CreateIdentification;
use ambi_db::repositories::{AlgorithmRepo, IdentificationRepo, OccurrenceRepo};
use ambi_pipeline::determination::{
    create_identification, delete_identification, update_occurrence_determination,
};

fn identification(occurrence_id: i64, user_id: Option<i64>, taxon_id: i64) -> CreateIdentification {
    CreateIdentification {
        occurrence_id,
        user_id,
        taxon_id: Some(taxon_id),
        withdrawn: false,
    }
}

async fn determination_of(pool: &PgPool, occurrence_id: i64) -> Option<i64> {
    OccurrenceRepo::find_by_id(pool, occurrence_id)
        .await
        .unwrap()
        .unwrap()
        .determination_id
}

// ---------------------------------------------------------------------------
// Test: a human identification sets the determination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_identification_sets_determination(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let user = seed_user(&pool, "ada").await;
    let taxon = seed_taxon(&pool, "Catocala ilia").await;

    create_identification(&pool, &identification(occurrence.id, Some(user.id), taxon.id))
        .await
        .unwrap();

    assert_eq!(determination_of(&pool, occurrence.id).await, Some(taxon.id));
}

// ---------------------------------------------------------------------------
// Test: a newer identification by the same user withdraws the older one
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_new_identification_withdraws_previous(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let user = seed_user(&pool, "ada").await;
    let first_taxon = seed_taxon(&pool, "Catocala ilia").await;
    let second_taxon = seed_taxon(&pool, "Catocala relicta").await;

    let first =
        create_identification(&pool, &identification(occurrence.id, Some(user.id), first_taxon.id))
            .await
            .unwrap();
    create_identification(
        &pool,
        &identification(occurrence.id, Some(user.id), second_taxon.id),
    )
    .await
    .unwrap();

    let rows = IdentificationRepo::list_by_occurrence(&pool, occurrence.id)
        .await
        .unwrap();
    let first_row = rows.iter().find(|i| i.id == first.id).unwrap();
    assert!(first_row.withdrawn, "older identification should be withdrawn");
    assert_eq!(
        rows.iter().filter(|i| !i.withdrawn).count(),
        1,
        "exactly one active identification per user"
    );
    assert_eq!(
        determination_of(&pool, occurrence.id).await,
        Some(second_taxon.id)
    );
}

// ---------------------------------------------------------------------------
// Test: identifications from different users do not withdraw each other
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_other_users_identifications_stay_active(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let ada = seed_user(&pool, "ada").await;
    let grace = seed_user(&pool, "grace").await;
    let taxon_a = seed_taxon(&pool, "Catocala ilia").await;
    let taxon_b = seed_taxon(&pool, "Catocala relicta").await;

    create_identification(&pool, &identification(occurrence.id, Some(ada.id), taxon_a.id))
        .await
        .unwrap();
    create_identification(&pool, &identification(occurrence.id, Some(grace.id), taxon_b.id))
        .await
        .unwrap();

    let active = IdentificationRepo::list_by_occurrence(&pool, occurrence.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|i| !i.withdrawn)
        .count();
    assert_eq!(active, 2);
    // Latest identification wins across users.
    assert_eq!(determination_of(&pool, occurrence.id).await, Some(taxon_b.id));
}

// ---------------------------------------------------------------------------
// Test: with no identifications, the best prediction decides
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_best_prediction_decides_without_identifications(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    let capture = seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let detection = seed_detection(&pool, capture.id, occurrence.id).await;

    let algo = AlgorithmRepo::get_or_create(&pool, "moth-net", "1.0")
        .await
        .unwrap();
    let low = seed_taxon(&pool, "Noctua pronuba").await;
    let high = seed_taxon(&pool, "Catocala ilia").await;
    seed_classification(&pool, detection.id, low.id, Some(algo.id), 0.41).await;
    seed_classification(&pool, detection.id, high.id, Some(algo.id), 0.87).await;

    update_occurrence_determination(&pool, occurrence.id)
        .await
        .unwrap();
    assert_eq!(determination_of(&pool, occurrence.id).await, Some(high.id));
}

// ---------------------------------------------------------------------------
// Test: a human identification outranks a higher-scoring prediction
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_identification_outranks_prediction(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    let capture = seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let detection = seed_detection(&pool, capture.id, occurrence.id).await;
    let user = seed_user(&pool, "ada").await;

    let machine_taxon = seed_taxon(&pool, "Noctua pronuba").await;
    let human_taxon = seed_taxon(&pool, "Catocala ilia").await;
    seed_classification(&pool, detection.id, machine_taxon.id, None, 0.99).await;

    create_identification(
        &pool,
        &identification(occurrence.id, Some(user.id), human_taxon.id),
    )
    .await
    .unwrap();

    assert_eq!(
        determination_of(&pool, occurrence.id).await,
        Some(human_taxon.id)
    );
}

// ---------------------------------------------------------------------------
// Test: deleting the active identification restores the user's previous one
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_restores_previous_identification(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let user = seed_user(&pool, "ada").await;
    let first_taxon = seed_taxon(&pool, "Catocala ilia").await;
    let second_taxon = seed_taxon(&pool, "Catocala relicta").await;

    let first =
        create_identification(&pool, &identification(occurrence.id, Some(user.id), first_taxon.id))
            .await
            .unwrap();
    let second = create_identification(
        &pool,
        &identification(occurrence.id, Some(user.id), second_taxon.id),
    )
    .await
    .unwrap();

    delete_identification(&pool, second.id).await.unwrap();

    let rows = IdentificationRepo::list_by_occurrence(&pool, occurrence.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, first.id);
    assert!(!rows[0].withdrawn, "previous identification should be restored");
    assert_eq!(
        determination_of(&pool, occurrence.id).await,
        Some(first_taxon.id)
    );
}

// ---------------------------------------------------------------------------
// Test: deleting the only identification falls back to predictions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_falls_back_to_prediction(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let deployment = seed_deployment(&pool, project.id, "trap-1").await;
    let capture = seed_capture(&pool, deployment.id, "a.jpg", Some(ts(14, 22, 0))).await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let detection = seed_detection(&pool, capture.id, occurrence.id).await;
    let user = seed_user(&pool, "ada").await;

    let machine_taxon = seed_taxon(&pool, "Noctua pronuba").await;
    let human_taxon = seed_taxon(&pool, "Catocala ilia").await;
    seed_classification(&pool, detection.id, machine_taxon.id, None, 0.7).await;

    let ident = create_identification(
        &pool,
        &identification(occurrence.id, Some(user.id), human_taxon.id),
    )
    .await
    .unwrap();
    delete_identification(&pool, ident.id).await.unwrap();

    assert_eq!(
        determination_of(&pool, occurrence.id).await,
        Some(machine_taxon.id)
    );
}

// ---------------------------------------------------------------------------
// Test: re-resolving an unchanged determination does not rewrite the row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_redundant_resolve_leaves_row_untouched(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let user = seed_user(&pool, "ada").await;
    let taxon = seed_taxon(&pool, "Catocala ilia").await;

    create_identification(&pool, &identification(occurrence.id, Some(user.id), taxon.id))
        .await
        .unwrap();
    let before = OccurrenceRepo::find_by_id(&pool, occurrence.id)
        .await
        .unwrap()
        .unwrap();

    let resolved = update_occurrence_determination(&pool, occurrence.id)
        .await
        .unwrap();
    assert_eq!(resolved, Some(taxon.id));

    let after = OccurrenceRepo::find_by_id(&pool, occurrence.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.determination_id, Some(taxon.id));
    assert_eq!(
        after.updated_at, before.updated_at,
        "a resolve with the same outcome should not touch the occurrence"
    );
}

// ---------------------------------------------------------------------------
// Test: pre-withdrawn identifications never change the determination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_withdrawn_identification_is_inert(pool: PgPool) {
    let project = seed_project(&pool, "Moths").await;
    let occurrence = seed_occurrence(&pool, project.id).await;
    let user = seed_user(&pool, "ada").await;
    let taxon = seed_taxon(&pool, "Catocala ilia").await;

    create_identification(
        &pool,
        &CreateIdentification {
            occurrence_id: occurrence.id,
            user_id: Some(user.id),
            taxon_id: Some(taxon.id),
            withdrawn: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(determination_of(&pool, occurrence.id).await, None);
}
