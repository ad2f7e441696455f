//! Integration tests for the repositories.

use chrono::{Duration, Utc};
use hatch_core::credentials::CredentialKind;
use hatch_core::status::{StatusField, StatusPatch};
use hatch_db::models::credential::UpsertCredential;
use hatch_db::repositories::{CredentialRepo, OwnershipRepo, StatusRepo, WebhookEventRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_is_idempotent(pool: PgPool) {
    StatusRepo::ensure(&pool, "loc_a").await.unwrap();
    StatusRepo::ensure(&pool, "loc_a").await.unwrap();

    let row = StatusRepo::read(&pool, "loc_a").await.unwrap();
    assert_eq!(row.tenant_id, "loc_a");
    assert!(!row.domain_connected);
    assert!(!row.course_created);
    assert!(!row.payment_integrated);
    assert!(!row.dismissed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn read_without_ensure_is_row_not_found(pool: PgPool) {
    let err = StatusRepo::read(&pool, "loc_missing").await.unwrap_err();
    assert!(matches!(err, sqlx::Error::RowNotFound));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_only_touches_provided_fields(pool: PgPool) {
    StatusRepo::patch(
        &pool,
        "loc_b",
        &StatusPatch {
            domain_connected: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let row = StatusRepo::patch(
        &pool,
        "loc_b",
        &StatusPatch {
            course_created: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(row.domain_connected, "earlier field must survive the patch");
    assert!(row.course_created);
    assert!(!row.payment_integrated);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn toggle_negates_the_current_stored_value(pool: PgPool) {
    let row = StatusRepo::toggle(&pool, "loc_c", StatusField::PaymentIntegrated)
        .await
        .unwrap();
    assert!(row.payment_integrated);

    let row = StatusRepo::toggle(&pool, "loc_c", StatusField::PaymentIntegrated)
        .await
        .unwrap();
    assert!(!row.payment_integrated);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_preserves_refresh_token_when_none_issued(pool: PgPool) {
    let initial = UpsertCredential {
        subject_id: "agency:a1",
        parent_account_id: Some("a1"),
        access_token: "at-1",
        refresh_token: Some("rt-1"),
        expires_at: Some(Utc::now() + Duration::hours(24)),
        scope: Some("locations.readonly"),
        kind: CredentialKind::Parent,
    };
    CredentialRepo::upsert(&pool, &initial).await.unwrap();

    // Refresh response without a rotated refresh token.
    let refreshed = UpsertCredential {
        subject_id: "agency:a1",
        parent_account_id: Some("a1"),
        access_token: "at-2",
        refresh_token: None,
        expires_at: Some(Utc::now() + Duration::hours(24)),
        scope: None,
        kind: CredentialKind::Parent,
    };
    let saved = CredentialRepo::upsert(&pool, &refreshed).await.unwrap();

    assert_eq!(saved.access_token, "at-2");
    assert_eq!(saved.refresh_token.as_deref(), Some("rt-1"));
    assert_eq!(saved.scope.as_deref(), Some("locations.readonly"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn at_most_one_credential_per_subject(pool: PgPool) {
    let cred = UpsertCredential {
        subject_id: "loc_x",
        parent_account_id: None,
        access_token: "at-1",
        refresh_token: Some("rt-1"),
        expires_at: None,
        scope: None,
        kind: CredentialKind::Tenant,
    };
    CredentialRepo::upsert(&pool, &cred).await.unwrap();
    CredentialRepo::upsert(&pool, &cred).await.unwrap();

    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM credentials WHERE subject_id = 'loc_x'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_by_subject_reports_whether_a_row_existed(pool: PgPool) {
    let cred = UpsertCredential {
        subject_id: "loc_del",
        parent_account_id: None,
        access_token: "at-1",
        refresh_token: None,
        expires_at: None,
        scope: None,
        kind: CredentialKind::Tenant,
    };
    CredentialRepo::upsert(&pool, &cred).await.unwrap();

    assert!(CredentialRepo::delete_by_subject(&pool, "loc_del").await.unwrap());
    assert!(!CredentialRepo::delete_by_subject(&pool, "loc_del").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_first_by_kind_ignores_other_kinds(pool: PgPool) {
    let tenant = UpsertCredential {
        subject_id: "loc_only",
        parent_account_id: None,
        access_token: "at-t",
        refresh_token: None,
        expires_at: None,
        scope: None,
        kind: CredentialKind::Tenant,
    };
    CredentialRepo::upsert(&pool, &tenant).await.unwrap();

    assert!(CredentialRepo::find_first_by_kind(&pool, CredentialKind::Parent)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ownership_upsert_preserves_first_seen(pool: PgPool) {
    let first = OwnershipRepo::upsert(&pool, "loc_o", "agency_1", None)
        .await
        .unwrap();
    let second = OwnershipRepo::upsert(&pool, "loc_o", "agency_2", Some("Renamed"))
        .await
        .unwrap();

    assert_eq!(second.parent_account_id, "agency_2");
    assert_eq!(second.display_name.as_deref(), Some("Renamed"));
    assert_eq!(second.first_seen_at, first.first_seen_at);
    assert!(second.last_seen_at >= first.last_seen_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_audit_accepts_unroutable_events(pool: PgPool) {
    let id = WebhookEventRepo::insert(
        &pool,
        None,
        None,
        &serde_json::json!({ "unexpected": "shape" }),
    )
    .await
    .unwrap();
    assert!(id > 0);

    let for_tenant = WebhookEventRepo::insert(
        &pool,
        Some("loc_w"),
        Some("DomainUpdate"),
        &serde_json::json!({ "type": "DomainUpdate" }),
    )
    .await
    .unwrap();
    assert!(for_tenant > id);

    let events = WebhookEventRepo::list_for_tenant(&pool, "loc_w", 10)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type.as_deref(), Some("DomainUpdate"));
}
