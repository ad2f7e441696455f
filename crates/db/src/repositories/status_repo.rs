//! Repository for the `onboarding_statuses` table.
//!
//! The ensure-then-read pattern guarantees a row exists for every
//! tenant that has ever been queried. `toggle` negates a column in a
//! single UPDATE statement so two racing toggles net-cancel instead of
//! both observing the same prior value.

use hatch_core::status::{StatusField, StatusPatch};
use sqlx::PgPool;

use crate::models::status::OnboardingStatus;

/// Column list for `onboarding_statuses` queries.
const STATUS_COLUMNS: &str = "tenant_id, domain_connected, course_created, payment_integrated, \
     dismissed, created_at, updated_at";

/// Provides read/write operations for per-tenant onboarding status.
pub struct StatusRepo;

impl StatusRepo {
    /// Idempotently create the row for a tenant with all flags false.
    pub async fn ensure(pool: &PgPool, tenant_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO onboarding_statuses (tenant_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Read the stored row for a tenant.
    ///
    /// Fails with `RowNotFound` only if a concurrent delete raced a
    /// preceding `ensure`; callers treat that as retryable.
    pub async fn read(pool: &PgPool, tenant_id: &str) -> Result<OnboardingStatus, sqlx::Error> {
        let query = format!("SELECT {STATUS_COLUMNS} FROM onboarding_statuses WHERE tenant_id = $1");
        sqlx::query_as::<_, OnboardingStatus>(&query)
            .bind(tenant_id)
            .fetch_one(pool)
            .await
    }

    /// Ensure the row exists, then read it.
    pub async fn get(pool: &PgPool, tenant_id: &str) -> Result<OnboardingStatus, sqlx::Error> {
        Self::ensure(pool, tenant_id).await?;
        Self::read(pool, tenant_id).await
    }

    /// Apply a sparse patch: only fields present in `patch` are written.
    ///
    /// Ensures the row exists first, then returns the fresh row.
    pub async fn patch(
        pool: &PgPool,
        tenant_id: &str,
        patch: &StatusPatch,
    ) -> Result<OnboardingStatus, sqlx::Error> {
        Self::ensure(pool, tenant_id).await?;
        let query = format!(
            "UPDATE onboarding_statuses SET \
                domain_connected = COALESCE($2, domain_connected), \
                course_created = COALESCE($3, course_created), \
                payment_integrated = COALESCE($4, payment_integrated), \
                dismissed = COALESCE($5, dismissed), \
                updated_at = NOW() \
             WHERE tenant_id = $1 \
             RETURNING {STATUS_COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingStatus>(&query)
            .bind(tenant_id)
            .bind(patch.domain_connected)
            .bind(patch.course_created)
            .bind(patch.payment_integrated)
            .bind(patch.dismissed)
            .fetch_one(pool)
            .await
    }

    /// Atomically negate one field and return the fresh row.
    ///
    /// The negation happens inside a single UPDATE statement; there is
    /// no read-then-write window for a concurrent toggle to race into.
    pub async fn toggle(
        pool: &PgPool,
        tenant_id: &str,
        field: StatusField,
    ) -> Result<OnboardingStatus, sqlx::Error> {
        Self::ensure(pool, tenant_id).await?;
        // `field.column()` comes from a closed enum, never from input.
        let column = field.column();
        let query = format!(
            "UPDATE onboarding_statuses SET {column} = NOT {column}, updated_at = NOW() \
             WHERE tenant_id = $1 \
             RETURNING {STATUS_COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingStatus>(&query)
            .bind(tenant_id)
            .fetch_one(pool)
            .await
    }
}
