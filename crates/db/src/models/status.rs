//! Onboarding status entity model.

use hatch_core::status::StatusView;
use hatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_statuses` table.
///
/// Only the stored fields; the derived visibility fields live on
/// [`StatusView`] and are recomputed on every read.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingStatus {
    pub tenant_id: String,
    pub domain_connected: bool,
    pub course_created: bool,
    pub payment_integrated: bool,
    pub dismissed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OnboardingStatus {
    /// Compute the derived view for callers and subscribers.
    pub fn into_view(self) -> StatusView {
        StatusView::derive(
            self.tenant_id,
            self.domain_connected,
            self.course_created,
            self.payment_integrated,
            self.dismissed,
            self.created_at,
            self.updated_at,
        )
    }
}
