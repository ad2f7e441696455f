//! Onboarding milestone fields and derived status computation.
//!
//! The three milestones plus the dismissal flag form a closed set.
//! Callers address fields through [`StatusField`], never by raw
//! strings, so unknown names are rejected before any storage access.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{TenantId, Timestamp};

// ---------------------------------------------------------------------------
// StatusField
// ---------------------------------------------------------------------------

/// The four mutable fields of an onboarding status row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    DomainConnected,
    CourseCreated,
    PaymentIntegrated,
    Dismissed,
}

/// All valid field names, in their wire (camelCase) form.
pub const VALID_STATUS_FIELDS: &[&str] = &[
    "domainConnected",
    "courseCreated",
    "paymentIntegrated",
    "dismissed",
];

impl StatusField {
    /// The wire (camelCase) name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusField::DomainConnected => "domainConnected",
            StatusField::CourseCreated => "courseCreated",
            StatusField::PaymentIntegrated => "paymentIntegrated",
            StatusField::Dismissed => "dismissed",
        }
    }

    /// The database column backing the field.
    pub fn column(self) -> &'static str {
        match self {
            StatusField::DomainConnected => "domain_connected",
            StatusField::CourseCreated => "course_created",
            StatusField::PaymentIntegrated => "payment_integrated",
            StatusField::Dismissed => "dismissed",
        }
    }

    /// Parse a wire field name, rejecting anything outside the known set.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            "domainConnected" => Ok(StatusField::DomainConnected),
            "courseCreated" => Ok(StatusField::CourseCreated),
            "paymentIntegrated" => Ok(StatusField::PaymentIntegrated),
            "dismissed" => Ok(StatusField::Dismissed),
            other => Err(CoreError::Validation(format!(
                "Invalid status field '{other}'. Must be one of: {VALID_STATUS_FIELDS:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusPatch
// ---------------------------------------------------------------------------

/// Sparse update to an onboarding status row.
///
/// Absent fields are left untouched by the store; this is a patch,
/// not a replace. Unknown fields are rejected at deserialization.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusPatch {
    pub domain_connected: Option<bool>,
    pub course_created: Option<bool>,
    pub payment_integrated: Option<bool>,
    pub dismissed: Option<bool>,
}

impl StatusPatch {
    /// `true` when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.domain_connected.is_none()
            && self.course_created.is_none()
            && self.payment_integrated.is_none()
            && self.dismissed.is_none()
    }

    /// A patch setting exactly one field.
    pub fn single(field: StatusField, value: bool) -> Self {
        let mut patch = Self::default();
        match field {
            StatusField::DomainConnected => patch.domain_connected = Some(value),
            StatusField::CourseCreated => patch.course_created = Some(value),
            StatusField::PaymentIntegrated => patch.payment_integrated = Some(value),
            StatusField::Dismissed => patch.dismissed = Some(value),
        }
        patch
    }
}

// ---------------------------------------------------------------------------
// StatusView
// ---------------------------------------------------------------------------

/// Derived onboarding status as exposed to callers and subscribers.
///
/// `all_tasks_completed` and `should_show_widget` are computed on every
/// read and never stored. The widget stays visible through completion
/// and disappears only on explicit dismissal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub tenant_id: TenantId,
    pub domain_connected: bool,
    pub course_created: bool,
    pub payment_integrated: bool,
    pub dismissed: bool,
    pub all_tasks_completed: bool,
    pub should_show_widget: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StatusView {
    /// Build a view from stored fields, computing the derived ones.
    #[allow(clippy::too_many_arguments)]
    pub fn derive(
        tenant_id: TenantId,
        domain_connected: bool,
        course_created: bool,
        payment_integrated: bool,
        dismissed: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            tenant_id,
            domain_connected,
            course_created,
            payment_integrated,
            all_tasks_completed: domain_connected && course_created && payment_integrated,
            should_show_widget: !dismissed,
            dismissed,
            created_at,
            updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
