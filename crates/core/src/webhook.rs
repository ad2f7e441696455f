//! CRM webhook event classification.
//!
//! Pure functions over the raw JSON payload: extract the event type
//! and tenant id, then run an ordered list of (predicate, action)
//! rules. Rules are evaluated independently — more than one may match
//! a single event — and a rule that matches the type but finds no
//! usable payload data simply contributes nothing.

use serde_json::Value;

use crate::types::TenantId;

// ---------------------------------------------------------------------------
// RouteAction
// ---------------------------------------------------------------------------

/// A state transition implied by a classified webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// A domain-change event. Presence of a non-empty domain sets the
    /// milestone; absence clears it (domain connection is not monotonic).
    SetDomainConnected(bool),

    /// A product event. The milestone is monotonic: the router only
    /// writes `true` when the flag is not already set, and never writes
    /// `false` (deletions are indistinguishable from creations here and
    /// a false negative is worse than a stale positive).
    MarkCourseCreated,

    /// A coarse "location record updated" event. Too unspecific to
    /// imply anything about the milestones; audited and nothing else.
    LocationTouched,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A fully classified inbound event.
#[derive(Debug, Clone)]
pub struct ClassifiedEvent {
    /// The extracted event-type label, if any.
    pub event_type: Option<String>,
    /// The tenant the event belongs to, if one could be derived.
    pub tenant_id: Option<TenantId>,
    /// Actions from every matching rule, in rule order.
    pub actions: Vec<RouteAction>,
}

/// One classification rule: a type predicate plus a payload action.
struct Rule {
    matches: fn(&str) -> bool,
    action: fn(&Value) -> Option<RouteAction>,
}

/// Ordered rule list. Evaluated independently, never short-circuited.
const RULES: &[Rule] = &[
    Rule {
        matches: is_domain_event,
        action: |payload| Some(RouteAction::SetDomainConnected(extract_domain(payload).is_some())),
    },
    Rule {
        matches: is_product_event,
        action: |_| Some(RouteAction::MarkCourseCreated),
    },
    Rule {
        matches: is_location_update_event,
        action: |_| Some(RouteAction::LocationTouched),
    },
];

fn is_domain_event(event_type: &str) -> bool {
    event_type.to_ascii_lowercase().contains("domain")
}

fn is_product_event(event_type: &str) -> bool {
    event_type.to_ascii_lowercase().contains("product")
}

fn is_location_update_event(event_type: &str) -> bool {
    let lower = event_type.to_ascii_lowercase();
    lower.contains("location") && (lower.contains("update") || lower.contains("create"))
}

/// Classify a raw webhook payload.
pub fn classify(payload: &Value) -> ClassifiedEvent {
    let event_type = extract_event_type(payload);
    let tenant_id = event_type
        .as_deref()
        .and_then(|t| extract_tenant_id(t, payload));

    let actions = match event_type.as_deref() {
        Some(event_type) => RULES
            .iter()
            .filter(|rule| (rule.matches)(event_type))
            .filter_map(|rule| (rule.action)(payload))
            .collect(),
        None => Vec::new(),
    };

    ClassifiedEvent {
        event_type,
        tenant_id,
        actions,
    }
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Extract the event-type label from the payload.
pub fn extract_event_type(payload: &Value) -> Option<String> {
    ["type", "event", "eventType"]
        .iter()
        .find_map(|key| non_empty_str(payload.get(*key)))
}

/// Extract the tenant id with event-type-specific precedence.
///
/// Location-update events carry the tenant id as their own identity
/// field; every other type is probed through a fixed priority list of
/// plausible payload locations.
pub fn extract_tenant_id(event_type: &str, payload: &Value) -> Option<TenantId> {
    if is_location_update_event(event_type) {
        return non_empty_str(payload.get("id"))
            .or_else(|| non_empty_str(payload.get("locationId")))
            .or_else(|| non_empty_str(payload.pointer("/location/id")));
    }

    non_empty_str(payload.get("locationId"))
        .or_else(|| non_empty_str(payload.pointer("/location/id")))
        .or_else(|| non_empty_str(payload.get("id")))
}

/// Extract a connected-domain value from one of the known locations.
///
/// Returns `None` for missing, non-string, or blank values — a blank
/// domain means the domain was disconnected.
pub fn extract_domain(payload: &Value) -> Option<String> {
    non_empty_str(payload.get("domain"))
        .or_else(|| non_empty_str(payload.pointer("/data/domain")))
        .or_else(|| non_empty_str(payload.pointer("/location/domain")))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_update_with_domain_sets_milestone() {
        let event = classify(&json!({
            "type": "DomainUpdate",
            "locationId": "loc_1",
            "data": { "domain": "example.com" }
        }));

        assert_eq!(event.event_type.as_deref(), Some("DomainUpdate"));
        assert_eq!(event.tenant_id.as_deref(), Some("loc_1"));
        assert_eq!(event.actions, vec![RouteAction::SetDomainConnected(true)]);
    }

    #[test]
    fn domain_update_without_domain_clears_milestone() {
        let event = classify(&json!({
            "type": "DomainUpdate",
            "locationId": "loc_1",
            "data": {}
        }));
        assert_eq!(event.actions, vec![RouteAction::SetDomainConnected(false)]);
    }

    #[test]
    fn blank_domain_counts_as_disconnected() {
        let event = classify(&json!({
            "type": "DomainUpdate",
            "locationId": "loc_1",
            "data": { "domain": "   " }
        }));
        assert_eq!(event.actions, vec![RouteAction::SetDomainConnected(false)]);
    }

    #[test]
    fn product_event_marks_course_created() {
        let event = classify(&json!({
            "type": "ProductCreate",
            "locationId": "loc_2"
        }));
        assert_eq!(event.actions, vec![RouteAction::MarkCourseCreated]);
    }

    #[test]
    fn location_update_uses_own_id_field() {
        let event = classify(&json!({
            "type": "LocationUpdate",
            "id": "loc_3",
            "locationId": "other"
        }));
        assert_eq!(event.tenant_id.as_deref(), Some("loc_3"));
        assert_eq!(event.actions, vec![RouteAction::LocationTouched]);
    }

    #[test]
    fn non_location_event_prefers_location_id_field() {
        let event = classify(&json!({
            "type": "DomainUpdate",
            "id": "evt_9",
            "locationId": "loc_4",
            "domain": "shop.example.com"
        }));
        assert_eq!(event.tenant_id.as_deref(), Some("loc_4"));
    }

    #[test]
    fn nested_location_object_is_probed() {
        let event = classify(&json!({
            "type": "ProductUpdate",
            "location": { "id": "loc_5" }
        }));
        assert_eq!(event.tenant_id.as_deref(), Some("loc_5"));
    }

    #[test]
    fn generic_id_is_last_resort() {
        let event = classify(&json!({
            "type": "ProductUpdate",
            "id": "loc_6"
        }));
        assert_eq!(event.tenant_id.as_deref(), Some("loc_6"));
    }

    #[test]
    fn event_without_type_is_unroutable() {
        let event = classify(&json!({ "locationId": "loc_7" }));
        assert!(event.event_type.is_none());
        assert!(event.actions.is_empty());
    }

    #[test]
    fn event_without_tenant_id_still_classifies() {
        let event = classify(&json!({ "type": "ProductCreate" }));
        assert!(event.tenant_id.is_none());
        assert_eq!(event.actions, vec![RouteAction::MarkCourseCreated]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let event = classify(&json!({
            "type": "location.domain.updated",
            "locationId": "loc_8",
            "domain": "a.example.com"
        }));
        // Both the domain rule and the location-update rule match.
        assert!(event
            .actions
            .contains(&RouteAction::SetDomainConnected(true)));
        assert!(event.actions.contains(&RouteAction::LocationTouched));
    }

    #[test]
    fn multiple_rules_run_in_order() {
        let event = classify(&json!({
            "type": "LocationUpdate.domain",
            "id": "loc_9",
            "domain": "x.example.com"
        }));
        assert_eq!(
            event.actions,
            vec![
                RouteAction::SetDomainConnected(true),
                RouteAction::LocationTouched
            ]
        );
    }
}
