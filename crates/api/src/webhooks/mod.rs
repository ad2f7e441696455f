//! Inbound CRM webhook processing.

pub mod router;

pub use router::WebhookRouter;
