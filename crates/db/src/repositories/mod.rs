//! Repositories for all tables.

pub mod credential_repo;
pub mod ownership_repo;
pub mod status_repo;
pub mod webhook_event_repo;

pub use credential_repo::CredentialRepo;
pub use ownership_repo::OwnershipRepo;
pub use status_repo::StatusRepo;
pub use webhook_event_repo::WebhookEventRepo;
