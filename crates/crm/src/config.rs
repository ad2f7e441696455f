//! CRM platform configuration loaded from environment variables.

/// Configuration for the CRM platform integration.
///
/// The OAuth client id/secret are optional: without them installed
/// credentials still work until they expire, but refresh is impossible
/// and the resolver degrades to "no token" for expired subjects.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Base URL of the platform REST API (default:
    /// `https://services.leadconnectorhq.com`).
    pub api_base_url: String,
    /// OAuth client id registered for this application.
    pub client_id: Option<String>,
    /// OAuth client secret registered for this application.
    pub client_secret: Option<String>,
}

impl CrmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default                                  |
    /// |---------------------|------------------------------------------|
    /// | `CRM_API_BASE_URL`  | `https://services.leadconnectorhq.com`   |
    /// | `CRM_CLIENT_ID`     | unset                                    |
    /// | `CRM_CLIENT_SECRET` | unset                                    |
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("CRM_API_BASE_URL")
            .unwrap_or_else(|_| "https://services.leadconnectorhq.com".into());

        Self {
            api_base_url,
            client_id: std::env::var("CRM_CLIENT_ID").ok().filter(|s| !s.is_empty()),
            client_secret: std::env::var("CRM_CLIENT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}
