//! HTTP client for the CRM platform REST API and token endpoint.
//!
//! Every call carries a bounded timeout; a timed-out call is reported
//! the same way as any other failed call, never left pending.

use std::time::Duration;

use serde::Deserialize;

use crate::config::CrmConfig;

/// HTTP request timeout for a single platform API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for platform API failures.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform returned a non-2xx status code.
    #[error("Platform API returned HTTP {0}")]
    HttpStatus(u16),
}

impl CrmError {
    /// Whether this failure means "this credential cannot see that
    /// subject" rather than a transient platform problem.
    ///
    /// A parent credential only sees tenants it owns; 401/403/404 all
    /// mean "try the next credential", not "give up".
    pub fn is_not_authorized(&self) -> bool {
        matches!(self, CrmError::HttpStatus(401 | 403 | 404))
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// `GET /locations/{id}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationResponse {
    pub location: Location,
}

/// Location (tenant) details as returned by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    /// The owning parent (agency) account id.
    pub company_id: Option<String>,
    pub name: Option<String>,
    /// The custom domain connected to this location, if any.
    pub domain: Option<String>,
}

/// `GET /products/?locationId=...` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
}

/// `POST /oauth/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Absent when the provider does not rotate refresh tokens.
    pub refresh_token: Option<String>,
    /// Lifetime of the new access token in seconds.
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

// ---------------------------------------------------------------------------
// CrmClient
// ---------------------------------------------------------------------------

/// Client for the CRM platform REST API.
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
}

impl CrmClient {
    /// Create a client with a pre-configured HTTP client and base URL.
    pub fn new(config: &CrmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a location's details (ownership + connected domain).
    pub async fn get_location(
        &self,
        location_id: &str,
        access_token: &str,
    ) -> Result<Location, CrmError> {
        let url = format!("{}/locations/{location_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header("Version", "2021-07-28")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CrmError::HttpStatus(response.status().as_u16()));
        }

        let body: LocationResponse = response.json().await?;
        Ok(body.location)
    }

    /// Check whether a location has at least one product.
    pub async fn has_products(
        &self,
        location_id: &str,
        access_token: &str,
    ) -> Result<bool, CrmError> {
        let url = format!("{}/products/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("locationId", location_id), ("limit", "1")])
            .bearer_auth(access_token)
            .header("Version", "2021-07-28")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CrmError::HttpStatus(response.status().as_u16()));
        }

        let body: ProductsResponse = response.json().await?;
        Ok(!body.products.is_empty())
    }

    /// Exchange a refresh token for a new access/refresh token pair.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, CrmError> {
        let url = format!("{}/oauth/token", self.base_url);
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(CrmError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authorized_covers_auth_and_visibility_statuses() {
        assert!(CrmError::HttpStatus(401).is_not_authorized());
        assert!(CrmError::HttpStatus(403).is_not_authorized());
        assert!(CrmError::HttpStatus(404).is_not_authorized());
        assert!(!CrmError::HttpStatus(500).is_not_authorized());
        assert!(!CrmError::HttpStatus(429).is_not_authorized());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = CrmConfig {
            api_base_url: "https://api.example.com/".into(),
            client_id: None,
            client_secret: None,
        };
        let client = CrmClient::new(&config);
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn token_response_tolerates_missing_refresh_token() {
        let body = r#"{"access_token": "at-1", "expires_in": 86400}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "at-1");
        assert!(parsed.refresh_token.is_none());
        assert_eq!(parsed.expires_in, Some(86400));
    }
}
