//! `PagerDuty` REST API v2 session.
//!
//! Authenticates with an API key and attributes every mutation to the
//! requester given in the `From` header.
//!
//! # Usage
//!
//! ```no_run
//! use mass_update::{IncidentApi, PagerDutySession, SessionConfig};
//! use mass_update::filter::{build_params, Action, FilterCriteria};
//!
//! # async fn example() -> Result<(), mass_update::ApiError> {
//! let session = PagerDutySession::new(SessionConfig::new("api-key", "oncall@example.com"))?;
//! let params = build_params(&FilterCriteria::new(Action::Resolve));
//! let first_page = session.list_page(&params, 0).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, FROM};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::models::{IncidentListResponse, IncidentUpdateBody};
use super::{IncidentApi, IncidentPage, IncidentUpdate};
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::filter::QueryParams;

/// Media type selecting REST API v2.
const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

/// Authenticated `PagerDuty` REST session.
#[derive(Debug, Clone)]
pub struct PagerDutySession {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl PagerDutySession {
    /// Create a session from `config`.
    ///
    /// # Errors
    /// Returns error if the key or requester email are not valid header values,
    /// or if the HTTP client cannot be built.
    pub fn new(config: SessionConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Token token={}", config.api_key))
                .map_err(|_| ApiError::new("Invalid API key"))?,
        );
        headers.insert(
            FROM,
            HeaderValue::from_str(&config.requester_email)
                .map_err(|_| ApiError::new("Invalid requester email"))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V2));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        debug!(
            base_url = %config.base_url,
            page_size = config.page_size,
            requester = %config.requester_email,
            "PagerDuty session initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url,
            page_size: config.page_size,
        })
    }

    /// Read the body of a failed response into an error.
    async fn error_from(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "PagerDuty API request failed");
        ApiError::from_response(status.as_u16(), body)
    }
}

#[async_trait]
impl IncidentApi for PagerDutySession {
    fn page_size(&self) -> usize {
        self.page_size
    }

    #[instrument(skip(self, params))]
    async fn list_page(
        &self,
        params: &QueryParams,
        offset: usize,
    ) -> Result<IncidentPage, ApiError> {
        let url = format!("{}/incidents", self.base_url);

        let mut query = params.to_pairs();
        query.push(("offset".to_string(), offset.to_string()));
        query.push(("limit".to_string(), self.page_size.to_string()));

        let response = self.client.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let text = response.text().await?;
        let listing: IncidentListResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse incidents listing");
            ApiError::new(format!("Invalid incidents listing: {e}")).with_body(text.clone())
        })?;

        Ok(IncidentPage {
            incidents: listing.incidents,
            more: listing.more,
        })
    }

    #[instrument(skip(self, update), fields(incident_id = %update.id, status = %update.status))]
    async fn update_incident(&self, url: &str, update: &IncidentUpdate) -> Result<(), ApiError> {
        let response = self
            .client
            .put(url)
            .json(&IncidentUpdateBody { incident: update })
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Incident updated");
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}
