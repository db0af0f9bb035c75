//! Incidents API abstraction and paginated listing.
//!
//! [`IncidentApi`] is the seam between the bulk mutator and the remote
//! service. [`PagerDutySession`](pagerduty::PagerDutySession) is the REST
//! implementation; tests substitute in-memory fakes.

pub mod models;
pub mod pagerduty;

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ApiError;
use crate::filter::{IncidentStatus, QueryParams};

/// Incident as returned by the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReference {
    /// Incident ID.
    pub id: String,
    /// API URL of the incident resource.
    #[serde(rename = "self")]
    pub self_url: String,
    /// Current status.
    pub status: IncidentStatus,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Status change sent for one incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentUpdate {
    /// Always `incident_reference`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Incident ID.
    pub id: String,
    /// New status.
    pub status: IncidentStatus,
}

impl IncidentUpdate {
    /// Move incident `id` to `status`.
    #[must_use]
    pub fn new(id: impl Into<String>, status: IncidentStatus) -> Self {
        Self {
            resource_type: "incident_reference".to_string(),
            id: id.into(),
            status,
        }
    }
}

/// One page of the incidents listing.
#[derive(Debug, Clone, Default)]
pub struct IncidentPage {
    /// Incidents on this page, in listing order.
    pub incidents: Vec<IncidentReference>,
    /// Whether further pages exist.
    pub more: bool,
}

/// Classic pagination refuses requests reaching past this many results.
pub const ITERATION_LIMIT: usize = 10_000;

/// Remote incidents API.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Incidents requested per page.
    fn page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }

    /// Fetch the page of incidents matching `params` starting at `offset`.
    async fn list_page(
        &self,
        params: &QueryParams,
        offset: usize,
    ) -> Result<IncidentPage, ApiError>;

    /// Apply `update` to the incident at `url`.
    async fn update_incident(&self, url: &str, update: &IncidentUpdate) -> Result<(), ApiError>;
}

struct Cursor {
    offset: usize,
    buffered: VecDeque<IncidentReference>,
    more: bool,
}

/// Walk every page of the listing, yielding incidents lazily.
///
/// Each call starts a new walk at offset zero. The stream ends after the last
/// page, right after yielding a fetch error, or with a warning once the next
/// page would reach past [`ITERATION_LIMIT`].
pub fn list_all<'a, A>(
    api: &'a A,
    params: &'a QueryParams,
) -> BoxStream<'a, Result<IncidentReference, ApiError>>
where
    A: IncidentApi + ?Sized,
{
    let cursor = Cursor {
        offset: 0,
        buffered: VecDeque::new(),
        more: true,
    };

    stream::try_unfold(cursor, move |mut cursor| async move {
        loop {
            if let Some(incident) = cursor.buffered.pop_front() {
                return Ok::<_, ApiError>(Some((incident, cursor)));
            }
            if !cursor.more {
                return Ok(None);
            }
            if cursor.offset + api.page_size() > ITERATION_LIMIT {
                warn!(
                    offset = cursor.offset,
                    limit = ITERATION_LIMIT,
                    "Pagination limit reached, remaining incidents not listed"
                );
                return Ok(None);
            }

            let page = api.list_page(params, cursor.offset).await?;
            debug!(
                offset = cursor.offset,
                count = page.incidents.len(),
                more = page.more,
                "Fetched incidents page"
            );

            cursor.offset += page.incidents.len();
            cursor.more = page.more && !page.incidents.is_empty();
            cursor.buffered.extend(page.incidents);
        }
    })
    .boxed()
}
