//! `PagerDuty` REST API v2 wire envelopes.

use serde::{Deserialize, Serialize};

use super::{IncidentReference, IncidentUpdate};

/// Response of `GET /incidents`.
#[derive(Debug, Deserialize)]
pub struct IncidentListResponse {
    /// Incidents on this page.
    #[serde(default)]
    pub incidents: Vec<IncidentReference>,
    /// Whether more results follow.
    #[serde(default)]
    pub more: bool,
}

/// Request body of `PUT /incidents/{id}`.
#[derive(Debug, Serialize)]
pub struct IncidentUpdateBody<'a> {
    /// The update, wrapped under its resource name.
    pub incident: &'a IncidentUpdate,
}
