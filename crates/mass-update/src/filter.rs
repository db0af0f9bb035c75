//! Selection criteria and the incidents-list query they translate to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query key for the service filter.
pub const SERVICE_IDS_KEY: &str = "service_ids[]";

/// Query key for the assignee filter.
pub const USER_IDS_KEY: &str = "user_ids[]";

/// Query key for the status filter.
pub const STATUSES_KEY: &str = "statuses[]";

/// Incident lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// Alerting, nobody has picked it up.
    Triggered,
    /// Someone is on it.
    Acknowledged,
    /// Closed.
    Resolved,
    /// Status not known to this client.
    #[serde(other)]
    Unknown,
}

impl IncidentStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bulk action to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Action {
    /// Acknowledge triggered incidents.
    Acknowledge,
    /// Resolve triggered and acknowledged incidents.
    #[default]
    Resolve,
}

impl Action {
    /// Status an incident is moved to.
    #[must_use]
    pub const fn target_status(self) -> IncidentStatus {
        match self {
            Self::Acknowledge => IncidentStatus::Acknowledged,
            Self::Resolve => IncidentStatus::Resolved,
        }
    }

    /// Statuses an incident may currently have to be eligible.
    #[must_use]
    pub const fn matching_statuses(self) -> &'static [IncidentStatus] {
        match self {
            Self::Acknowledge => &[IncidentStatus::Triggered],
            Self::Resolve => &[IncidentStatus::Triggered, IncidentStatus::Acknowledged],
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acknowledge => write!(f, "acknowledge"),
            Self::Resolve => write!(f, "resolve"),
        }
    }
}

/// Which incidents to touch and what to do with them.
///
/// Empty `service_ids` or `user_ids` match every service or every assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Action to apply.
    pub action: Action,
    /// Services to restrict to.
    pub service_ids: Vec<String>,
    /// Assignees to restrict to.
    pub user_ids: Vec<String>,
    /// Report only, send no updates.
    pub dry_run: bool,
}

impl FilterCriteria {
    /// Criteria matching every incident eligible for `action`.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    /// Restrict to a comma-separated list of service IDs.
    #[must_use]
    pub fn with_service_ids(mut self, ids: &str) -> Self {
        self.service_ids = split_ids(ids);
        self
    }

    /// Restrict to a comma-separated list of assignee IDs.
    #[must_use]
    pub fn with_user_ids(mut self, ids: &str) -> Self {
        self.user_ids = split_ids(ids);
        self
    }

    /// Set dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Split `"a, b,,c"` into `["a", "b", "c"]`, keeping order.
#[must_use]
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// `key=value`
    Single(String),
    /// `key=v1&key=v2...`
    List(Vec<String>),
}

/// Query parameters for the incidents listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    /// Set a scalar parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), ParamValue::Single(value.into()));
    }

    /// Set a list parameter.
    pub fn insert_list<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(key.into(), ParamValue::List(values));
    }

    /// Look up a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Whether `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Flatten into `(key, value)` pairs, repeating the key for list values.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            match value {
                ParamValue::Single(v) => pairs.push((key.clone(), v.clone())),
                ParamValue::List(values) => {
                    pairs.extend(values.iter().map(|v| (key.clone(), v.clone())));
                }
            }
        }
        pairs
    }
}

/// Build the listing query for `criteria`.
///
/// Always includes `is_overview=true` and `date_range=all`. The status filter
/// follows the action.
#[must_use]
pub fn build_params(criteria: &FilterCriteria) -> QueryParams {
    let mut params = QueryParams::default();
    params.insert("is_overview", "true");
    params.insert("date_range", "all");

    if !criteria.service_ids.is_empty() {
        params.insert_list(SERVICE_IDS_KEY, criteria.service_ids.iter().cloned());
    }
    if !criteria.user_ids.is_empty() {
        params.insert_list(USER_IDS_KEY, criteria.user_ids.iter().cloned());
    }

    params.insert_list(
        STATUSES_KEY,
        criteria
            .action
            .matching_statuses()
            .iter()
            .map(|s| s.as_str()),
    );

    params
}
