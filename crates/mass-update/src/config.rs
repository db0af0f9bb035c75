//! Session configuration for the `PagerDuty` REST API.

use std::time::Duration;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

/// Default number of incidents requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one authenticated API session.
#[derive(Clone)]
pub struct SessionConfig {
    /// REST API key.
    pub api_key: String,
    /// Email of the user the mutations are attributed to.
    pub requester_email: String,
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Incidents per listing page.
    pub page_size: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SessionConfig {
    /// Config with default base URL, page size and timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>, requester_email: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            requester_email: requester_email.into(),
            base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point the session at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the listing page size. Zero is bumped to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The API key stays out of logs.
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &"<redacted>")
            .field("requester_email", &self.requester_email)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}
