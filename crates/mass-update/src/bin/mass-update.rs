//! Mass update CLI - acknowledge or resolve `PagerDuty` incidents en masse.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mass_update::config::{DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use mass_update::filter::split_ids;
use mass_update::{mass_update, Action, FilterCriteria, PagerDutySession, SessionConfig};

/// Mass ack or resolve incidents either corresponding to a given service, or
/// assigned to a given user.
#[derive(Parser)]
#[command(name = "mass-update")]
#[command(about = "Mass acknowledge or resolve PagerDuty incidents by service or assignee")]
struct Cli {
    /// REST API key (or set `PAGERDUTY_API_KEY` env var).
    #[arg(short = 'k', long, env = "PAGERDUTY_API_KEY", hide_env_values = true)]
    api_key: String,

    /// ID of the service, or comma-separated list of services, for which
    /// incidents should be updated; leave blank to match all services.
    #[arg(short = 's', long)]
    service_id: Option<String>,

    /// ID of user, or comma-separated list of users, whose assigned incidents
    /// should be included in the action; leave blank to match all users.
    #[arg(short = 'u', long)]
    user_id: Option<String>,

    /// Action to take on incidents en masse.
    #[arg(short = 'a', long, value_enum, default_value_t = Action::Resolve)]
    action: Action,

    /// Email address of the user who will be marked as performing the actions.
    #[arg(short = 'e', long, env = "PAGERDUTY_REQUESTER_EMAIL")]
    requester_email: String,

    /// Dry run: don't actually do anything but show what would be done.
    #[arg(short = 'n', long, default_value = "false")]
    dry_run: bool,

    /// REST API base URL.
    #[arg(long, env = "PAGERDUTY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Incidents fetched per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl Cli {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            action: self.action,
            service_ids: self.service_id.as_deref().map(split_ids).unwrap_or_default(),
            user_ids: self.user_id.as_deref().map(split_ids).unwrap_or_default(),
            dry_run: self.dry_run,
        }
    }

    fn session_config(&self) -> Result<SessionConfig> {
        let api_key = self.api_key.trim();
        let requester_email = self.requester_email.trim();

        if api_key.is_empty() {
            anyhow::bail!("API key is empty. Provide --api-key or set PAGERDUTY_API_KEY.");
        }
        if requester_email.is_empty() {
            anyhow::bail!(
                "Requester email is empty. Provide --requester-email or set PAGERDUTY_REQUESTER_EMAIL."
            );
        }

        Ok(SessionConfig::new(api_key, requester_email)
            .with_base_url(&self.api_url)
            .with_page_size(self.page_size)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the run report
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let session = PagerDutySession::new(cli.session_config()?)
        .context("Failed to create PagerDuty session")?;
    let criteria = cli.criteria();

    let mut stdout = std::io::stdout();
    let result = mass_update(&session, &criteria, &mut stdout)
        .await
        .context("Mass update aborted")?;

    info!(total = result.total, "Done");
    Ok(())
}
