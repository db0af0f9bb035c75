//! Bulk acknowledge/resolve over the paginated incidents listing.

use std::fmt;
use std::io::Write;

use futures::TryStreamExt;
use tracing::{debug, error, info, warn};

use crate::client::{list_all, IncidentApi, IncidentUpdate};
use crate::error::ApiError;
use crate::filter::{build_params, FilterCriteria, QueryParams};

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Incidents processed, dry-run or real.
    pub total: usize,
}

/// Running count that writes the summary line when dropped.
struct TotalReport<'a, W: Write> {
    out: &'a mut W,
    total: usize,
}

impl<'a, W: Write> TotalReport<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self { out, total: 0 }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            warn!(error = %e, "Failed to write output line");
        }
    }
}

impl<W: Write> Drop for TotalReport<'_, W> {
    fn drop(&mut self) {
        let total = self.total;
        self.line(format_args!("Total of {total} incidents updated."));
        let _ = self.out.flush();
    }
}

/// Acknowledge or resolve every incident matching `criteria`.
///
/// Incidents are handled one at a time in listing order. In dry-run mode a
/// notice is written per incident and no update is sent. The first API error,
/// on either a page fetch or an update, stops the run: its response body is
/// written to `out` and the error is returned. `Total of N incidents updated.`
/// is always the last line written, whichever way the run ends.
///
/// # Errors
/// Returns the [`ApiError`] that aborted the run.
pub async fn mass_update<A, W>(
    api: &A,
    criteria: &FilterCriteria,
    out: &mut W,
) -> Result<RunResult, ApiError>
where
    A: IncidentApi + ?Sized,
    W: Write,
{
    let params = build_params(criteria);
    let mut report = TotalReport::new(out);

    info!(
        action = %criteria.action,
        dry_run = criteria.dry_run,
        services = criteria.service_ids.len(),
        users = criteria.user_ids.len(),
        "Starting mass update"
    );

    let outcome = process(api, criteria, &params, &mut report).await;
    match outcome {
        Ok(()) => {
            info!(total = report.total, "Mass update finished");
            Ok(RunResult {
                total: report.total,
            })
        }
        Err(e) => {
            error!(
                total = report.total,
                status = ?e.status(),
                error = %e,
                "Mass update aborted"
            );
            if let Some(body) = e.response_body() {
                report.line(format_args!("{body}"));
            }
            Err(e)
        }
    }
}

async fn process<A, W>(
    api: &A,
    criteria: &FilterCriteria,
    params: &QueryParams,
    report: &mut TotalReport<'_, W>,
) -> Result<(), ApiError>
where
    A: IncidentApi + ?Sized,
    W: Write,
{
    let target = criteria.action.target_status();
    let mut incidents = list_all(api, params);

    while let Some(incident) = incidents.try_next().await? {
        // Counted before the update goes out, so a failing item is included.
        report.total += 1;

        if criteria.dry_run {
            debug!(incident_id = %incident.id, "Dry run, skipping update");
            report.line(format_args!(
                "Not acting on incident {} because -n/--dry-run specified.",
                incident.id
            ));
            continue;
        }

        debug!(
            incident_id = %incident.id,
            from = %incident.status,
            to = %target,
            "Updating incident"
        );
        api.update_incident(&incident.self_url, &IncidentUpdate::new(&incident.id, target))
            .await?;
        report.line(format_args!("{target} incident {}", incident.id));
    }

    Ok(())
}
