//! Bulk incident state transitions for `PagerDuty`.
//!
//! This crate acknowledges or resolves incidents en masse, selected by service
//! and/or assignee, with an optional dry-run preview.
//!
//! ## Architecture
//!
//! ```text
//! FilterCriteria ──► build_params ──► QueryParams
//!                                         │
//!                                         ▼
//!                    ┌────────────────────────────────────┐
//!                    │  mass_update                       │
//!                    │  • list_all (paged, lazy)          │
//!                    │  • per incident: notice or update  │
//!                    │  • "Total of N ..." on every exit  │
//!                    └────────────────────────────────────┘
//!                                         │
//!                                         ▼
//!                          IncidentApi (PagerDutySession)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use mass_update::{mass_update, Action, FilterCriteria, PagerDutySession, SessionConfig};
//!
//! let session = PagerDutySession::new(SessionConfig::new(api_key, "oncall@example.com"))?;
//! let criteria = FilterCriteria::new(Action::Resolve)
//!     .with_service_ids("PSVC001,PSVC002")
//!     .with_dry_run(true);
//!
//! let result = mass_update(&session, &criteria, &mut std::io::stdout()).await?;
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod mutator;

pub use client::pagerduty::PagerDutySession;
pub use client::{list_all, IncidentApi, IncidentPage, IncidentReference, IncidentUpdate};
pub use config::SessionConfig;
pub use error::ApiError;
pub use filter::{build_params, Action, FilterCriteria, IncidentStatus, ParamValue, QueryParams};
pub use mutator::{mass_update, RunResult};
