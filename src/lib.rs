//! Zoom Attendance Report
//!
//! This library fetches participant attendance for a Zoom meeting,
//! collapses repeated sessions into one row per participant in local time,
//! writes the result to a spreadsheet and emails it.
//!
//! # Modules
//!
//! - `auth`: Server-to-Server OAuth token exchange
//! - `client`: ZoomClient for the instances and participants endpoints
//! - `services`: normalization, spreadsheet rendering, email and the run pipeline
//! - `handlers`: interactive menu and scheduled runs
//!
//! # Authentication
//!
//! The client uses the `account_credentials` grant: the client ID and secret
//! are sent as HTTP Basic credentials together with the account ID, and the
//! returned bearer token authorizes the API calls of one run.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(test)]
mod notifier_mock;

// Re-export the main API types for ease of use
pub use auth::{AccessToken, ZoomAuth};
pub use client::ZoomClient;
pub use config::AppConfig;
pub use error::{ReportError, ReportResult};
pub use models::attendance::{AttendanceRow, ParticipantSession};
pub use models::request::{ReportRequest, TimeRange, TimeWindow};
pub use services::normalizer::normalize_sessions;
