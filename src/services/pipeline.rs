use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{error, info};

use crate::client::ZoomClient;
use crate::config::AppConfig;
use crate::error::ReportResult;
use crate::models::attendance::AttendanceRow;
use crate::models::request::{ReportRequest, TimeWindow};
use crate::services::normalizer::normalize_sessions;
use crate::services::notifier::{MailTransport, Notifier, NotifyOutcome, RunMetadata};
use crate::services::report_writer::{report_file_name, write_report, ReportFormat};

/// Notifier and transport used when a run sends email
pub struct Delivery<'a> {
    pub notifier: &'a Notifier,
    pub transport: &'a dyn MailTransport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Disabled,
    Skipped,
    Sent { recipients: usize },
    Failed(String),
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub rows: Vec<AttendanceRow>,
    pub report_path: PathBuf,
    pub delivery: DeliveryStatus,
}

impl ReportOutcome {
    pub fn delivery_failed(&self) -> bool {
        matches!(self.delivery, DeliveryStatus::Failed(_))
    }
}

/// Run fetch, normalize, render and notify in sequence.
///
/// Fetch and render failures abort the run before any email. A delivery
/// failure is reported in the outcome; the rendered file stays on disk.
pub async fn run_report(
    config: &AppConfig,
    client: &ZoomClient,
    request: &ReportRequest,
    format: ReportFormat,
    delivery: Option<Delivery<'_>>,
    now: DateTime<Utc>,
) -> ReportResult<ReportOutcome> {
    let window = TimeWindow::ending_at(now, request.time_range);
    let meeting = request.meeting_label();
    info!(
        meeting_id = meeting,
        range = %request.time_range,
        "Looking for meetings from last {:.1} hours (after {})",
        request.time_range.hours(),
        window.start.with_timezone(&config.timezone).format("%Y-%m-%d %H:%M %Z")
    );

    let sessions = client
        .fetch_sessions(request.meeting_id.as_deref(), &window)
        .await
        .map_err(|e| {
            error!(stage = e.stage(), meeting_id = meeting, "Fetching participants failed: {}", e);
            e
        })?;
    info!(stage = "fetch", sessions = sessions.len(), "Fetch complete");

    let rows = normalize_sessions(&sessions, config.timezone);

    let generated_at = now.with_timezone(&config.timezone);
    let file_name = report_file_name(meeting, &generated_at, format);
    let report_path = write_report(&rows, &config.output_dir, &file_name, format).map_err(|e| {
        error!(stage = e.stage(), meeting_id = meeting, "Rendering report failed: {}", e);
        e
    })?;
    info!(stage = "render", rows = rows.len(), path = %report_path.display(), "Render complete");

    let delivery = match (request.send_email, delivery) {
        (true, Some(delivery)) => {
            let metadata = RunMetadata {
                meeting_label: meeting.to_string(),
                time_range: request.time_range,
                generated_at,
            };
            match delivery
                .notifier
                .send_report(delivery.transport, &rows, &report_path, format, &metadata)
                .await
            {
                Ok(NotifyOutcome::Sent { recipients }) => DeliveryStatus::Sent { recipients },
                Ok(NotifyOutcome::Skipped) => DeliveryStatus::Skipped,
                Err(e) => {
                    error!(stage = e.stage(), meeting_id = meeting, "Report generated but email failed: {}", e);
                    DeliveryStatus::Failed(e.to_string())
                }
            }
        }
        (true, None) => {
            info!("No recipients configured, skipping email");
            DeliveryStatus::Skipped
        }
        (false, _) => {
            info!("Report generated successfully (email disabled)");
            DeliveryStatus::Disabled
        }
    };

    Ok(ReportOutcome {
        rows,
        report_path,
        delivery,
    })
}
