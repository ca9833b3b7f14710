use chrono::Utc;
use std::io::{BufRead, Write};
use tracing::{error, info};

use crate::client::ZoomClient;
use crate::config::AppConfig;
use crate::error::{ReportError, ReportResult};
use crate::handlers::prompt::Prompter;
use crate::models::request::{ReportRequest, TimeRange};
use crate::services::notifier::{Notifier, SmtpMailer};
use crate::services::pipeline::{run_report, Delivery, DeliveryStatus, ReportOutcome};
use crate::services::report_writer::ReportFormat;

/// Flags of the `run` command that override the scheduled configuration
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub meeting_id: Option<String>,
    pub range: Option<String>,
    pub email: bool,
    pub no_email: bool,
}

/// Combine command-line overrides with the scheduled configuration.
///
/// Scheduled values are only validated when no override replaces them.
pub fn resolve_request(config: &AppConfig, overrides: &RunOverrides) -> ReportResult<ReportRequest> {
    let time_range = match &overrides.range {
        Some(raw) => raw.parse::<TimeRange>()?,
        None => config.schedule.time_range()?,
    };
    let send_email = if overrides.no_email {
        false
    } else {
        overrides.email || config.schedule.send_email()?
    };
    let meeting_id = overrides
        .meeting_id
        .clone()
        .or_else(|| config.schedule.meeting_id.clone());

    Ok(ReportRequest::new(meeting_id, time_range, send_email))
}

/// Build the notifier and SMTP transport a run will need.
///
/// Returns `None` when email is off or nobody would receive it. Missing SMTP
/// credentials are a configuration error, raised before any network call.
pub fn prepare_delivery(
    config: &AppConfig,
    request: &ReportRequest,
) -> ReportResult<Option<(Notifier, SmtpMailer)>> {
    if !request.send_email {
        return Ok(None);
    }
    if config.recipients.is_empty() {
        info!("Email enabled but no recipients configured; the report will not be sent");
        return Ok(None);
    }

    let credentials = config.smtp_credentials()?;
    let mailer = SmtpMailer::new(&credentials)?;
    let notifier = Notifier::new(credentials.sender, config.recipients.clone());
    Ok(Some((notifier, mailer)))
}

/// Unattended report run.
///
/// A delivery failure is returned as an error after the report is written.
pub async fn run_scheduled(
    config: &AppConfig,
    request: &ReportRequest,
    format: ReportFormat,
) -> ReportResult<ReportOutcome> {
    info!("Starting automated Zoom attendance report generation");

    let client = ZoomClient::from_config(config)?;
    let prepared = prepare_delivery(config, request)?;
    let delivery = prepared.as_ref().map(|(notifier, mailer)| Delivery {
        notifier,
        transport: mailer,
    });

    let outcome = run_report(config, &client, request, format, delivery, Utc::now()).await?;

    match &outcome.delivery {
        DeliveryStatus::Sent { recipients } => {
            info!("Report generated and emailed successfully to {} recipients", recipients)
        }
        DeliveryStatus::Failed(message) => {
            error!(
                "Report saved to {} but email failed",
                outcome.report_path.display()
            );
            return Err(ReportError::Delivery(message.clone()));
        }
        DeliveryStatus::Skipped | DeliveryStatus::Disabled => {
            info!("Report generated: {}", outcome.report_path.display())
        }
    }

    Ok(outcome)
}

/// Print the scheduled configuration and run it once confirmed
pub async fn run_check<R: BufRead, W: Write>(
    config: &AppConfig,
    request: &ReportRequest,
    format: ReportFormat,
    prompter: &mut Prompter<R, W>,
) -> ReportResult<()> {
    let mark = |ok: bool| if ok { "✓" } else { "✗" };

    prompter.say("Running in test mode...")?;
    prompter.say("Current configuration:")?;
    prompter.say(&format!("Meeting ID: {}", request.meeting_label()))?;
    prompter.say(&format!("Time Range: {}", request.time_range))?;
    prompter.say(&format!("Send Email: {}", request.send_email))?;
    prompter.say(&format!("Zoom Config: {}", mark(config.has_zoom_credentials())))?;
    prompter.say(&format!("Email Config: {}", mark(config.has_smtp_credentials())))?;
    prompter.say(&format!("Recipients: {} configured", config.recipients.len()))?;

    if prompter.confirm("\nProceed with test run? (y/n): ")? {
        run_scheduled(config, request, format).await?;
    }
    Ok(())
}
