use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::config::SmtpCredentials;
use crate::error::{ReportError, ReportResult};
use crate::models::attendance::AttendanceRow;
use crate::models::request::TimeRange;
use crate::services::report_writer::ReportFormat;

const IMPLICIT_TLS_PORT: u16 = 465;

/// Seam between message composition and the wire
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> ReportResult<()>;
}

/// Authenticated SMTP submission
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. No connection is made until the first delivery.
    pub fn new(credentials: &SmtpCredentials) -> ReportResult<Self> {
        let builder = if credentials.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&credentials.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&credentials.host)
        }
        .map_err(|e| ReportError::Configuration(format!("Invalid SMTP server {}: {}", credentials.host, e)))?;

        let transport = builder
            .port(credentials.port)
            .credentials(Credentials::new(
                credentials.sender.clone(),
                credentials.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, message: Message) -> ReportResult<()> {
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| ReportError::Delivery(e.to_string()))
    }
}

/// Run details quoted in the email body
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub meeting_label: String,
    pub time_range: TimeRange,
    pub generated_at: DateTime<Tz>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent { recipients: usize },
    /// No recipients configured; nothing was sent
    Skipped,
}

pub struct Notifier {
    sender: String,
    recipients: Vec<String>,
}

impl Notifier {
    pub fn new(sender: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            sender: sender.into(),
            recipients,
        }
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn compose_subject(metadata: &RunMetadata) -> String {
        format!(
            "Zoom Attendance Report - {}",
            metadata.generated_at.format("%Y-%m-%d")
        )
    }

    /// Plain-text body listing one participant per line, in row order
    pub fn compose_body(rows: &[AttendanceRow], metadata: &RunMetadata) -> String {
        let participants = if rows.is_empty() {
            "No participants found".to_string()
        } else {
            rows.iter()
                .map(|row| row.participant_name.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Hello,\n\n\
             Please find attached the Zoom attendance report.\n\n\
             Generated: {}\n\
             Meeting ID: {}\n\
             Time Range: {}\n\n\
             Participants:\n\
             {}\n\n\
             Best regards,\n\
             Zoom Attendance Service",
            metadata.generated_at.format("%Y-%m-%d at %H:%M %Z"),
            metadata.meeting_label,
            metadata.time_range,
            participants
        )
    }

    /// Assemble the report email with the rendered file attached
    pub fn build_message(
        &self,
        rows: &[AttendanceRow],
        attachment: &Path,
        format: ReportFormat,
        metadata: &RunMetadata,
    ) -> ReportResult<Message> {
        let bytes = fs::read(attachment).map_err(|e| {
            ReportError::Delivery(format!("cannot read attachment {}: {}", attachment.display(), e))
        })?;
        let file_name = attachment
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("zoom_attendance.{}", format.extension()));
        let content_type = ContentType::parse(format.content_type())
            .map_err(|e| ReportError::Delivery(format!("invalid content type: {}", e)))?;

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.sender)?)
            .subject(Self::compose_subject(metadata));
        for recipient in &self.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(Self::compose_body(rows, metadata)))
                    .singlepart(Attachment::new(file_name).body(bytes, content_type)),
            )
            .map_err(|e| ReportError::Delivery(format!("failed to build message: {}", e)))
    }

    /// Email the report to every configured recipient.
    ///
    /// An empty recipient list is a successful no-op.
    pub async fn send_report(
        &self,
        transport: &dyn MailTransport,
        rows: &[AttendanceRow],
        attachment: &Path,
        format: ReportFormat,
        metadata: &RunMetadata,
    ) -> ReportResult<NotifyOutcome> {
        if self.recipients.is_empty() {
            info!("No recipients configured, skipping email");
            return Ok(NotifyOutcome::Skipped);
        }

        let message = self.build_message(rows, attachment, format, metadata)?;
        transport.deliver(message).await.map_err(|e| {
            error!("Email failed: {}", e);
            e
        })?;

        info!("Email sent to: {}", self.recipients.join(", "));
        Ok(NotifyOutcome::Sent {
            recipients: self.recipients.len(),
        })
    }

    /// Send a short message to check SMTP settings
    pub async fn send_test(&self, transport: &dyn MailTransport, recipient: &str) -> ReportResult<()> {
        let message = Message::builder()
            .from(parse_mailbox(&self.sender)?)
            .to(parse_mailbox(recipient)?)
            .subject("Test Email - Zoom Attendance System")
            .header(ContentType::TEXT_PLAIN)
            .body("Test email successful!".to_string())
            .map_err(|e| ReportError::Delivery(format!("failed to build message: {}", e)))?;

        transport.deliver(message).await?;
        info!("Test email sent to {}", recipient);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> ReportResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| ReportError::Delivery(format!("invalid address '{}': {}", address, e)))
}
