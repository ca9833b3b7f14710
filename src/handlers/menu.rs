//! Interactive menu: a finite dispatcher over four actions sharing only the
//! loaded configuration.

use chrono::Utc;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info};

use crate::client::ZoomClient;
use crate::config::{parse_recipients, write_env_template, AppConfig, SmtpCredentials, ENV_TEMPLATE};
use crate::error::{ReportError, ReportResult};
use crate::handlers::prompt::Prompter;
use crate::models::request::{ReportRequest, TimeRange};
use crate::services::notifier::{Notifier, RunMetadata, SmtpMailer};
use crate::services::pipeline::run_report;
use crate::services::report_writer::ReportFormat;

pub const TEMPLATE_FILE: &str = ".env.template";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    GenerateReport,
    TestEmail,
    PrintTemplate,
    ShowStatus,
}

impl FromStr for MenuAction {
    type Err = ReportError;

    fn from_str(choice: &str) -> Result<Self, Self::Err> {
        match choice.trim() {
            "1" => Ok(MenuAction::GenerateReport),
            "2" => Ok(MenuAction::TestEmail),
            "3" => Ok(MenuAction::PrintTemplate),
            "4" => Ok(MenuAction::ShowStatus),
            other => Err(ReportError::Configuration(format!("Invalid choice '{}'", other))),
        }
    }
}

/// Show the menu, read one selection and run it
pub async fn run_menu<R: BufRead, W: Write>(
    config: &AppConfig,
    format: ReportFormat,
    prompter: &mut Prompter<R, W>,
) -> ReportResult<()> {
    prompter.say("Zoom Attendance Report Generator")?;
    prompter.say("\n1. Generate report")?;
    prompter.say("2. Test email")?;
    prompter.say("3. Create .env template")?;
    prompter.say("4. Show configuration")?;

    let action = prompter.ask("\nSelect (1-4): ")?.parse::<MenuAction>()?;
    info!("Menu action selected: {:?}", action);

    match action {
        MenuAction::GenerateReport => generate_report(config, format, prompter).await,
        MenuAction::TestEmail => test_email(config, prompter).await,
        MenuAction::PrintTemplate => print_template(Path::new(TEMPLATE_FILE), prompter),
        MenuAction::ShowStatus => prompter.say(&config.status_report()),
    }
}

async fn generate_report<R: BufRead, W: Write>(
    config: &AppConfig,
    format: ReportFormat,
    prompter: &mut Prompter<R, W>,
) -> ReportResult<()> {
    // Fail on missing credentials before prompting for anything
    let client = ZoomClient::from_config(config)?;

    let meeting_id = prompter.ask("Enter meeting ID (or press Enter for all meetings): ")?;
    prompter.say("\nTime range examples: 2h, 30m, 1d")?;
    let time_range = prompter
        .ask("Time to look back (default 1d): ")?
        .parse::<TimeRange>()?;

    let request = ReportRequest::new(Some(meeting_id), time_range, false);
    let now = Utc::now();
    let outcome = run_report(config, &client, &request, format, None, now).await?;
    prompter.say(&format!(
        "Report saved: {} ({} participants)",
        outcome.report_path.display(),
        outcome.rows.len()
    ))?;

    if !prompter.confirm("\nSend via email? (y/n): ")? {
        prompter.say("Done!")?;
        return Ok(());
    }

    let credentials = config.smtp_credentials()?;
    let mut recipients = config.recipients.clone();
    if recipients.is_empty() {
        recipients = parse_recipients(&prompter.ask("Enter recipient emails (comma-separated): ")?);
    }

    let mailer = SmtpMailer::new(&credentials)?;
    let notifier = Notifier::new(credentials.sender.clone(), recipients);
    let metadata = RunMetadata {
        meeting_label: request.meeting_label().to_string(),
        time_range: request.time_range,
        generated_at: now.with_timezone(&config.timezone),
    };

    match notifier
        .send_report(&mailer, &outcome.rows, &outcome.report_path, format, &metadata)
        .await
    {
        Ok(_) => {
            prompter.say("Done!")?;
            Ok(())
        }
        Err(e) => {
            error!(
                "Email failed; report kept at {}: {}",
                outcome.report_path.display(),
                e
            );
            Err(e)
        }
    }
}

async fn test_email<R: BufRead, W: Write>(
    config: &AppConfig,
    prompter: &mut Prompter<R, W>,
) -> ReportResult<()> {
    let sender = match &config.smtp.sender {
        Some(sender) => sender.clone(),
        None => prompter.ask("Email: ")?,
    };
    let password = match &config.smtp.password {
        Some(password) => password.clone(),
        None => prompter.ask("Password: ")?,
    };
    let recipient = prompter.ask("Test recipient: ")?;

    let credentials = SmtpCredentials {
        host: config.smtp.host.clone(),
        port: config.smtp.port,
        sender,
        password,
    };
    let mailer = SmtpMailer::new(&credentials)?;
    let notifier = Notifier::new(credentials.sender.clone(), Vec::new());

    match notifier.send_test(&mailer, &recipient).await {
        Ok(()) => prompter.say("Test email sent successfully!"),
        Err(e) => {
            prompter.say(&format!("Test failed: {}", e))?;
            Err(e)
        }
    }
}

/// Print the configuration template and save a copy at `path`
pub fn print_template<R: BufRead, W: Write>(path: &Path, prompter: &mut Prompter<R, W>) -> ReportResult<()> {
    prompter.say(ENV_TEMPLATE)?;
    write_env_template(path)?;
    prompter.say(&format!(
        "Created {} - copy to .env and fill in your values",
        path.display()
    ))
}
