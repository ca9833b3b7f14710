//! Process configuration.
//!
//! Everything is read once from the environment (optionally seeded from a
//! `.env` file) into an immutable [`AppConfig`] that is passed explicitly to
//! each component. Credentials are validated when a stage needs them.

use chrono_tz::Tz;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, ReportResult};
use crate::models::request::TimeRange;

pub const DEFAULT_API_BASE_URL: &str = "https://api.zoom.us/v2";
pub const DEFAULT_OAUTH_URL: &str = "https://zoom.us/oauth/token";
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const DEFAULT_SCHEDULED_RANGE: &str = "24h";
pub const DEFAULT_LOG_FILE: &str = "zoom_attendance.log";

pub const ENV_TEMPLATE: &str = "# Zoom API Configuration
ZOOM_ACCOUNT_ID=your_account_id
ZOOM_CLIENT_ID=your_client_id
ZOOM_CLIENT_SECRET=your_client_secret

# Email Configuration
SENDER_EMAIL=your_email@gmail.com
SENDER_PASSWORD=your_app_password
SMTP_SERVER=smtp.gmail.com
SMTP_PORT=587

# Recipients (comma-separated)
EMAIL_RECIPIENTS=manager@company.com,hr@company.com

# Report settings
REPORT_TIMEZONE=America/Los_Angeles
REPORT_OUTPUT_DIR=.

# Scheduled runs
REPORT_MEETING_ID=your_meeting_id
REPORT_TIME_RANGE=24h
REPORT_SEND_EMAIL=true
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomCredentials {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub sender: Option<String>,
    pub password: Option<String>,
}

/// Fixed values for unattended runs.
///
/// Kept raw and validated on use, so a bad scheduled value does not stop the
/// interactive menu from starting.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSettings {
    pub meeting_id: Option<String>,
    pub time_range: Option<String>,
    pub send_email: Option<String>,
}

impl ScheduleSettings {
    /// `REPORT_TIME_RANGE`, defaulting to a day
    pub fn time_range(&self) -> ReportResult<TimeRange> {
        self.time_range
            .as_deref()
            .unwrap_or(DEFAULT_SCHEDULED_RANGE)
            .parse::<TimeRange>()
    }

    /// `REPORT_SEND_EMAIL`, defaulting to true
    pub fn send_email(&self) -> ReportResult<bool> {
        match &self.send_email {
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                ReportError::Configuration(format!("REPORT_SEND_EMAIL '{}' is not a boolean", raw))
            }),
            None => Ok(true),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub account_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub smtp: SmtpSettings,
    pub recipients: Vec<String>,
    pub timezone: Tz,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub api_base_url: String,
    pub oauth_url: String,
    pub schedule: ScheduleSettings,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> ReportResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ReportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(|value| clean_value(&value));

        let port = match get("SMTP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ReportError::Configuration(format!("SMTP_PORT '{}' is not a valid port", raw))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let timezone_name = get("REPORT_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name.parse::<Tz>().map_err(|_| {
            ReportError::Configuration(format!(
                "REPORT_TIMEZONE '{}' is not an IANA timezone name",
                timezone_name
            ))
        })?;

        let output_dir = PathBuf::from(get("REPORT_OUTPUT_DIR").unwrap_or_else(|| ".".to_string()));
        let log_file = get("REPORT_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| output_dir.join(DEFAULT_LOG_FILE));

        Ok(Self {
            account_id: get("ZOOM_ACCOUNT_ID"),
            client_id: get("ZOOM_CLIENT_ID"),
            client_secret: get("ZOOM_CLIENT_SECRET"),
            smtp: SmtpSettings {
                host: get("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                port,
                sender: get("SENDER_EMAIL"),
                password: get("SENDER_PASSWORD"),
            },
            recipients: get("EMAIL_RECIPIENTS")
                .map(|raw| parse_recipients(&raw))
                .unwrap_or_default(),
            timezone,
            output_dir,
            log_file,
            api_base_url: get("ZOOM_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            oauth_url: get("ZOOM_OAUTH_URL").unwrap_or_else(|| DEFAULT_OAUTH_URL.to_string()),
            schedule: ScheduleSettings {
                meeting_id: get("REPORT_MEETING_ID"),
                time_range: get("REPORT_TIME_RANGE"),
                send_email: get("REPORT_SEND_EMAIL"),
            },
        })
    }

    /// Zoom credentials, or a configuration error naming every missing key.
    pub fn zoom_credentials(&self) -> ReportResult<ZoomCredentials> {
        match (&self.account_id, &self.client_id, &self.client_secret) {
            (Some(account_id), Some(client_id), Some(client_secret)) => Ok(ZoomCredentials {
                account_id: account_id.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => Err(missing(&[
                ("ZOOM_ACCOUNT_ID", self.account_id.is_some()),
                ("ZOOM_CLIENT_ID", self.client_id.is_some()),
                ("ZOOM_CLIENT_SECRET", self.client_secret.is_some()),
            ])),
        }
    }

    /// SMTP credentials, or a configuration error naming every missing key.
    pub fn smtp_credentials(&self) -> ReportResult<SmtpCredentials> {
        match (&self.smtp.sender, &self.smtp.password) {
            (Some(sender), Some(password)) => Ok(SmtpCredentials {
                host: self.smtp.host.clone(),
                port: self.smtp.port,
                sender: sender.clone(),
                password: password.clone(),
            }),
            _ => Err(missing(&[
                ("SENDER_EMAIL", self.smtp.sender.is_some()),
                ("SENDER_PASSWORD", self.smtp.password.is_some()),
            ])),
        }
    }

    pub fn has_zoom_credentials(&self) -> bool {
        self.zoom_credentials().is_ok()
    }

    pub fn has_smtp_credentials(&self) -> bool {
        self.smtp_credentials().is_ok()
    }

    /// Human-readable configuration status, one entry per line.
    pub fn status_report(&self) -> String {
        let mark = |present: bool| if present { "✓" } else { "✗" };
        [
            "Configuration Status:".to_string(),
            format!("Zoom Account ID: {}", mark(self.account_id.is_some())),
            format!("Zoom Client ID: {}", mark(self.client_id.is_some())),
            format!("Zoom Client Secret: {}", mark(self.client_secret.is_some())),
            format!(
                "Sender Email: {}",
                self.smtp.sender.as_deref().unwrap_or("✗ Not set")
            ),
            format!("Sender Password: {}", mark(self.smtp.password.is_some())),
            format!("SMTP Server: {}:{}", self.smtp.host, self.smtp.port),
            format!("Recipients: {} configured", self.recipients.len()),
            format!("Timezone: {}", self.timezone.name()),
            format!("Output Directory: {}", self.output_dir.display()),
        ]
        .join("\n")
    }
}

/// Write the `.env` template to `path`.
pub fn write_env_template(path: &Path) -> ReportResult<()> {
    fs::write(path, ENV_TEMPLATE).map_err(|e| {
        ReportError::Configuration(format!(
            "Failed to write template to {}: {}",
            path.display(),
            e
        ))
    })
}

/// Split a comma-separated recipient list, dropping empty entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

// Trim whitespace and surrounding quotes; empty values count as unset
fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn missing(keys: &[(&str, bool)]) -> ReportError {
    let names: Vec<&str> = keys
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    ReportError::Configuration(format!("Missing required settings: {}", names.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ReportResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.smtp.host, DEFAULT_SMTP_SERVER);
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.oauth_url, DEFAULT_OAUTH_URL);
        assert!(config.recipients.is_empty());
        assert_eq!(config.schedule.time_range().unwrap().to_string(), "24h");
        assert!(config.schedule.send_email().unwrap());
        assert_eq!(config.log_file, PathBuf::from(".").join(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_missing_zoom_credentials_names_keys() {
        let config = config_from(&[("ZOOM_ACCOUNT_ID", "acct")]).unwrap();
        let err = config.zoom_credentials().unwrap_err();

        match err {
            ReportError::Configuration(message) => {
                assert!(message.contains("ZOOM_CLIENT_ID"));
                assert!(message.contains("ZOOM_CLIENT_SECRET"));
                assert!(!message.contains("ZOOM_ACCOUNT_ID"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_credentials_and_quoted_values() {
        let config = config_from(&[
            ("ZOOM_ACCOUNT_ID", "acct"),
            ("ZOOM_CLIENT_ID", "\"client\""),
            ("ZOOM_CLIENT_SECRET", "'secret'"),
            ("SENDER_EMAIL", "reports@example.com"),
            ("SENDER_PASSWORD", "app-password"),
            ("SMTP_PORT", "\"465\""),
            ("EMAIL_RECIPIENTS", "a@example.com, ,b@example.com,"),
        ])
        .unwrap();

        let zoom = config.zoom_credentials().unwrap();
        assert_eq!(zoom.client_id, "client");
        assert_eq!(zoom.client_secret, "secret");

        let smtp = config.smtp_credentials().unwrap();
        assert_eq!(smtp.port, 465);
        assert_eq!(config.recipients, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        assert!(matches!(
            config_from(&[("SMTP_PORT", "smtp")]),
            Err(ReportError::Configuration(_))
        ));
        assert!(matches!(
            config_from(&[("REPORT_TIMEZONE", "Mars/Olympus")]),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn test_bad_schedule_values_fail_only_on_use() {
        let config = config_from(&[
            ("REPORT_TIME_RANGE", "soon"),
            ("REPORT_SEND_EMAIL", "maybe"),
        ])
        .unwrap();

        // The menu can still show status with broken scheduled values
        assert!(config.status_report().contains("Configuration Status:"));
        assert!(matches!(
            config.schedule.time_range(),
            Err(ReportError::Configuration(_))
        ));
        assert!(matches!(
            config.schedule.send_email(),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn test_schedule_values() {
        let config = config_from(&[
            ("REPORT_TIME_RANGE", "\"12h\""),
            ("REPORT_SEND_EMAIL", "no"),
        ])
        .unwrap();

        assert_eq!(config.schedule.time_range().unwrap().to_string(), "12h");
        assert!(!config.schedule.send_email().unwrap());
    }

    #[test]
    fn test_status_report() {
        let config = config_from(&[("ZOOM_ACCOUNT_ID", "acct"), ("EMAIL_RECIPIENTS", "a@example.com")]).unwrap();
        let status = config.status_report();

        assert!(status.contains("Zoom Account ID: ✓"));
        assert!(status.contains("Zoom Client ID: ✗"));
        assert!(status.contains("Sender Email: ✗ Not set"));
        assert!(status.contains("Recipients: 1 configured"));
    }

    #[test]
    fn test_write_env_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.template");

        write_env_template(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("ZOOM_ACCOUNT_ID="));
        assert!(written.contains("EMAIL_RECIPIENTS="));
    }
}
