//! Error taxonomy for a report run.
//!
//! Each variant maps to one pipeline stage. A failure aborts the stages that
//! depend on its output; a delivery failure leaves the rendered file on disk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Missing or invalid credentials or parameters. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OAuth token exchange was rejected or could not be performed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A participant or instance call failed.
    #[error("Fetch failed{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    /// Writing the spreadsheet failed.
    #[error("Render failed: {0}")]
    Render(String),

    /// Composing or sending the email failed.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl ReportError {
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        ReportError::Fetch {
            status,
            message: message.into(),
        }
    }

    /// Stable stage label for structured logging.
    pub fn stage(&self) -> &'static str {
        match self {
            ReportError::Configuration(_) => "configuration",
            ReportError::Authentication(_) => "authentication",
            ReportError::Fetch { .. } => "fetch",
            ReportError::Render(_) => "render",
            ReportError::Delivery(_) => "delivery",
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
