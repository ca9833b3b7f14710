use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::Message;
use mockall::mock;
use std::sync::{Arc, Mutex};

use crate::error::ReportResult;
use crate::services::notifier::MailTransport;

// Define a mock mail transport
mock! {
    pub Mailer {}

    #[async_trait]
    impl MailTransport for Mailer {
        async fn deliver(&self, message: Message) -> ReportResult<()>;
    }
}

// A transport that keeps the envelope and raw bytes of every delivered message
#[derive(Default, Clone)]
pub struct RecordingMailer {
    messages: Arc<Mutex<Vec<(Envelope, String)>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Envelope, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn deliver(&self, message: Message) -> ReportResult<()> {
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        self.messages
            .lock()
            .unwrap()
            .push((message.envelope().clone(), raw));
        Ok(())
    }
}

// Mock mailer that accepts any number of messages
pub fn setup_accepting_mailer() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_deliver().returning(|_| Ok(()));
    mailer
}
