#[cfg(test)]
mod notifier_tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use chrono_tz::America::Los_Angeles;
    use std::path::PathBuf;
    use tempfile::tempdir;

    use crate::error::ReportError;
    use crate::models::attendance::AttendanceRow;
    use crate::models::request::{TimeRange, TimeUnit};
    use crate::notifier_mock::{MockMailer, RecordingMailer};
    use crate::services::notifier::{Notifier, NotifyOutcome, RunMetadata};
    use crate::services::report_writer::{write_report, ReportFormat};

    fn metadata() -> RunMetadata {
        RunMetadata {
            meeting_label: "469737038".to_string(),
            time_range: TimeRange::new(24, TimeUnit::Hours),
            generated_at: Los_Angeles.with_ymd_and_hms(2025, 6, 12, 11, 15, 0).unwrap(),
        }
    }

    fn rows() -> Vec<AttendanceRow> {
        ["Carol Diaz", "Alice Johnson", "Bob Smith"]
            .iter()
            .enumerate()
            .map(|(i, name)| AttendanceRow {
                meeting_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
                meeting_time: NaiveTime::from_hms_opt(10, i as u32, 0).unwrap(),
                participant_name: name.to_string(),
            })
            .collect()
    }

    fn rendered_report(dir: &std::path::Path) -> PathBuf {
        write_report(&rows(), dir, "report.xlsx", ReportFormat::Xlsx).unwrap()
    }

    #[test]
    fn test_compose_body_lists_participants_in_row_order() {
        let body = Notifier::compose_body(&rows(), &metadata());

        assert!(body.contains("Generated: 2025-06-12 at 11:15 PDT"));
        assert!(body.contains("Meeting ID: 469737038"));
        assert!(body.contains("Time Range: 24h"));
        assert!(body.contains("Participants:\nCarol Diaz\nAlice Johnson\nBob Smith\n"));
    }

    #[test]
    fn test_compose_body_without_participants() {
        let body = Notifier::compose_body(&[], &metadata());
        assert!(body.contains("Participants:\nNo participants found"));
    }

    #[test]
    fn test_compose_subject() {
        assert_eq!(
            Notifier::compose_subject(&metadata()),
            "Zoom Attendance Report - 2025-06-12"
        );
    }

    #[tokio::test]
    async fn test_send_report_delivers_to_all_recipients() {
        let dir = tempdir().unwrap();
        let report = rendered_report(dir.path());
        let mailer = RecordingMailer::new();
        let notifier = Notifier::new(
            "reports@example.com",
            vec!["manager@example.com".to_string(), "hr@example.com".to_string()],
        );

        let outcome = notifier
            .send_report(&mailer, &rows(), &report, ReportFormat::Xlsx, &metadata())
            .await
            .unwrap();

        assert_eq!(outcome, NotifyOutcome::Sent { recipients: 2 });

        let messages = mailer.messages();
        assert_eq!(messages.len(), 1);
        let (envelope, raw) = &messages[0];
        let to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["manager@example.com", "hr@example.com"]);
        assert!(raw.contains("Subject: Zoom Attendance Report - 2025-06-12"));
        assert!(raw.contains("report.xlsx"));
    }

    #[tokio::test]
    async fn test_empty_recipient_list_is_a_no_op() {
        let mut mailer = MockMailer::new();
        mailer.expect_deliver().times(0);
        let notifier = Notifier::new("reports@example.com", Vec::new());

        // The attachment is never read when nobody receives it
        let outcome = notifier
            .send_report(
                &mailer,
                &rows(),
                std::path::Path::new("/nonexistent/report.xlsx"),
                ReportFormat::Xlsx,
                &metadata(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, NotifyOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_transport_failure_is_delivery_error_and_report_survives() {
        let dir = tempdir().unwrap();
        let report = rendered_report(dir.path());
        let mut mailer = MockMailer::new();
        mailer
            .expect_deliver()
            .times(1)
            .returning(|_| Err(ReportError::Delivery("535 authentication failed".to_string())));
        let notifier = Notifier::new("reports@example.com", vec!["manager@example.com".to_string()]);

        let result = notifier
            .send_report(&mailer, &rows(), &report, ReportFormat::Xlsx, &metadata())
            .await;

        assert!(matches!(result, Err(ReportError::Delivery(_))));
        assert!(report.exists());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_delivery_error() {
        let dir = tempdir().unwrap();
        let report = rendered_report(dir.path());
        let mut mailer = MockMailer::new();
        mailer.expect_deliver().times(0);
        let notifier = Notifier::new("reports@example.com", vec!["not an address".to_string()]);

        let result = notifier
            .send_report(&mailer, &rows(), &report, ReportFormat::Xlsx, &metadata())
            .await;

        assert!(matches!(result, Err(ReportError::Delivery(_))));
    }

    #[tokio::test]
    async fn test_send_test_email() {
        let mailer = RecordingMailer::new();
        let notifier = Notifier::new("reports@example.com", Vec::new());

        notifier.send_test(&mailer, "ops@example.com").await.unwrap();

        let messages = mailer.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("Test email successful!"));
    }
}
