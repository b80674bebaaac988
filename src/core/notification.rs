//! Notification templates - Renders outbound email content.
//!
//! Delivery belongs to an external [`MailTransport`]. [`deliver`] makes exactly one
//! attempt and reports the outcome; it never retries.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    config::mail::MailSettings,
    core::report::format_currency,
    entities::{EntryStatus, client, invoice, time_entry, user},
};

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Tells a client that an invoice has been issued.
#[must_use]
pub fn invoice_issued(invoice: &invoice::Model, client: &client::Model) -> EmailMessage {
    EmailMessage {
        subject: format!("Invoice {} from your service provider", invoice.invoice_number),
        body: format!(
            "Dear {},\n\n\
             Please find invoice {} covering {} to {}.\n\
             Amount due: {}\n\n\
             Thank you for your business.",
            client.name,
            invoice.invoice_number,
            invoice.start_date.format("%Y-%m-%d"),
            invoice.end_date.format("%Y-%m-%d"),
            format_currency(invoice.total),
        ),
    }
}

/// Tells an employee that an administrator reviewed one of their entries.
#[must_use]
pub fn entry_status_changed(employee: &user::Model, entry: &time_entry::Model) -> EmailMessage {
    let verdict = match entry.status {
        EntryStatus::Approved => "approved",
        EntryStatus::Rejected => "rejected",
        EntryStatus::Pending => "returned to pending",
    };
    EmailMessage {
        subject: format!("Your time entry for {} was {verdict}", entry.activity_date.format("%Y-%m-%d")),
        body: format!(
            "Hi {},\n\n\
             Your entry of {}h on {} has been {verdict}.\n\
             Memo: {}",
            employee.name,
            entry.duration,
            entry.activity_date.format("%Y-%m-%d"),
            entry.memo.as_deref().unwrap_or("(none)"),
        ),
    }
}

/// Reminds an employee to log time for `date`.
#[must_use]
pub fn time_entry_reminder(employee: &user::Model, date: NaiveDate) -> EmailMessage {
    EmailMessage {
        subject: format!("Reminder: log your time for {}", date.format("%Y-%m-%d")),
        body: format!(
            "Hi {},\n\n\
             We have no time entries from you for {}. Entries can be logged up to 30 days back.",
            employee.name,
            date.format("%Y-%m-%d"),
        ),
    }
}

/// Sends rendered messages through an external provider.
pub trait MailTransport {
    /// Attempts one delivery. Returns the provider's error text on failure.
    fn send(&self, from: &str, to: &str, message: &EmailMessage) -> std::result::Result<(), String>;
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipient address
    pub recipient: String,
    /// Whether the transport accepted the message
    pub delivered: bool,
    /// Transport error, when delivery failed
    pub error: Option<String>,
}

/// Sends `message` to `recipient` once and reports the result.
pub fn deliver<T>(
    transport: &T,
    settings: &MailSettings,
    recipient: &str,
    message: &EmailMessage,
) -> DeliveryReport
where
    T: MailTransport + ?Sized,
{
    match transport.send(&settings.sender, recipient, message) {
        Ok(()) => {
            info!("Mail '{}' delivered to {recipient}", message.subject);
            DeliveryReport {
                recipient: recipient.to_string(),
                delivered: true,
                error: None,
            }
        }
        Err(error) => {
            warn!("Mail '{}' to {recipient} failed: {error}", message.subject);
            DeliveryReport {
                recipient: recipient.to_string(),
                delivered: false,
                error: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{InvoiceStatus, UserRole};
    use crate::test_utils::{sample_entry, test_now};
    use std::cell::RefCell;

    fn employee() -> user::Model {
        user::Model {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@firm.test".to_string(),
            role: UserRole::Employee,
            created_at: test_now(),
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<String>>,
        fail: bool,
    }

    impl MailTransport for RecordingTransport {
        fn send(&self, _from: &str, to: &str, _message: &EmailMessage) -> Result<(), String> {
            self.sent.borrow_mut().push(to.to_string());
            if self.fail {
                Err("smtp unavailable".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn settings() -> MailSettings {
        MailSettings {
            sender: "billing@firm.test".to_string(),
            admin_email: None,
        }
    }

    #[test]
    fn test_invoice_issued_template() {
        let march = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        let invoice = invoice::Model {
            id: 1,
            invoice_number: "INV-2026-000001".to_string(),
            client_id: 1,
            start_date: march(1),
            end_date: march(31),
            subtotal: 1000.0,
            total: 1000.0,
            status: InvoiceStatus::Sent,
            created_by: 2,
            created_at: test_now(),
        };
        let client = client::Model {
            id: 1,
            name: "Acme".to_string(),
            email: None,
            address: None,
            is_active: true,
        };
        let message = invoice_issued(&invoice, &client);
        assert!(message.subject.contains("INV-2026-000001"));
        assert!(message.body.contains("Dear Acme"));
        assert!(message.body.contains("1,000.00"));
        assert!(message.body.contains("2026-03-01 to 2026-03-31"));
    }

    #[test]
    fn test_entry_status_changed_template() {
        let mut entry = sample_entry(1, 1, 1, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(), 3.5, true);
        entry.status = EntryStatus::Rejected;
        let message = entry_status_changed(&employee(), &entry);
        assert_eq!(message.subject, "Your time entry for 2026-03-05 was rejected");
        assert!(message.body.contains("3.5h"));
    }

    #[test]
    fn test_time_entry_reminder_template() {
        let message = time_entry_reminder(&employee(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert!(message.subject.ends_with("2026-03-09"));
        assert!(message.body.starts_with("Hi Ana"));
    }

    #[test]
    fn test_deliver_reports_failure_without_retrying() {
        let transport = RecordingTransport {
            fail: true,
            ..RecordingTransport::default()
        };
        let message = time_entry_reminder(&employee(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        let report = deliver(&transport, &settings(), "ana@firm.test", &message);

        assert!(!report.delivered);
        assert_eq!(report.error.as_deref(), Some("smtp unavailable"));
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[test]
    fn test_deliver_success() {
        let transport = RecordingTransport::default();
        let message = time_entry_reminder(&employee(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        let report = deliver(&transport, &settings(), "ana@firm.test", &message);
        assert!(report.delivered);
        assert!(report.error.is_none());
    }
}
