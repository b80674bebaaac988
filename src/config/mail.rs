//! Mail settings loaded from environment variables.
//!
//! Delivery itself belongs to an external mail transport; these values only feed
//! the sender address and the administrator copy of notifications.

const DEFAULT_SENDER: &str = "noreply@timeledger.local";

/// Addresses used when composing outbound mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// `From` address for every notification
    pub sender: String,
    /// Administrator inbox that receives reminders and copies, if configured
    pub admin_email: Option<String>,
}

/// Reads `MAIL_FROM` and `ADMIN_EMAIL` from the environment.
///
/// `MAIL_FROM` falls back to a local no-reply address; `ADMIN_EMAIL` is optional.
#[must_use]
pub fn get_mail_settings() -> MailSettings {
    MailSettings {
        sender: std::env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_SENDER.to_string()),
        admin_email: std::env::var("ADMIN_EMAIL")
            .ok()
            .filter(|email| !email.trim().is_empty()),
    }
}
