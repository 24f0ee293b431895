//! Ports for outbound message delivery.
//!
//! Senders are driven by the notification dispatcher and the contact-form
//! workflow. A disabled channel is a configuration state, not a fault: the
//! dispatcher reports it as `skipped` rather than `failed`.

use async_trait::async_trait;

use crate::domain::notification::NotificationMessage;
use crate::domain::user::PhoneNumber;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by sender adapters.
    pub enum SendError {
        /// The channel is not configured; no delivery was attempted.
        Disabled { message: String } =>
            "channel disabled: {message}",
        /// The provider could not be reached.
        Transport { message: String } =>
            "message transport failed: {message}",
        /// The provider rejected the message.
        Provider { message: String } =>
            "message provider rejected the send: {message}",
    }
}

impl SendError {
    /// Whether retrying the send can possibly help.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Provider { .. })
    }
}

/// Port for WhatsApp delivery of lifecycle notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    /// Deliver one message to one recipient.
    async fn send(&self, to: &PhoneNumber, message: &NotificationMessage) -> Result<(), SendError>;
}

/// Port for email delivery (contact form).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one email.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError>;
}

/// Sender used when `WHATSAPP_ENABLED` is unset: every send reports the
/// channel as disabled so dispatch outcomes degrade to `skipped`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledWhatsAppSender;

#[async_trait]
impl WhatsAppSender for DisabledWhatsAppSender {
    async fn send(
        &self,
        _to: &PhoneNumber,
        _message: &NotificationMessage,
    ) -> Result<(), SendError> {
        Err(SendError::disabled("whatsapp delivery is not configured"))
    }
}

/// Sender used when mail credentials are absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), SendError> {
        Err(SendError::disabled("mail delivery is not configured"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SendError::disabled("off"), false)]
    #[case(SendError::transport("connection reset"), true)]
    #[case(SendError::provider("rate limited"), true)]
    fn retryability_follows_the_variant(#[case] err: SendError, #[case] retryable: bool) {
        assert_eq!(err.is_retryable(), retryable);
    }

    #[tokio::test]
    async fn disabled_whatsapp_sender_reports_disabled() {
        let sender = DisabledWhatsAppSender;
        let phone = PhoneNumber::new("+447700900123").expect("valid phone");
        let message = crate::domain::notification::NotificationMessage::render(
            crate::domain::notification::HangoutEventKind::Confirmed,
            crate::domain::notification::TemplateVars {
                owner_name: "Edi".to_owned(),
                friend_name: "Sam".to_owned(),
                pup_name: "Fido".to_owned(),
                window: crate::domain::hangout::TimeWindow::new(
                    chrono::Utc::now(),
                    chrono::Utc::now(),
                )
                .expect("valid window"),
                event_name: None,
            },
        );
        let err = sender.send(&phone, &message).await.expect_err("disabled");
        assert!(matches!(err, SendError::Disabled { .. }));
    }
}
