//! Best-effort notification fan-out.
//!
//! The dispatcher walks recipients in enumeration order, spacing successive
//! provider calls to respect third-party rate limits, and retries transient
//! failures with exponential backoff. Every outcome is returned as data:
//! a send failure must never fail the HTTP request that triggered it.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::notification::{
    DeliveryOutcome, DeliveryReport, NotificationMessage, Recipient,
};
use crate::domain::ports::{SendError, WhatsAppSender};

/// Retry, backoff, and spacing policy for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Total attempts per recipient, including the first.
    pub max_attempts: u32,
    /// Base delay before a retry; doubles per subsequent attempt.
    pub backoff: Duration,
    /// Fixed delay between successive recipients. Throughput control only,
    /// not a correctness requirement.
    pub spacing: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(250),
            spacing: Duration::from_millis(350),
        }
    }
}

impl DispatchPolicy {
    /// Policy with no delays, for tests.
    pub const fn immediate() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::ZERO,
            spacing: Duration::ZERO,
        }
    }
}

/// Fan-out worker delivering one message to many recipients.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: Arc<dyn WhatsAppSender>,
    policy: DispatchPolicy,
}

impl NotificationDispatcher {
    /// Create a dispatcher over a sender with the given policy.
    pub fn new(sender: Arc<dyn WhatsAppSender>, policy: DispatchPolicy) -> Self {
        Self { sender, policy }
    }

    /// Deliver `message` to each recipient, best effort, in order.
    ///
    /// Recipients without a phone number are skipped without a provider
    /// call. This method never fails; callers receive one report per
    /// recipient.
    pub async fn dispatch(
        &self,
        message: &NotificationMessage,
        recipients: &[Recipient],
    ) -> Vec<DeliveryReport> {
        let mut reports = Vec::with_capacity(recipients.len());
        let mut attempted_any = false;
        for recipient in recipients {
            let Some(phone) = recipient.phone_number.as_ref() else {
                reports.push(DeliveryReport {
                    recipient_user_id: recipient.user_id,
                    recipient_name: recipient.display_name.clone(),
                    outcome: DeliveryOutcome::Skipped("no phone number on file".to_owned()),
                });
                continue;
            };

            if attempted_any && !self.policy.spacing.is_zero() {
                tokio::time::sleep(self.policy.spacing).await;
            }
            attempted_any = true;

            let outcome = self.send_with_retries(phone, message).await;
            if let DeliveryOutcome::Failed(reason) = &outcome {
                warn!(
                    recipient = %recipient.user_id,
                    event = %message.kind,
                    reason,
                    "notification delivery failed"
                );
            }
            reports.push(DeliveryReport {
                recipient_user_id: recipient.user_id,
                recipient_name: recipient.display_name.clone(),
                outcome,
            });
        }
        reports
    }

    async fn send_with_retries(
        &self,
        phone: &crate::domain::user::PhoneNumber,
        message: &NotificationMessage,
    ) -> DeliveryOutcome {
        let mut attempt = 0_u32;
        loop {
            attempt += 1;
            match self.sender.send(phone, message).await {
                Ok(()) => return DeliveryOutcome::Sent,
                Err(SendError::Disabled { message }) => {
                    return DeliveryOutcome::Skipped(message);
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let exponent = attempt.saturating_sub(1).min(16);
                    let delay = self.policy.backoff.saturating_mul(1_u32 << exponent);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => return DeliveryOutcome::Failed(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
