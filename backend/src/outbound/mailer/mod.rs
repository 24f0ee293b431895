//! Mail delivery adapter.
//!
//! Posts to an HTTP mail API (any provider accepting a JSON
//! `{from, to, subject, text}` payload with bearer auth). Used by the
//! contact form only; lifecycle notifications go out over WhatsApp.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::domain::ports::{EmailSender, SendError};

/// Configuration for the HTTP mailer.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Mail API endpoint.
    pub endpoint: Url,
    /// Bearer token for the API.
    pub api_token: String,
    /// Sender address.
    pub from_address: String,
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mail sender over a JSON HTTP API.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl HttpMailer {
    /// Create a mailer with its own HTTP client.
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmailSender for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError> {
        let request = MailRequest {
            from: &self.config.from_address,
            to,
            subject,
            text: body,
        };

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|err| SendError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SendError::provider(format!("mail API returned {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn mail_requests_serialise_the_expected_shape() {
        let request = MailRequest {
            from: "dogcal@example.test",
            to: "owner@example.test",
            subject: "Question about Fido",
            text: "Hello!",
        };
        let value = serde_json::to_value(&request).expect("serialises");
        assert_eq!(value["from"], "dogcal@example.test");
        assert_eq!(value["to"], "owner@example.test");
        assert_eq!(value["subject"], "Question about Fido");
        assert_eq!(value["text"], "Hello!");
    }
}
