//! WhatsApp Cloud API sender.
//!
//! Sends over the provider's HTTP API using `reqwest`. When a template name
//! is configured the lifecycle events go out as template sends (provider
//! policy requires templates outside a user-initiated session window);
//! otherwise the pre-rendered freeform body is used.

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::domain::notification::NotificationMessage;
use crate::domain::ports::{SendError, WhatsAppSender};
use crate::domain::user::PhoneNumber;

use super::dto::{
    ComponentPayload, ErrorResponse, LanguagePayload, MessageRequest, ParameterPayload,
    TemplatePayload, TextPayload,
};

/// Configuration for the WhatsApp sender.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Provider API base, e.g. `https://graph.facebook.com/v19.0/`.
    pub api_base: Url,
    /// Bearer token for the business account.
    pub access_token: String,
    /// Sending phone number id.
    pub phone_number_id: String,
    /// Provider-side template to use for lifecycle events, when approved.
    pub template_name: Option<String>,
}

/// HTTP sender over the WhatsApp Cloud API.
#[derive(Clone)]
pub struct HttpWhatsAppSender {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl HttpWhatsAppSender {
    /// Create a sender with its own HTTP client.
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> Result<Url, SendError> {
        self.config
            .api_base
            .join(&format!("{}/messages", self.config.phone_number_id))
            .map_err(|err| SendError::provider(format!("invalid provider endpoint: {err}")))
    }

    fn build_request(&self, to: &PhoneNumber, message: &NotificationMessage) -> MessageRequest {
        match &self.config.template_name {
            Some(template_name) => MessageRequest {
                messaging_product: "whatsapp",
                to: to.as_ref().to_owned(),
                kind: "template",
                text: None,
                template: Some(TemplatePayload {
                    name: template_name.clone(),
                    language: LanguagePayload { code: "en" },
                    components: vec![ComponentPayload {
                        kind: "body",
                        parameters: vec![
                            ParameterPayload::text(message.kind.as_str()),
                            ParameterPayload::text(&message.vars.pup_name),
                            ParameterPayload::text(message.vars.window_text()),
                            ParameterPayload::text(&message.vars.owner_name),
                        ],
                    }],
                }),
            },
            None => MessageRequest {
                messaging_product: "whatsapp",
                to: to.as_ref().to_owned(),
                kind: "text",
                text: Some(TextPayload {
                    body: message.body.clone(),
                }),
                template: None,
            },
        }
    }
}

#[async_trait]
impl WhatsAppSender for HttpWhatsAppSender {
    async fn send(&self, to: &PhoneNumber, message: &NotificationMessage) -> Result<(), SendError> {
        let endpoint = self.endpoint()?;
        let request = self.build_request(to, message);

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.config.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|err| SendError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.error)
            .and_then(|error| error.message)
            .unwrap_or_else(|| format!("provider returned {status}"));

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SendError::provider(format!("rate limited: {detail}")));
        }
        Err(SendError::provider(detail))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::hangout::TimeWindow;
    use crate::domain::notification::{HangoutEventKind, TemplateVars};
    use chrono::Utc;

    fn config(template: Option<&str>) -> WhatsAppConfig {
        WhatsAppConfig {
            api_base: Url::parse("https://graph.example.test/v19.0/").expect("valid url"),
            access_token: "token".to_owned(),
            phone_number_id: "12345".to_owned(),
            template_name: template.map(str::to_owned),
        }
    }

    fn message() -> NotificationMessage {
        let now = Utc::now();
        NotificationMessage::render(
            HangoutEventKind::Closed,
            TemplateVars {
                owner_name: "Edi".to_owned(),
                friend_name: "Sam".to_owned(),
                pup_name: "Fido".to_owned(),
                window: TimeWindow::new(now, now).expect("valid window"),
                event_name: None,
            },
        )
    }

    #[test]
    fn endpoint_joins_phone_number_id() {
        let sender = HttpWhatsAppSender::new(config(None));
        let endpoint = sender.endpoint().expect("valid endpoint");
        assert_eq!(
            endpoint.as_str(),
            "https://graph.example.test/v19.0/12345/messages"
        );
    }

    #[test]
    fn freeform_sends_use_the_rendered_body() {
        let sender = HttpWhatsAppSender::new(config(None));
        let phone = PhoneNumber::new("+447700900123").expect("valid phone");
        let request = sender.build_request(&phone, &message());
        assert_eq!(request.kind, "text");
        let text = request.text.expect("text payload");
        assert!(text.body.contains("Fido"));
    }

    #[test]
    fn template_sends_carry_event_and_variables() {
        let sender = HttpWhatsAppSender::new(config(Some("hangout_update")));
        let phone = PhoneNumber::new("+447700900123").expect("valid phone");
        let request = sender.build_request(&phone, &message());
        assert_eq!(request.kind, "template");
        let template = request.template.expect("template payload");
        assert_eq!(template.name, "hangout_update");
        let body = template.components.first().expect("body component");
        assert_eq!(body.parameters.first().map(|p| p.text.as_str()), Some("closed"));
    }
}
