//! Wire payloads for the WhatsApp Cloud API.

use serde::{Deserialize, Serialize};

/// Outbound message envelope.
#[derive(Debug, Serialize)]
pub struct MessageRequest {
    /// Always `whatsapp`.
    pub messaging_product: &'static str,
    /// Recipient phone number.
    pub to: String,
    /// `text` or `template`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Freeform body, for `text` sends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPayload>,
    /// Template reference, for `template` sends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplatePayload>,
}

/// Freeform text body.
#[derive(Debug, Serialize)]
pub struct TextPayload {
    /// Message body.
    pub body: String,
}

/// Template reference with body parameters.
#[derive(Debug, Serialize)]
pub struct TemplatePayload {
    /// Provider-side template name.
    pub name: String,
    /// Template language.
    pub language: LanguagePayload,
    /// Template components; one body component with text parameters.
    pub components: Vec<ComponentPayload>,
}

/// Template language selector.
#[derive(Debug, Serialize)]
pub struct LanguagePayload {
    /// BCP-47 language code.
    pub code: &'static str,
}

/// One template component.
#[derive(Debug, Serialize)]
pub struct ComponentPayload {
    /// Component type, `body` here.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Positional parameters.
    pub parameters: Vec<ParameterPayload>,
}

/// One positional template parameter.
#[derive(Debug, Serialize)]
pub struct ParameterPayload {
    /// Parameter type, `text` here.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Parameter value.
    pub text: String,
}

impl ParameterPayload {
    /// Build a text parameter.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: value.into(),
        }
    }
}

/// Error envelope returned by the provider on rejected sends.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Provider error detail.
    pub error: Option<ErrorDetail>,
}

/// Provider error detail.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable provider message.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn text_requests_omit_the_template_field() {
        let request = MessageRequest {
            messaging_product: "whatsapp",
            to: "+447700900123".to_owned(),
            kind: "text",
            text: Some(TextPayload {
                body: "hello".to_owned(),
            }),
            template: None,
        };
        let value = serde_json::to_value(&request).expect("serialises");
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"]["body"], "hello");
        assert!(value.get("template").is_none());
    }

    #[test]
    fn template_requests_carry_positional_parameters() {
        let request = MessageRequest {
            messaging_product: "whatsapp",
            to: "+447700900123".to_owned(),
            kind: "template",
            text: None,
            template: Some(TemplatePayload {
                name: "hangout_update".to_owned(),
                language: LanguagePayload { code: "en" },
                components: vec![ComponentPayload {
                    kind: "body",
                    parameters: vec![
                        ParameterPayload::text("Fido"),
                        ParameterPayload::text("2024-06-01 10:00 to 12:00 UTC"),
                    ],
                }],
            }),
        };
        let value = serde_json::to_value(&request).expect("serialises");
        assert_eq!(value["template"]["name"], "hangout_update");
        assert_eq!(
            value["template"]["components"][0]["parameters"][0]["text"],
            "Fido"
        );
    }
}
